//! # Storage Data Types
//!
//! This module provides the `DataType` enum used across schema definitions
//! and the row-store engine. The engine stores fixed-width values only, so
//! every type a packed row store accepts reports a `fixed_size()`.
//!
//! ## Type Categories
//!
//! | Category | Types | Fixed Size |
//! |----------|-------|------------|
//! | **Boolean** | Bool | 1 byte |
//! | **Integer** | Int2, Int4, Int8 | 2, 4, 8 bytes |
//! | **Float** | Float4, Float8 | 4, 8 bytes |
//! | **Date/Time** | Date, Timestamp | 4, 8 bytes |
//! | **Identifier** | Uuid | 16 bytes |
//! | **Degenerate** | Null | 0 bytes |
//! | **Variable** | Text, Blob | None |
//!
//! `Text` and `Blob` exist so that variable-length relations can be
//! described and *refused* by the packed row store at construction time.
//!
//! `Null` is the zero-width type whose values are always null. A relation
//! consisting entirely of `Null` attributes has a fixed byte length of 0
//! and is stored as pure bitmap.
//!
//! ## Storage Encoding
//!
//! The `#[repr(u8)]` ensures the discriminant fits in a single byte.
//! Multi-byte values are encoded little-endian (see `Value::copy_into`).

/// Canonical data type enum for schema attributes.
///
/// Uses `#[repr(u8)]` for efficient single-byte storage encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool = 0,
    Int2 = 1,
    Int4 = 2,
    Int8 = 3,
    Float4 = 4,
    Float8 = 5,
    Date = 6,
    Timestamp = 7,
    Uuid = 8,
    Null = 9,

    Text = 20,
    Blob = 21,
}

impl DataType {
    /// Returns the fixed byte size of this type, or None for
    /// variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataType::Bool => Some(1),
            DataType::Int2 => Some(2),
            DataType::Int4 => Some(4),
            DataType::Int8 => Some(8),
            DataType::Float4 => Some(4),
            DataType::Float8 => Some(8),
            DataType::Date => Some(4),
            DataType::Timestamp => Some(8),
            DataType::Uuid => Some(16),
            DataType::Null => Some(0),
            DataType::Text | DataType::Blob => None,
        }
    }

    /// Returns true if this is a variable-length type.
    pub fn is_variable(&self) -> bool {
        self.fixed_size().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_fixed_sizes() {
        assert_eq!(DataType::Bool.fixed_size(), Some(1));
        assert_eq!(DataType::Int2.fixed_size(), Some(2));
        assert_eq!(DataType::Int4.fixed_size(), Some(4));
        assert_eq!(DataType::Int8.fixed_size(), Some(8));
        assert_eq!(DataType::Float4.fixed_size(), Some(4));
        assert_eq!(DataType::Float8.fixed_size(), Some(8));
        assert_eq!(DataType::Date.fixed_size(), Some(4));
        assert_eq!(DataType::Timestamp.fixed_size(), Some(8));
        assert_eq!(DataType::Uuid.fixed_size(), Some(16));
        assert_eq!(DataType::Null.fixed_size(), Some(0));
        assert_eq!(DataType::Text.fixed_size(), None);
        assert_eq!(DataType::Blob.fixed_size(), None);
    }

    #[test]
    fn data_type_is_variable() {
        assert!(!DataType::Int4.is_variable());
        assert!(!DataType::Null.is_variable());
        assert!(DataType::Text.is_variable());
        assert!(DataType::Blob.is_variable());
    }
}
