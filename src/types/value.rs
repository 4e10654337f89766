//! # Runtime Value Representation
//!
//! This module provides `Value`, the runtime literal for fixed-width
//! attribute values. Values know how to encode themselves into tuple
//! storage (`copy_into`) and decode from it (`from_bytes`).
//!
//! ## Encoding
//!
//! All multi-byte values are encoded little-endian at their attribute's
//! fixed offset within a tuple. `Bool` is a single `0`/`1` byte. A `Null`
//! value writes nothing; null presence is recorded in the sub-block's
//! null bitmap, so the storage bytes of a null attribute are undefined.
//!
//! ## Type Checking
//!
//! `is_plausible_instance_of` is the debug-path compatibility predicate
//! used by the single-tuple insert: a non-null value must match the
//! attribute's declared type exactly, and a null value is plausible for
//! any type (nullability is checked separately against the schema).

use super::DataType;

/// Runtime literal for a fixed-width attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Date(i32),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the data type of this value, or None for NULL.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int2(_) => Some(DataType::Int2),
            Value::Int4(_) => Some(DataType::Int4),
            Value::Int8(_) => Some(DataType::Int8),
            Value::Float4(_) => Some(DataType::Float4),
            Value::Float8(_) => Some(DataType::Float8),
            Value::Date(_) => Some(DataType::Date),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Uuid(_) => Some(DataType::Uuid),
        }
    }

    /// Returns the encoded width of this value in bytes.
    pub fn width(&self) -> usize {
        self.data_type().and_then(|t| t.fixed_size()).unwrap_or(0)
    }

    /// Returns true if this value may legally be stored in an attribute
    /// of the given type.
    pub fn is_plausible_instance_of(&self, data_type: DataType) -> bool {
        match self.data_type() {
            None => true,
            Some(t) => t == data_type,
        }
    }

    /// Encodes this value into the destination slice. The slice must be
    /// at least `self.width()` bytes; a NULL value writes nothing.
    pub fn copy_into(&self, dst: &mut [u8]) {
        match self {
            Value::Null => {}
            Value::Bool(v) => dst[0] = *v as u8,
            Value::Int2(v) => dst[..2].copy_from_slice(&v.to_le_bytes()),
            Value::Int4(v) => dst[..4].copy_from_slice(&v.to_le_bytes()),
            Value::Int8(v) => dst[..8].copy_from_slice(&v.to_le_bytes()),
            Value::Float4(v) => dst[..4].copy_from_slice(&v.to_le_bytes()),
            Value::Float8(v) => dst[..8].copy_from_slice(&v.to_le_bytes()),
            Value::Date(v) => dst[..4].copy_from_slice(&v.to_le_bytes()),
            Value::Timestamp(v) => dst[..8].copy_from_slice(&v.to_le_bytes()),
            Value::Uuid(v) => dst[..16].copy_from_slice(v),
        }
    }

    /// Decodes a value of the given type from stored bytes.
    ///
    /// The slice must hold at least the type's fixed size. Decoding a
    /// `Null`-typed attribute always yields `Value::Null`.
    pub fn from_bytes(data_type: DataType, bytes: &[u8]) -> Value {
        match data_type {
            DataType::Bool => Value::Bool(bytes[0] != 0),
            DataType::Int2 => Value::Int2(i16::from_le_bytes([bytes[0], bytes[1]])),
            DataType::Int4 => {
                Value::Int4(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            DataType::Int8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                Value::Int8(i64::from_le_bytes(buf))
            }
            DataType::Float4 => {
                Value::Float4(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            DataType::Float8 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                Value::Float8(f64::from_le_bytes(buf))
            }
            DataType::Date => {
                Value::Date(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            DataType::Timestamp => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                Value::Timestamp(i64::from_le_bytes(buf))
            }
            DataType::Uuid => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(&bytes[..16]);
                Value::Uuid(buf)
            }
            DataType::Null => Value::Null,
            DataType::Text | DataType::Blob => Value::Null,
        }
    }
}
