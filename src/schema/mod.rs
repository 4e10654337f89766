//! # Relation Schema
//!
//! This module provides the read-only relation description consumed by the
//! row-store engine. The schema pre-computes everything the hot paths need
//! for O(1) address arithmetic:
//!
//! - `fixed_offsets`: byte offset of each attribute within a tuple
//! - `fixed_byte_length`: total tuple width `W` (sum of fixed widths)
//! - `nullable_indices`: position of each attribute within the subsequence
//!   of nullable attributes, or None for non-nullable attributes
//! - `max_byte_lengths`: per-attribute maximum byte width
//!
//! Attribute ids are dense vector positions assigned at construction.
//! The schema is immutable for the lifetime of any sub-block borrowing it.

use hashbrown::HashMap;

use crate::types::DataType;

/// A single attribute (column) of a relation.
#[derive(Debug, Clone)]
pub struct AttributeDef {
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl AttributeDef {
    /// Creates a non-nullable attribute.
    ///
    /// `Null`-typed attributes are forced nullable: their only value is
    /// null and their storage width is zero.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: data_type == DataType::Null,
        }
    }

    /// Creates a nullable attribute.
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the maximum byte width of this attribute's values.
    /// Variable-length attributes report 0; the packed row store refuses
    /// such relations before this matters.
    pub fn max_byte_length(&self) -> usize {
        self.data_type.fixed_size().unwrap_or(0)
    }
}

/// Read-only description of a relation: ordered attributes with
/// precomputed layout metadata.
#[derive(Debug, Clone)]
pub struct RelationSchema {
    attributes: Vec<AttributeDef>,
    fixed_offsets: Vec<usize>,
    nullable_indices: Vec<Option<usize>>,
    max_byte_lengths: Vec<usize>,
    fixed_byte_length: usize,
    num_nullable: usize,
    variable_length: bool,
    name_index: HashMap<String, usize>,
}

impl RelationSchema {
    pub fn new(attributes: Vec<AttributeDef>) -> Self {
        let mut fixed_offsets = Vec::with_capacity(attributes.len());
        let mut nullable_indices = Vec::with_capacity(attributes.len());
        let mut max_byte_lengths = Vec::with_capacity(attributes.len());
        let mut name_index = HashMap::with_capacity(attributes.len());
        let mut offset = 0;
        let mut num_nullable = 0;
        let mut variable_length = false;

        for (id, attr) in attributes.iter().enumerate() {
            fixed_offsets.push(offset);
            match attr.data_type.fixed_size() {
                Some(size) => offset += size,
                None => variable_length = true,
            }
            if attr.nullable {
                nullable_indices.push(Some(num_nullable));
                num_nullable += 1;
            } else {
                nullable_indices.push(None);
            }
            max_byte_lengths.push(attr.max_byte_length());
            name_index.insert(attr.name.clone(), id);
        }

        Self {
            attributes,
            fixed_offsets,
            nullable_indices,
            max_byte_lengths,
            fixed_byte_length: offset,
            num_nullable,
            variable_length,
            name_index,
        }
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn attribute(&self, id: usize) -> &AttributeDef {
        &self.attributes[id]
    }

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Looks up an attribute id by name.
    pub fn attribute_by_name(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Total tuple width `W`: the sum of all fixed attribute widths.
    pub fn fixed_byte_length(&self) -> usize {
        self.fixed_byte_length
    }

    /// Byte offset of the attribute within a tuple. Only meaningful for
    /// fixed-length attributes.
    pub fn fixed_length_offset(&self, id: usize) -> usize {
        self.fixed_offsets[id]
    }

    /// Position of the attribute within the nullable subsequence, or None
    /// for non-nullable attributes.
    pub fn nullable_index(&self, id: usize) -> Option<usize> {
        self.nullable_indices[id]
    }

    pub fn num_nullable_attributes(&self) -> usize {
        self.num_nullable
    }

    pub fn has_nullable_attributes(&self) -> bool {
        self.num_nullable > 0
    }

    pub fn is_variable_length(&self) -> bool {
        self.variable_length
    }

    pub fn max_byte_lengths(&self) -> &[usize] {
        &self.max_byte_lengths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> RelationSchema {
        RelationSchema::new(vec![
            AttributeDef::new("id", DataType::Int4),
            AttributeDef::nullable("score", DataType::Int8),
            AttributeDef::new("flag", DataType::Bool),
            AttributeDef::nullable("when", DataType::Date),
        ])
    }

    #[test]
    fn schema_calculates_fixed_offsets() {
        let schema = sample_schema();
        assert_eq!(schema.fixed_length_offset(0), 0);
        assert_eq!(schema.fixed_length_offset(1), 4);
        assert_eq!(schema.fixed_length_offset(2), 12);
        assert_eq!(schema.fixed_length_offset(3), 13);
        assert_eq!(schema.fixed_byte_length(), 17);
    }

    #[test]
    fn schema_tracks_nullable_subsequence() {
        let schema = sample_schema();
        assert_eq!(schema.nullable_index(0), None);
        assert_eq!(schema.nullable_index(1), Some(0));
        assert_eq!(schema.nullable_index(2), None);
        assert_eq!(schema.nullable_index(3), Some(1));
        assert_eq!(schema.num_nullable_attributes(), 2);
        assert!(schema.has_nullable_attributes());
    }

    #[test]
    fn schema_resolves_names() {
        let schema = sample_schema();
        assert_eq!(schema.attribute_by_name("flag"), Some(2));
        assert_eq!(schema.attribute_by_name("missing"), None);
    }

    #[test]
    fn schema_detects_variable_length_relations() {
        let schema = RelationSchema::new(vec![
            AttributeDef::new("id", DataType::Int4),
            AttributeDef::new("name", DataType::Text),
        ]);
        assert!(schema.is_variable_length());

        assert!(!sample_schema().is_variable_length());
    }

    #[test]
    fn null_type_attributes_are_forced_nullable() {
        let schema = RelationSchema::new(vec![
            AttributeDef::new("a", DataType::Null),
            AttributeDef::new("b", DataType::Null),
        ]);
        assert_eq!(schema.fixed_byte_length(), 0);
        assert_eq!(schema.num_nullable_attributes(), 2);
        assert!(!schema.is_variable_length());
    }
}
