//! # Tuple Literals
//!
//! A `Tuple` is an ordered list of attribute values in schema order, the
//! source of the single-tuple insert path. Values are stored inline for
//! the common case of narrow relations.

use smallvec::SmallVec;

use super::Value;

/// Ordered list of attribute values, one per schema attribute.
#[derive(Debug, Clone, Default)]
pub struct Tuple {
    values: SmallVec<[Value; 8]>,
}

impl Tuple {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Tuple::new(iter)
    }
}
