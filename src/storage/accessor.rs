//! # Value Accessors
//!
//! A `ValueAccessor` is the iteration interface bulk insertion consumes:
//! a cursor over source tuples that hands out raw value bytes by
//! attribute id. The sub-block both consumes accessors (as bulk-insert
//! sources) and produces them (`RowStoreValueAccessor` over its own
//! committed tuples, optionally filtered through a `TupleIdSequence`).
//!
//! ## Shape Hint
//!
//! `implementation()` tags the accessor's storage layout. The bulk-insert
//! dispatcher enables contiguous-attribute merging only for row-store
//! sources, where successive attribute ids really are adjacent bytes.
//!
//! ## Contract
//!
//! `untyped_value` returns a slice that starts at the attribute's bytes
//! and, for row-store accessors, extends to the end of the current row so
//! a merged multi-attribute copy can read through it. `next` must be
//! called before the first value access.

use crate::schema::RelationSchema;
use crate::storage::bitmap::NullBitmap;

/// Storage layout of a value accessor's backing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorImpl {
    PackedRowStore,
    SplitRowStore,
    ColumnStore,
    Other,
}

impl AccessorImpl {
    /// Row-store layouts keep a tuple's attributes adjacent, which lets
    /// the run planner merge contiguous copies.
    pub fn is_row_store(&self) -> bool {
        matches!(self, AccessorImpl::PackedRowStore | AccessorImpl::SplitRowStore)
    }
}

/// Cursor over source tuples, the input of every bulk-insert path.
pub trait ValueAccessor {
    /// Advances to the next tuple. Returns false when exhausted.
    fn next(&mut self) -> bool;

    /// Returns true if `next` would fail.
    fn iteration_finished(&self) -> bool;

    /// Raw bytes of a non-nullable attribute in the current tuple.
    fn untyped_value(&self, attr_id: usize) -> &[u8];

    /// Raw bytes of an attribute in the current tuple, or None if its
    /// value is null.
    fn untyped_value_nullable(&self, attr_id: usize) -> Option<&[u8]>;

    /// Storage layout hint for the bulk-insert dispatcher.
    fn implementation(&self) -> AccessorImpl;
}

/// Sorted, deduplicated set of tuple ids.
///
/// Consumed by bulk deletion and by the selection accessor adapter.
#[derive(Debug, Clone, Default)]
pub struct TupleIdSequence {
    ids: Vec<usize>,
}

impl TupleIdSequence {
    pub fn new(mut ids: Vec<usize>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.ids.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.ids.last().copied()
    }

    pub fn contains(&self, tuple_id: usize) -> bool {
        self.ids.binary_search(&tuple_id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<usize> for TupleIdSequence {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        TupleIdSequence::new(iter.into_iter().collect())
    }
}

/// Iteration view over a packed row-store sub-block's committed tuples.
///
/// Borrows the sub-block immutably; `'s` is that borrow, `'a` the
/// sub-block's own region lifetime.
#[derive(Debug)]
pub struct RowStoreValueAccessor<'s, 'a> {
    schema: &'s RelationSchema,
    num_tuples: usize,
    tuple_storage: &'s [u8],
    null_bitmap: Option<&'s NullBitmap<'a>>,
    current: Option<usize>,
    finished: bool,
}

impl<'s, 'a> RowStoreValueAccessor<'s, 'a> {
    pub(crate) fn new(
        schema: &'s RelationSchema,
        num_tuples: usize,
        tuple_storage: &'s [u8],
        null_bitmap: Option<&'s NullBitmap<'a>>,
    ) -> Self {
        Self {
            schema,
            num_tuples,
            tuple_storage,
            null_bitmap,
            current: None,
            finished: false,
        }
    }

    /// Positions the cursor on an arbitrary tuple id. Used by the
    /// selection adapter.
    fn position_at(&mut self, tuple_id: usize) {
        debug_assert!(tuple_id < self.num_tuples);
        self.current = Some(tuple_id);
    }

    fn current_row(&self) -> usize {
        debug_assert!(self.current.is_some(), "accessed before next()");
        self.current.unwrap_or(0)
    }

    fn value_slice(&self, attr_id: usize) -> &[u8] {
        let width = self.schema.fixed_byte_length();
        let base = self.current_row() * width;
        let offset = self.schema.fixed_length_offset(attr_id);
        // Through the end of the row, so merged copies can read past
        // this attribute.
        &self.tuple_storage[base + offset..base + width]
    }

    fn is_null(&self, attr_id: usize) -> bool {
        match (self.schema.nullable_index(attr_id), self.null_bitmap) {
            (Some(nullable_idx), Some(bitmap)) => {
                let num_nullable = self.schema.num_nullable_attributes();
                bitmap.get(self.current_row() * num_nullable + nullable_idx)
            }
            _ => false,
        }
    }
}

impl ValueAccessor for RowStoreValueAccessor<'_, '_> {
    fn next(&mut self) -> bool {
        let next = self.current.map_or(0, |c| c + 1);
        if next < self.num_tuples {
            self.current = Some(next);
            true
        } else {
            self.finished = true;
            false
        }
    }

    fn iteration_finished(&self) -> bool {
        self.finished || self.current.map_or(0, |c| c + 1) >= self.num_tuples
    }

    fn untyped_value(&self, attr_id: usize) -> &[u8] {
        self.value_slice(attr_id)
    }

    fn untyped_value_nullable(&self, attr_id: usize) -> Option<&[u8]> {
        if self.is_null(attr_id) {
            return None;
        }
        Some(self.value_slice(attr_id))
    }

    fn implementation(&self) -> AccessorImpl {
        AccessorImpl::PackedRowStore
    }
}

/// Wraps a `RowStoreValueAccessor` and visits only the tuple ids in a
/// `TupleIdSequence`.
#[derive(Debug)]
pub struct SelectionValueAccessor<'s, 'a> {
    base: RowStoreValueAccessor<'s, 'a>,
    selection: &'s TupleIdSequence,
    position: Option<usize>,
}

impl<'s, 'a> SelectionValueAccessor<'s, 'a> {
    pub(crate) fn new(
        base: RowStoreValueAccessor<'s, 'a>,
        selection: &'s TupleIdSequence,
    ) -> Self {
        Self {
            base,
            selection,
            position: None,
        }
    }
}

impl ValueAccessor for SelectionValueAccessor<'_, '_> {
    fn next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.selection.len() {
            self.position = Some(next);
            self.base.position_at(self.selection.ids[next]);
            true
        } else {
            self.base.finished = true;
            false
        }
    }

    fn iteration_finished(&self) -> bool {
        self.position.map_or(0, |p| p + 1) >= self.selection.len()
    }

    fn untyped_value(&self, attr_id: usize) -> &[u8] {
        self.base.untyped_value(attr_id)
    }

    fn untyped_value_nullable(&self, attr_id: usize) -> Option<&[u8]> {
        self.base.untyped_value_nullable(attr_id)
    }

    fn implementation(&self) -> AccessorImpl {
        self.base.implementation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_id_sequence_sorts_and_dedups() {
        let seq = TupleIdSequence::new(vec![5, 1, 3, 1, 5]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.first(), Some(1));
        assert_eq!(seq.last(), Some(5));
        assert!(seq.contains(3));
        assert!(!seq.contains(2));
        assert_eq!(seq.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn empty_sequence() {
        let seq = TupleIdSequence::default();
        assert!(seq.is_empty());
        assert_eq!(seq.first(), None);
        assert_eq!(seq.last(), None);
    }

    #[test]
    fn accessor_impl_row_store_hint() {
        assert!(AccessorImpl::PackedRowStore.is_row_store());
        assert!(AccessorImpl::SplitRowStore.is_row_store());
        assert!(!AccessorImpl::ColumnStore.is_row_store());
        assert!(!AccessorImpl::Other.is_row_store());
    }
}
