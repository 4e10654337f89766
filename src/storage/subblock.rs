//! # Packed Row-Store Sub-Block
//!
//! The storage engine for one page-sized byte region. Tuples are laid out
//! back-to-back at fixed offsets with no per-tuple overhead; nullability
//! lives in a parallel packed bitmap between the header and the tuple
//! area.
//!
//! ## Region Layout
//!
//! ```text
//! +-------------------+
//! | Header (8 bytes)  |  num_tuples, little-endian u64
//! +-------------------+
//! | Null Bitmap (B)   |  row_capacity * num_nullable bits, absent when
//! +-------------------+  the relation has no nullable attributes
//! | Tuple Storage     |  row_capacity tuples of W bytes each
//! +-------------------+
//! ```
//!
//! With `S` the region size, `H` the header size, `W` the tuple width and
//! `N` the nullable-attribute count, the row capacity is the largest `R`
//! with `H + ceil(R*N/8) + R*W <= S`:
//!
//! - `N > 0`: `R = (S - H) * 8 / (W * 8 + N)`
//! - `N > 0, W = 0` (relation is entirely null-typed): the region past
//!   the header is all bitmap, `R = (S - H) * 8 / N`
//! - `N = 0`: `R = (S - H) / W`
//!
//! ## Ownership
//!
//! The region and the schema are borrowed; the engine instance must not
//! outlive either. Deletions compact immediately, so live tuples always
//! occupy ids `[0, num_tuples)`.
//!
//! ## Partial Bulk Inserts
//!
//! `bulk_insert_partial_tuples` writes rows without advancing
//! `num_tuples`, letting a caller compose several sources covering
//! disjoint attribute subsets into the same rows. Written rows stay
//! invisible to every read path until
//! `bulk_insert_partial_tuples_finalize` commits the count.
//!
//! ## Concurrency
//!
//! None. A sub-block has exactly one writer at a time (the `&mut self`
//! receivers enforce it) and no operation blocks or suspends.

use eyre::Result;

use crate::schema::RelationSchema;
use crate::storage::accessor::{
    RowStoreValueAccessor, SelectionValueAccessor, TupleIdSequence, ValueAccessor,
};
use crate::storage::bitmap::NullBitmap;
use crate::storage::errors::{BlockMemoryTooSmall, InvalidDescriptor};
use crate::storage::header::{RowStoreHeader, HEADER_SIZE};
use crate::storage::runs::{plan_runs, Run};
use crate::types::{Tuple, Value};

/// Tuple-storage layout designated by a sub-block descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubBlockKind {
    PackedRowStore,
    SplitRowStore,
    ColumnStore,
}

/// Descriptor naming the tuple-storage layout a block was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TupleStoreDescription {
    pub kind: SubBlockKind,
}

/// Outcome of a single-tuple insert. A full block yields `id: None`
/// rather than an error. `reorganized` reports whether existing tuple
/// ids moved; packed row stores never move ids on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub id: Option<usize>,
    pub reorganized: bool,
}

/// Fixed-width row-store storage engine over a borrowed byte region.
#[derive(Debug)]
pub struct PackedRowStoreSubBlock<'a> {
    schema: &'a RelationSchema,
    header: &'a mut RowStoreHeader,
    null_bitmap: Option<NullBitmap<'a>>,
    tuple_storage: &'a mut [u8],
    row_capacity: usize,
}

impl<'a> PackedRowStoreSubBlock<'a> {
    /// Returns true when the descriptor designates a packed row store
    /// and the relation can be stored as one.
    pub fn description_is_valid(
        schema: &RelationSchema,
        description: &TupleStoreDescription,
    ) -> bool {
        description.kind == SubBlockKind::PackedRowStore && !schema.is_variable_length()
    }

    /// Upper bound on the bytes one tuple consumes, for capacity
    /// planning. The null term rounds up to a whole byte so relations
    /// with fewer than eight all-nullable attributes never estimate
    /// zero.
    pub fn estimate_bytes_per_tuple(schema: &RelationSchema) -> usize {
        schema.fixed_byte_length() + ((schema.num_nullable_attributes() + 7) >> 3)
    }

    /// Constructs the engine over `region`.
    ///
    /// With `new_block` the header and bitmap are initialized; otherwise
    /// the region is taken to hold valid prior contents and no memory is
    /// touched.
    pub fn new(
        schema: &'a RelationSchema,
        description: &TupleStoreDescription,
        new_block: bool,
        region: &'a mut [u8],
    ) -> Result<Self> {
        if description.kind != SubBlockKind::PackedRowStore {
            return Err(InvalidDescriptor {
                reason: "sub-block kind is not packed row store",
            }
            .into());
        }
        if schema.is_variable_length() {
            return Err(InvalidDescriptor {
                reason: "relation is variable-length",
            }
            .into());
        }

        let region_size = region.len();
        if region_size < HEADER_SIZE {
            return Err(BlockMemoryTooSmall {
                required: HEADER_SIZE,
                provided: region_size,
            }
            .into());
        }

        let tuple_length = schema.fixed_byte_length();
        let num_nullable = schema.num_nullable_attributes();
        let available = region_size - HEADER_SIZE;

        let (row_capacity, bitmap_bytes) = if num_nullable > 0 {
            // Sized in bits so the bitmap and the tuple both count.
            let mut row_capacity = (available * 8) / (tuple_length * 8 + num_nullable);
            let mut bitmap_bytes = NullBitmap::bytes_needed(row_capacity * num_nullable);
            if region_size < HEADER_SIZE + bitmap_bytes {
                if tuple_length == 0 {
                    // Relation consists entirely of null-typed
                    // attributes; everything past the header is bitmap.
                    row_capacity = NullBitmap::max_capacity_for_bytes(available) / num_nullable;
                    bitmap_bytes = available;
                } else {
                    return Err(BlockMemoryTooSmall {
                        required: HEADER_SIZE + bitmap_bytes,
                        provided: region_size,
                    }
                    .into());
                }
            }
            (row_capacity, bitmap_bytes)
        } else if tuple_length > 0 {
            (available / tuple_length, 0)
        } else {
            (0, 0)
        };

        let (header_bytes, rest) = region.split_at_mut(HEADER_SIZE);
        let header = RowStoreHeader::from_bytes_mut(header_bytes)?;
        let (bitmap_region, tuple_storage) = rest.split_at_mut(bitmap_bytes);
        let null_bitmap = (num_nullable > 0)
            .then(|| NullBitmap::new(bitmap_region, row_capacity * num_nullable));

        let mut block = Self {
            schema,
            header,
            null_bitmap,
            tuple_storage,
            row_capacity,
        };

        if new_block {
            block.header.set_num_tuples(0);
            if let Some(bitmap) = block.null_bitmap.as_mut() {
                bitmap.clear();
            }
        }

        Ok(block)
    }

    pub fn schema(&self) -> &'a RelationSchema {
        self.schema
    }

    /// Count of live, committed tuples.
    pub fn num_tuples(&self) -> usize {
        self.header.num_tuples()
    }

    pub fn is_empty(&self) -> bool {
        self.num_tuples() == 0
    }

    /// Largest number of tuples this region can ever hold.
    pub fn row_capacity(&self) -> usize {
        self.row_capacity
    }

    pub fn has_tuple_with_id(&self, tuple_id: usize) -> bool {
        tuple_id < self.num_tuples()
    }

    /// Non-mutating capacity predicate: the precondition of every insert
    /// path.
    pub fn has_space_to_insert(&self, num_tuples: usize) -> bool {
        self.num_tuples() + num_tuples <= self.row_capacity
    }

    fn estimate_num_tuples_insertable(&self) -> usize {
        self.row_capacity - self.num_tuples()
    }

    /// Inserts one tuple literal. Returns `id: None` when the block is
    /// full; otherwise the new tuple's id is the pre-insert tuple count.
    pub fn insert_tuple(&mut self, tuple: &Tuple) -> InsertResult {
        debug_assert_eq!(tuple.len(), self.schema.attribute_count());
        #[cfg(debug_assertions)]
        self.paranoid_insert_type_check(tuple);

        if !self.has_space_to_insert(1) {
            return InsertResult {
                id: None,
                reorganized: false,
            };
        }

        let schema = self.schema;
        let num_nullable = schema.num_nullable_attributes();
        let committed = self.header.num_tuples();
        let base = committed * schema.fixed_byte_length();

        for (attr_id, value) in tuple.iter().enumerate() {
            let nullable_idx = schema.nullable_index(attr_id);
            if let (Some(nullable_idx), true) = (nullable_idx, value.is_null()) {
                if let Some(bitmap) = self.null_bitmap.as_mut() {
                    bitmap.set(committed * num_nullable + nullable_idx, true);
                }
            } else {
                let offset = base + schema.fixed_length_offset(attr_id);
                let width = schema.attribute(attr_id).max_byte_length();
                value.copy_into(&mut self.tuple_storage[offset..offset + width]);
            }
        }

        self.header.set_num_tuples(committed + 1);
        InsertResult {
            id: Some(committed),
            reorganized: false,
        }
    }

    #[cfg(debug_assertions)]
    fn paranoid_insert_type_check(&self, tuple: &Tuple) {
        for (attr_id, value) in tuple.iter().enumerate() {
            let attr = self.schema.attribute(attr_id);
            debug_assert!(
                value.is_plausible_instance_of(attr.data_type()),
                "value {:?} is not an instance of attribute {} ({:?})",
                value,
                attr.name(),
                attr.data_type()
            );
            debug_assert!(
                !value.is_null() || attr.is_nullable(),
                "null value for non-nullable attribute {}",
                attr.name()
            );
        }
    }

    /// Bulk-inserts every tuple the accessor yields, in schema order.
    /// Returns the number inserted (less than the source count when the
    /// block fills).
    pub fn bulk_insert_tuples<A: ValueAccessor + ?Sized>(&mut self, accessor: &mut A) -> usize {
        let attribute_map: Vec<Option<usize>> =
            (0..self.schema.attribute_count()).map(Some).collect();
        self.bulk_insert_dispatcher::<false, A>(&attribute_map, accessor, usize::MAX)
    }

    /// Bulk-inserts with destination attribute `d` fed from source
    /// attribute `attribute_map[d]`. The map must cover every
    /// destination attribute (no sentinels).
    pub fn bulk_insert_tuples_with_remapped_attributes<A: ValueAccessor + ?Sized>(
        &mut self,
        attribute_map: &[Option<usize>],
        accessor: &mut A,
    ) -> usize {
        debug_assert!(attribute_map.iter().all(|entry| entry.is_some()));
        self.bulk_insert_dispatcher::<false, A>(attribute_map, accessor, usize::MAX)
    }

    /// Bulk-inserts at most `max_num_tuples_to_insert` rows covering only
    /// the mapped destination attributes; `None` entries are skipped.
    ///
    /// The committed tuple count is left unchanged so further partial
    /// inserts can fill the remaining attributes of the same rows; call
    /// `bulk_insert_partial_tuples_finalize` to publish them.
    pub fn bulk_insert_partial_tuples<A: ValueAccessor + ?Sized>(
        &mut self,
        attribute_map: &[Option<usize>],
        accessor: &mut A,
        max_num_tuples_to_insert: usize,
    ) -> usize {
        self.bulk_insert_dispatcher::<true, A>(attribute_map, accessor, max_num_tuples_to_insert)
    }

    /// Commits rows written by preceding partial bulk inserts, making
    /// them visible to readers.
    pub fn bulk_insert_partial_tuples_finalize(&mut self, num_tuples_inserted: usize) {
        debug_assert!(self.num_tuples() + num_tuples_inserted <= self.row_capacity);
        self.header
            .set_num_tuples(self.header.num_tuples() + num_tuples_inserted);
    }

    fn bulk_insert_dispatcher<const HAS_GAPS: bool, A: ValueAccessor + ?Sized>(
        &mut self,
        attribute_map: &[Option<usize>],
        accessor: &mut A,
        max_num_tuples_to_insert: usize,
    ) -> usize {
        let has_nullable = self.schema.has_nullable_attributes();
        let merge = accessor.implementation().is_row_store();

        match (has_nullable, merge) {
            (true, true) => self.bulk_insert_helper::<true, HAS_GAPS, true, A>(
                attribute_map,
                accessor,
                max_num_tuples_to_insert,
            ),
            (true, false) => self.bulk_insert_helper::<true, HAS_GAPS, false, A>(
                attribute_map,
                accessor,
                max_num_tuples_to_insert,
            ),
            (false, true) => self.bulk_insert_helper::<false, HAS_GAPS, true, A>(
                attribute_map,
                accessor,
                max_num_tuples_to_insert,
            ),
            (false, false) => self.bulk_insert_helper::<false, HAS_GAPS, false, A>(
                attribute_map,
                accessor,
                max_num_tuples_to_insert,
            ),
        }
    }

    fn bulk_insert_helper<
        const HAS_NULLABLE: bool,
        const HAS_GAPS: bool,
        const MERGE_CONTIGUOUS: bool,
        A: ValueAccessor + ?Sized,
    >(
        &mut self,
        attribute_map: &[Option<usize>],
        accessor: &mut A,
        max_num_tuples_to_insert: usize,
    ) -> usize {
        debug_assert_eq!(attribute_map.len(), self.schema.attribute_count());

        let schema = self.schema;
        let runs = plan_runs::<HAS_NULLABLE, HAS_GAPS, MERGE_CONTIGUOUS>(schema, attribute_map);
        let num_nullable = schema.num_nullable_attributes();
        let committed = self.header.num_tuples();
        let max_inserts = self
            .estimate_num_tuples_insertable()
            .min(max_num_tuples_to_insert);

        let storage = &mut *self.tuple_storage;
        let mut bitmap = self.null_bitmap.as_mut();
        let mut dest = committed * schema.fixed_byte_length();
        let mut inserted = 0;

        while inserted < max_inserts && accessor.next() {
            for run in &runs {
                match *run {
                    Run::ContiguousAttrs {
                        source_attr_id,
                        bytes_to_copy,
                        bytes_to_advance,
                    } => {
                        let value = accessor.untyped_value(source_attr_id);
                        storage[dest..dest + bytes_to_copy]
                            .copy_from_slice(&value[..bytes_to_copy]);
                        dest += bytes_to_advance;
                    }
                    Run::NullableAttr {
                        source_attr_id,
                        bytes_to_copy,
                        bytes_to_advance,
                        nullable_idx,
                    } if HAS_NULLABLE => {
                        match accessor.untyped_value_nullable(source_attr_id) {
                            Some(value) => {
                                storage[dest..dest + bytes_to_copy]
                                    .copy_from_slice(&value[..bytes_to_copy]);
                            }
                            None => {
                                if let Some(bitmap) = bitmap.as_mut() {
                                    bitmap.set(
                                        (committed + inserted) * num_nullable + nullable_idx,
                                        true,
                                    );
                                }
                            }
                        }
                        // Leaving blank space behind a null value is
                        // fine; its bytes are dead.
                        dest += bytes_to_advance;
                    }
                    Run::Gap { bytes_to_advance } if HAS_GAPS => {
                        dest += bytes_to_advance;
                    }
                    _ => {}
                }
            }
            inserted += 1;
        }

        if !HAS_GAPS {
            self.header.set_num_tuples(committed + inserted);
        }
        inserted
    }

    /// Raw bytes of an attribute value, or None when it is null.
    pub fn get_attribute_value(&self, tuple_id: usize, attr_id: usize) -> Option<&[u8]> {
        debug_assert!(self.has_tuple_with_id(tuple_id));

        if let (Some(nullable_idx), Some(bitmap)) =
            (self.schema.nullable_index(attr_id), self.null_bitmap.as_ref())
        {
            let num_nullable = self.schema.num_nullable_attributes();
            if bitmap.get(tuple_id * num_nullable + nullable_idx) {
                return None;
            }
        }

        let base =
            tuple_id * self.schema.fixed_byte_length() + self.schema.fixed_length_offset(attr_id);
        let width = self.schema.attribute(attr_id).max_byte_length();
        Some(&self.tuple_storage[base..base + width])
    }

    /// Decoded attribute value; `Value::Null` when the null bit is set.
    pub fn get_attribute_value_typed(&self, tuple_id: usize, attr_id: usize) -> Value {
        match self.get_attribute_value(tuple_id, attr_id) {
            Some(bytes) => Value::from_bytes(self.schema.attribute(attr_id).data_type(), bytes),
            None => Value::Null,
        }
    }

    /// Overwrites one attribute of a live tuple in place. Storage bytes
    /// are untouched when the new value is null.
    pub fn set_attribute_value_in_place_typed(
        &mut self,
        tuple_id: usize,
        attr_id: usize,
        value: &Value,
    ) {
        debug_assert!(self.has_tuple_with_id(tuple_id));
        debug_assert!(
            value.is_plausible_instance_of(self.schema.attribute(attr_id).data_type())
        );

        let schema = self.schema;
        if let Some(nullable_idx) = schema.nullable_index(attr_id) {
            let num_nullable = schema.num_nullable_attributes();
            let bit = tuple_id * num_nullable + nullable_idx;
            if let Some(bitmap) = self.null_bitmap.as_mut() {
                if value.is_null() {
                    bitmap.set(bit, true);
                    return;
                }
                bitmap.set(bit, false);
            }
        }

        let base = tuple_id * schema.fixed_byte_length() + schema.fixed_length_offset(attr_id);
        let width = schema.attribute(attr_id).max_byte_length();
        value.copy_into(&mut self.tuple_storage[base..base + width]);
    }

    /// Removes one tuple. Deleting the last tuple truncates; deleting an
    /// interior tuple slides every later tuple (and its null bits) down
    /// one slot. Returns true when any tuple id changed.
    pub fn delete_tuple(&mut self, tuple_id: usize) -> bool {
        debug_assert!(self.has_tuple_with_id(tuple_id));

        let num_nullable = self.schema.num_nullable_attributes();
        let num_tuples = self.header.num_tuples();

        if tuple_id == num_tuples - 1 {
            self.header.set_num_tuples(tuple_id);
            if let Some(bitmap) = self.null_bitmap.as_mut() {
                bitmap.set_range(tuple_id * num_nullable, num_nullable, false);
            }
            return false;
        }

        let tuple_length = self.schema.fixed_byte_length();
        let start = (tuple_id + 1) * tuple_length;
        let end = num_tuples * tuple_length;
        self.tuple_storage.copy_within(start..end, tuple_id * tuple_length);

        if let Some(bitmap) = self.null_bitmap.as_mut() {
            bitmap.shift_tail_forward(tuple_id * num_nullable, num_nullable);
        }

        self.header.set_num_tuples(num_tuples - 1);
        true
    }

    /// Removes every tuple in the sorted id set. A contiguous suffix is
    /// truncated in place; otherwise survivors are packed forward.
    /// Returns true when any surviving tuple id changed.
    pub fn bulk_delete_tuples(&mut self, tuples: &TupleIdSequence) -> bool {
        let (Some(front), Some(back)) = (tuples.first(), tuples.last()) else {
            return false;
        };

        let num_tuples = self.header.num_tuples();
        let num_deleted = tuples.len();
        let num_nullable = self.schema.num_nullable_attributes();
        debug_assert!(back < num_tuples);

        if back == num_tuples - 1 && back - front == num_deleted - 1 {
            self.header.set_num_tuples(front);
            if let Some(bitmap) = self.null_bitmap.as_mut() {
                bitmap.set_range(front * num_nullable, num_deleted * num_nullable, false);
            }
            return false;
        }

        let tuple_length = self.schema.fixed_byte_length();
        let storage = &mut *self.tuple_storage;
        let mut bitmap = self.null_bitmap.as_mut();
        let mut dest_tid = front;
        let mut src_tid = front;
        let mut victims = tuples.iter().peekable();

        for current in front..num_tuples {
            if victims.peek() == Some(&current) {
                victims.next();

                if let Some(bitmap) = bitmap.as_mut() {
                    bitmap.shift_tail_forward(dest_tid * num_nullable, num_nullable);
                }

                if victims.peek().is_none() {
                    // Last victim consumed; the remaining suffix moves in
                    // one piece.
                    let remaining = num_tuples - back - 1;
                    storage.copy_within(
                        (src_tid + 1) * tuple_length..(src_tid + 1 + remaining) * tuple_length,
                        dest_tid * tuple_length,
                    );
                    break;
                }
            } else {
                storage.copy_within(
                    src_tid * tuple_length..(src_tid + 1) * tuple_length,
                    dest_tid * tuple_length,
                );
                dest_tid += 1;
            }
            src_tid += 1;
        }

        self.header.set_num_tuples(num_tuples - num_deleted);
        true
    }

    /// Iteration view over the committed tuples.
    pub fn value_accessor(&self) -> RowStoreValueAccessor<'_, 'a> {
        RowStoreValueAccessor::new(
            self.schema,
            self.header.num_tuples(),
            &*self.tuple_storage,
            self.null_bitmap.as_ref(),
        )
    }

    /// Iteration view restricted to the ids in `selection`.
    pub fn value_accessor_for_ids<'s>(
        &'s self,
        selection: &'s TupleIdSequence,
    ) -> SelectionValueAccessor<'s, 'a> {
        SelectionValueAccessor::new(self.value_accessor(), selection)
    }
}
