//! # Bulk-Insert Run Planner
//!
//! Bulk insertion copies attribute values from a source accessor into the
//! dense tuple region. Doing that one attribute at a time costs one
//! address calculation and one copy per attribute per tuple. The planner
//! compiles the *attribute map* — destination position → source attribute
//! id, with `None` marking a destination attribute no source feeds — into
//! a short program of `Run`s that the insert kernel replays per tuple,
//! minimizing copies and address arithmetic.
//!
//! ## Run Variants
//!
//! A `ContiguousAttrs` run copies one or more attributes with a single
//! copy. "Contiguous" means the attribute ids are successive in both the
//! source and destination relations, which only holds when the source is
//! itself a row store; the `MERGE_CONTIGUOUS` parameter gates merging.
//!
//! A `NullableAttr` run covers exactly one nullable attribute: the kernel
//! branches on the source value and either copies the inline bytes or
//! sets the destination null bit. Nullable attributes use fixed-width
//! inline storage, so when a tuple's value is null the inline bytes have
//! no meaning and copying them is harmless. The planner exploits this to
//! merge aggressively: a `ContiguousAttrs` run may swallow a nullable
//! attribute's bytes, followed by an *empty* `NullableAttr` run
//! (`bytes_to_copy == bytes_to_advance == 0`) that only checks the null
//! bit after the fact.
//!
//! A `Gap` run skips destination attributes that no source feeds (the
//! partial-insert path). Only a run of leading sentinels produces a `Gap`;
//! interior and trailing sentinels fold into the preceding run's
//! `bytes_to_advance`.
//!
//! ## Example
//!
//! For 4-byte attributes from a row-store source, the attribute map
//! `[None, 0, 5, 6, 7, None, 2, 4, 9, 10]` with destination attributes 4
//! and 7 nullable compiles to:
//!
//! ```text
//! | run              | source | bytes_to_copy | bytes_to_advance |
//! |------------------|--------|---------------|------------------|
//! | Gap              |      - |             0 |                4 |
//! | ContiguousAttrs  |      0 |             4 |                4 |
//! | ContiguousAttrs  |      5 |            12 |               16 |
//! | NullableAttr     |      7 |             0 |                0 |
//! | ContiguousAttrs  |      2 |             4 |                4 |
//! | NullableAttr     |      4 |             4 |                4 |
//! | ContiguousAttrs  |      9 |             8 |                8 |
//! ```
//!
//! Five copies and six address calculations cover ten attributes.
//!
//! ## Compile-Time Parameters
//!
//! The planner and kernel are monomorphized over three const predicates
//! so disabled logic is statically removed:
//!
//! - `HAS_NULLABLE`: the destination schema has nullable attributes.
//! - `HAS_GAPS`: the attribute map may contain `None` sentinels (partial
//!   inserts only).
//! - `MERGE_CONTIGUOUS`: the source is a row store, so successive ids can
//!   be coalesced into one copy.

use smallvec::SmallVec;

use crate::schema::RelationSchema;

/// One compiled instruction of a bulk-insert program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    /// Copy `bytes_to_copy` bytes starting at the source attribute, then
    /// advance the destination cursor by `bytes_to_advance` (which may
    /// exceed the copy to absorb trailing gap bytes).
    ContiguousAttrs {
        source_attr_id: usize,
        bytes_to_copy: usize,
        bytes_to_advance: usize,
    },
    /// Fetch one nullable source value; copy it or set the destination
    /// null bit. The empty form (0/0) re-checks an attribute whose bytes
    /// a preceding `ContiguousAttrs` run copied speculatively.
    NullableAttr {
        source_attr_id: usize,
        bytes_to_copy: usize,
        bytes_to_advance: usize,
        nullable_idx: usize,
    },
    /// Advance the destination cursor without writing.
    Gap { bytes_to_advance: usize },
}

/// Inline capacity covers typical relations without allocation.
pub type RunProgram = SmallVec<[Run; 16]>;

#[inline]
fn nullable_index<const HAS_NULLABLE: bool>(
    schema: &RelationSchema,
    attr_id: usize,
) -> Option<usize> {
    if !HAS_NULLABLE {
        return None;
    }
    schema.nullable_index(attr_id)
}

/// Compiles an attribute map into a run program.
///
/// `attribute_map` is destination-indexed and must have one entry per
/// destination attribute. Sentinel (`None`) entries require `HAS_GAPS`.
/// Planning is deterministic: the same map and schema always yield the
/// same program.
pub fn plan_runs<const HAS_NULLABLE: bool, const HAS_GAPS: bool, const MERGE_CONTIGUOUS: bool>(
    schema: &RelationSchema,
    attribute_map: &[Option<usize>],
) -> RunProgram {
    debug_assert_eq!(attribute_map.len(), schema.attribute_count());
    debug_assert!(HAS_GAPS || attribute_map.iter().all(|entry| entry.is_some()));

    let sizes = schema.max_byte_lengths();
    let num_attrs = attribute_map.len();
    let mut runs = RunProgram::new();
    let mut attr = 0;

    // A leading sentinel span cannot fold into a preceding run, so it
    // becomes the program's only Gap run.
    if HAS_GAPS && MERGE_CONTIGUOUS {
        while attr < num_attrs && attribute_map[attr].is_none() {
            attr += 1;
        }
        if attr > 0 {
            runs.push(Run::Gap {
                bytes_to_advance: sizes[..attr].iter().sum(),
            });
        }
    }

    while attr < num_attrs {
        let run_start = attr;
        let Some(source_attr_id) = attribute_map[run_start] else {
            // Leading sentinels reach the scan only when contiguous
            // merging is off (the hoist above requires both flags).
            // There is no source attribute to open a copy run with, so
            // the span lowers to a Gap run here instead.
            debug_assert!(HAS_GAPS && run_start == 0);
            while attr < num_attrs && attribute_map[attr].is_none() {
                attr += 1;
            }
            runs.push(Run::Gap {
                bytes_to_advance: sizes[run_start..attr].iter().sum(),
            });
            continue;
        };

        match nullable_index::<HAS_NULLABLE>(schema, run_start) {
            None => {
                // Non-nullable start: extend over source-id-contiguous
                // attributes, nullable or not.
                attr += 1;
                if MERGE_CONTIGUOUS {
                    while attr < num_attrs {
                        match (attribute_map[attr - 1], attribute_map[attr]) {
                            (Some(prev), Some(cur)) if cur == prev + 1 => attr += 1,
                            _ => break,
                        }
                    }
                }
                let gap_start = attr;
                if HAS_GAPS {
                    while attr < num_attrs && attribute_map[attr].is_none() {
                        attr += 1;
                    }
                }

                let bytes_to_copy: usize = sizes[run_start..gap_start].iter().sum();
                let gap_bytes: usize = sizes[gap_start..attr].iter().sum();
                runs.push(Run::ContiguousAttrs {
                    source_attr_id,
                    bytes_to_copy,
                    bytes_to_advance: bytes_to_copy + gap_bytes,
                });

                // Nullable attributes swallowed by the copy still need
                // their null bit checked.
                for absorbed in run_start + 1..gap_start {
                    if let Some(nullable_idx) = nullable_index::<HAS_NULLABLE>(schema, absorbed) {
                        let Some(absorbed_source) = attribute_map[absorbed] else {
                            unreachable!("merged attributes are never sentinels");
                        };
                        runs.push(Run::NullableAttr {
                            source_attr_id: absorbed_source,
                            bytes_to_copy: 0,
                            bytes_to_advance: 0,
                            nullable_idx,
                        });
                    }
                }
            }
            Some(nullable_idx) => {
                // Nullable start: the run is this attribute alone so the
                // kernel can branch on its null bit.
                attr += 1;
                let gap_start = attr;
                if HAS_GAPS {
                    while attr < num_attrs && attribute_map[attr].is_none() {
                        attr += 1;
                    }
                }

                let bytes_to_copy = sizes[run_start];
                let gap_bytes: usize = sizes[gap_start..attr].iter().sum();
                runs.push(Run::NullableAttr {
                    source_attr_id,
                    bytes_to_copy,
                    bytes_to_advance: bytes_to_copy + gap_bytes,
                    nullable_idx,
                });
            }
        }
    }

    runs
}
