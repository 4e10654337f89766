//! # packrow - Fixed-Width Packed Row-Store Sub-Block
//!
//! `packrow` is the page-level tuple storage engine of a relational
//! system: it lays fixed-width tuples out in a contiguous byte region
//! lent by an outer page cache, tracks per-attribute nullability in a
//! packed bitmap, and bulk-inserts from heterogeneous source iterators
//! through a pre-compiled run program.
//!
//! ## Quick Start
//!
//! ```ignore
//! use packrow::schema::{AttributeDef, RelationSchema};
//! use packrow::storage::{PackedRowStoreSubBlock, SubBlockKind, TupleStoreDescription};
//! use packrow::types::{DataType, Tuple, Value};
//!
//! let schema = RelationSchema::new(vec![
//!     AttributeDef::new("id", DataType::Int4),
//!     AttributeDef::nullable("score", DataType::Int8),
//! ]);
//! let description = TupleStoreDescription { kind: SubBlockKind::PackedRowStore };
//!
//! let mut region = vec![0u8; 16384];
//! let mut block = PackedRowStoreSubBlock::new(&schema, &description, true, &mut region)?;
//!
//! let result = block.insert_tuple(&Tuple::new([Value::Int4(1), Value::Null]));
//! assert_eq!(result.id, Some(0));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------+
//! |   Tuple Storage Engine (subblock)        |
//! +---------------------+--------------------+
//! |  Run Planner (runs) | Accessors          |
//! +---------------------+--------------------+
//! |  Null Bitmap | Header | Layout math      |
//! +------------------------------------------+
//! |  Borrowed byte region (outer page cache) |
//! +------------------------------------------+
//! ```
//!
//! The bulk-insert path is the performance centerpiece: an attribute
//! remapping is compiled once per call into a sequence of byte-level
//! runs that fuse contiguous column copies, nullable-column checks and
//! gap skips, then replayed per source tuple by one of eight
//! monomorphized kernels selected from the schema's nullability, the
//! map's gaps, and the source's storage layout.
//!
//! ## What This Crate Is Not
//!
//! No variable-length attributes (such relations are refused at
//! construction), no transactions or recovery, no compression, no
//! indexes, no internal locking; the outer system serializes writers
//! per block.
//!
//! ## Module Overview
//!
//! - [`types`]: fixed-width data types, runtime values, tuple literals
//! - [`schema`]: read-only relation description with precomputed layout
//! - [`storage`]: the sub-block engine, bitmap, run planner, accessors

pub mod schema;
pub mod storage;
pub mod types;

pub use schema::{AttributeDef, RelationSchema};
pub use storage::{
    AccessorImpl, InsertResult, PackedRowStoreSubBlock, SubBlockKind, TupleIdSequence,
    TupleStoreDescription, ValueAccessor,
};
pub use types::{DataType, Tuple, Value};
