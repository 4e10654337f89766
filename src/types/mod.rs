//! # Type System
//!
//! Fixed-width data types, runtime values, and tuple literals consumed by
//! the row-store engine.

mod data_type;
mod tuple;
mod value;

pub use data_type::DataType;
pub use tuple::Tuple;
pub use value::Value;
