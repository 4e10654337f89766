//! # Sub-Block Header
//!
//! The leading bytes of every packed row-store region hold an 8-byte
//! header with a single field:
//!
//! ```text
//! Offset  Size  Field       Description
//! ------  ----  ----------  -------------------------------
//! 0       8     num_tuples  Count of live (committed) tuples
//! ```
//!
//! `num_tuples` is a little-endian `u64` so the layout round-trips
//! identically across platforms. The header is transmuted in place from
//! the raw region via `zerocopy`, never copied.

use eyre::{ensure, Result};
use zerocopy::little_endian::U64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of the sub-block header in bytes.
pub const HEADER_SIZE: usize = 8;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RowStoreHeader {
    num_tuples: U64,
}

const _: () = assert!(std::mem::size_of::<RowStoreHeader>() == HEADER_SIZE);

impl RowStoreHeader {
    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= HEADER_SIZE,
            "buffer too small for RowStoreHeader: {} < {}",
            data.len(),
            HEADER_SIZE
        );

        Self::mut_from_bytes(&mut data[..HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read RowStoreHeader: {:?}", e))
    }

    pub fn num_tuples(&self) -> usize {
        self.num_tuples.get() as usize
    }

    pub fn set_num_tuples(&mut self, count: usize) {
        self.num_tuples = U64::new(count as u64);
    }
}
