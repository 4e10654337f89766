//! # Storage Error Kinds
//!
//! The two typed errors a packed row-store sub-block surfaces at its
//! construction boundary. Both are carried inside `eyre::Report` and can
//! be recovered with `downcast_ref`. No other error kind crosses the
//! boundary: capacity exhaustion is a sentinel result, and runtime
//! precondition violations are debug assertions.

/// The provided region cannot hold the sub-block's header and bitmap.
#[derive(Debug)]
pub struct BlockMemoryTooSmall {
    pub required: usize,
    pub provided: usize,
}

impl std::fmt::Display for BlockMemoryTooSmall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "block memory too small for packed row store: need at least {} bytes, got {}",
            self.required, self.provided
        )
    }
}

impl std::error::Error for BlockMemoryTooSmall {}

/// The descriptor or relation does not describe a packed row store.
#[derive(Debug)]
pub struct InvalidDescriptor {
    pub reason: &'static str,
}

impl std::fmt::Display for InvalidDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid packed row store description: {}", self.reason)
    }
}

impl std::error::Error for InvalidDescriptor {}
