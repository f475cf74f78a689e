//! Per-instance boundary-scope identifiers.
//!
//! UI surfaces that render several mixers into one document need a unique
//! identifier per boundary shape (SVG defs share one namespace). Identifiers
//! are allocated from a registry owned by the caller, so construction order
//! across instances carries no hidden global dependency and parallel
//! registries never collide within themselves.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates [`ScopeId`]s. One registry per rendering surface is typical.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    next: AtomicU64,
}

impl ScopeRegistry {
    pub fn new() -> ScopeRegistry {
        ScopeRegistry::default()
    }

    /// Hand out the next identifier. Never reuses one.
    pub fn allocate(&self) -> ScopeId {
        ScopeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque identifier for one mixer instance's boundary definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boundary-{}", self.0)
    }
}
