//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for type safety:
//! - `Identity`: server-assigned `User<N>` connection identifier
//! - `IdentityCounter`: atomic source of fresh identities

use std::sync::atomic::{AtomicU64, Ordering};

/// Server-assigned connection identity (newtype pattern)
///
/// Wraps the counter value; renders as `User<N>`.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(pub u64);

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User{}", self.0)
    }
}

/// Monotonic identity allocator
///
/// Identities start at `User1` and are never handed out twice.
#[derive(Debug, Default)]
pub struct IdentityCounter {
    last: AtomicU64,
}

impl IdentityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identity
    pub fn next(&self) -> Identity {
        Identity(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
