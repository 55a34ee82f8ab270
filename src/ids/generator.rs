//! Monotonic identity generator.
//!
//! Identities are handed out in increasing order and are never reused, even
//! when the construction that requested one fails afterwards. The counter is
//! atomic so farms can be built on several threads against one generator.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::ScenarioError;

/// First identity handed out by a fresh generator
pub const FIRST_ID: u32 = 1;

/// Allocator for unique entity identities
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    /// Create a generator whose first identity is `first`
    pub fn starting_at(first: u32) -> Self {
        IdGenerator {
            next: AtomicU32::new(first),
        }
    }

    /// Allocate the next identity.
    ///
    /// Fails with [`ScenarioError::IdsExhausted`] instead of wrapping around,
    /// so `u32::MAX` itself is never issued.
    pub fn next_id(&self) -> Result<u32, ScenarioError> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| ScenarioError::IdsExhausted)
    }

    /// The identity the next successful call would return
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }

    /// Number of identities allocated since `first`
    pub fn allocated_since(&self, first: u32) -> u32 {
        self.peek().saturating_sub(first)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
