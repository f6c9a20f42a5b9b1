//! Aggregate identifier generation.

use uuid::Uuid;

use crate::AggregateId;

/// Source of globally unique aggregate identifiers.
///
/// Called once, when a new aggregate is created. Keeping generation behind
/// this trait lets value types stay deterministic and lets tests supply
/// fixed IDs.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh aggregate ID.
    fn next_id(&self) -> AggregateId;
}

/// Generates random (v4) UUID-based aggregate IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> AggregateId {
        AggregateId::from_uuid(Uuid::new_v4())
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> AggregateId + Send + Sync,
{
    fn next_id(&self) -> AggregateId {
        self()
    }
}
