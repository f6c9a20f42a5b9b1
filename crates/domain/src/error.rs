//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::cart::{CartError, CartIntegrityError};

/// Errors that can occur while loading an aggregate or executing a command
/// against the event store.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The event store refused or failed the operation.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The cart rejected the command.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The stored log could not be replayed.
    #[error("Corrupted event log: {0}")]
    Corrupted(#[from] CartIntegrityError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if the error is an optimistic concurrency conflict, in
    /// which case reloading and re-running the command may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::EventStore(err) if err.is_conflict())
    }
}
