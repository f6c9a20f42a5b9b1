//! Shared types for the shopping cart workspace.

pub mod id;
pub mod types;

pub use id::{IdGenerator, UuidIdGenerator};
pub use types::AggregateId;
