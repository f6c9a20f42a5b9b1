//! Domain layer for the shopping cart event-sourcing system.
//!
//! This crate provides:
//! - `Aggregate`, `DomainEvent` and `Command` traits for event-sourced entities
//! - `CommandHandler`, which reconstructs an aggregate from the event store,
//!   runs a command and appends the resulting event with optimistic concurrency
//! - the `ShoppingCart` aggregate with its commands, events and service

pub mod aggregate;
pub mod cart;
pub mod command;
pub mod error;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{
    AddItem, CartCommand, CartError, CartEvent, CartIntegrityError, CartLine, CartService,
    ItemAddedData, ItemRemovedData, Money, ProductId, RemoveItem, ShoppingCart, UserId,
};
pub use command::{Command, CommandHandler, CommandResult, RetryPolicy};
pub use error::DomainError;
