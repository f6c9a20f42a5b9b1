//! Cart service providing a simplified API for cart operations.

use common::{AggregateId, IdGenerator};
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::command::{Command, CommandHandler, CommandResult, RetryPolicy};
use crate::error::DomainError;

use super::{AddItem, CartCommand, CartEvent, RemoveItem, ShoppingCart, UserId};

/// Service for managing carts.
///
/// Wraps a [`CommandHandler`] so callers deal in cart commands and owners
/// instead of empty aggregates. Conflicting appends are retried according to
/// the handler's [`RetryPolicy`].
pub struct CartService<S: EventStore> {
    handler: CommandHandler<S, ShoppingCart>,
}

impl<S: EventStore> CartService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn with_retry_policy(store: S, retry: RetryPolicy) -> Self {
        Self {
            handler: CommandHandler::with_retry_policy(store, retry),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, ShoppingCart> {
        &self.handler
    }

    /// Starts a new, empty cart for `user_id` with an ID from `ids`.
    ///
    /// Nothing is stored: a cart's log begins with its first item.
    pub fn open_cart(&self, user_id: UserId, ids: &impl IdGenerator) -> ShoppingCart {
        let cart = ShoppingCart::empty(user_id, ids.next_id());
        tracing::info!(%user_id, cart_id = %cart.id(), "cart opened");
        cart
    }

    /// Reconstructs the current state of a cart from its stored log.
    #[tracing::instrument(skip(self))]
    pub async fn load_cart(
        &self,
        user_id: UserId,
        cart_id: AggregateId,
    ) -> Result<ShoppingCart, DomainError> {
        self.handler
            .load(ShoppingCart::empty(user_id, cart_id))
            .await
    }

    /// Returns a cart's decoded event log.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, cart_id: AggregateId) -> Result<Vec<CartEvent>, DomainError> {
        self.handler.events(cart_id).await
    }

    /// Adds an item to a cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        cmd: AddItem,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        self.execute(user_id, CartCommand::AddItem(cmd)).await
    }

    /// Removes an item from a cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        cmd: RemoveItem,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        self.execute(user_id, CartCommand::RemoveItem(cmd)).await
    }

    /// Executes any cart command against the cart it addresses.
    pub async fn execute(
        &self,
        user_id: UserId,
        cmd: CartCommand,
    ) -> Result<CommandResult<ShoppingCart>, DomainError> {
        let empty = ShoppingCart::empty(user_id, cmd.aggregate_id());
        self.handler.execute_with_retry(empty, &cmd).await
    }
}
