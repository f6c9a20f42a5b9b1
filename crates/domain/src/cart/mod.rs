//! Shopping cart aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;
mod value_objects;

pub use aggregate::ShoppingCart;
pub use commands::{AddItem, CartCommand, RemoveItem};
pub use events::{CartEvent, ItemAddedData, ItemRemovedData};
pub use service::CartService;
pub use value_objects::{CartLine, Money, ProductId, UserId};

use common::AggregateId;
use event_store::Version;
use thiserror::Error;

/// Reasons a cart rejects a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// A removal asked for more units than the cart holds. A product with no
    /// line counts as holding 0.
    #[error(
        "Not enough items in cart {cart_id}: product {product_id} requires {required_quantity}, cart has {actual_quantity}"
    )]
    NotEnoughItemsInCart {
        cart_id: AggregateId,
        product_id: ProductId,
        required_quantity: u32,
        actual_quantity: u32,
    },

    /// The line quantity would not fit in a `u32` after the addition.
    #[error(
        "Cannot add {added} of product {product_id} to cart {cart_id}: it already holds {current}"
    )]
    QuantityOverflow {
        cart_id: AggregateId,
        product_id: ProductId,
        current: u32,
        added: u32,
    },

    /// The cart's total price would not fit in `Money` after the addition.
    #[error(
        "Cannot add {quantity} of product {product_id} at {price} to cart {cart_id}: the cart total would overflow"
    )]
    AmountOverflow {
        cart_id: AggregateId,
        product_id: ProductId,
        quantity: u32,
        price: Money,
    },

    /// The cart's log has reached the last representable position.
    #[error("Cart {cart_id} cannot record more events")]
    PositionExhausted { cart_id: AggregateId },

    /// The command addresses a different cart.
    #[error("Command for cart {command_cart_id} was sent to cart {cart_id}")]
    WrongCart {
        cart_id: AggregateId,
        command_cart_id: AggregateId,
    },
}

/// A cart event log that cannot be replayed.
///
/// The command handler never produces such a log, so any of these means the
/// stored data is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartIntegrityError {
    #[error("Event {pos} of cart {cart_id} removes product {product_id}, which has no line")]
    MissingLineForRemoval {
        cart_id: AggregateId,
        product_id: ProductId,
        pos: Version,
    },

    #[error(
        "Event {pos} of cart {cart_id} removes {removed} of product {product_id}, but only {available} are present"
    )]
    QuantityUnderflow {
        cart_id: AggregateId,
        product_id: ProductId,
        pos: Version,
        available: u32,
        removed: u32,
    },

    #[error("Event {pos} of cart {cart_id} overflows the quantity of product {product_id}")]
    QuantityOverflow {
        cart_id: AggregateId,
        product_id: ProductId,
        pos: Version,
    },
}
