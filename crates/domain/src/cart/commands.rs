//! Cart commands.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::command::Command;

use super::{Money, ProductId};

/// Command to put units of a product into a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub cart_id: AggregateId,
    pub product_id: ProductId,
    pub quantity: u32,

    /// Current unit price of the product.
    pub price: Money,
}

impl AddItem {
    pub fn new(cart_id: AggregateId, product_id: ProductId, quantity: u32, price: Money) -> Self {
        Self {
            cart_id,
            product_id,
            quantity,
            price,
        }
    }
}

/// Command to take units of a product out of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub cart_id: AggregateId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl RemoveItem {
    pub fn new(cart_id: AggregateId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            cart_id,
            product_id,
            quantity,
        }
    }
}

/// Commands accepted by the cart aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartCommand {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
}

impl CartCommand {
    pub fn product_id(&self) -> ProductId {
        match self {
            CartCommand::AddItem(cmd) => cmd.product_id,
            CartCommand::RemoveItem(cmd) => cmd.product_id,
        }
    }
}

impl Command for CartCommand {
    fn aggregate_id(&self) -> AggregateId {
        match self {
            CartCommand::AddItem(cmd) => cmd.cart_id,
            CartCommand::RemoveItem(cmd) => cmd.cart_id,
        }
    }
}

impl From<AddItem> for CartCommand {
    fn from(cmd: AddItem) -> Self {
        CartCommand::AddItem(cmd)
    }
}

impl From<RemoveItem> for CartCommand {
    fn from(cmd: RemoveItem) -> Self {
        CartCommand::RemoveItem(cmd)
    }
}
