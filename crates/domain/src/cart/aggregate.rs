//! Shopping cart aggregate implementation.

use std::collections::BTreeMap;

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    AddItem, CartCommand, CartError, CartEvent, CartIntegrityError, CartLine, Money, ProductId,
    RemoveItem, UserId,
    events::{ItemAddedData, ItemRemovedData},
};

/// Shopping cart aggregate root.
///
/// An immutable value: applying an event returns a new cart and leaves the
/// old one untouched. `pos` is the position of the last applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    user_id: UserId,
    id: AggregateId,
    pos: Version,
    lines: BTreeMap<ProductId, CartLine>,
}

impl Aggregate for ShoppingCart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = CartError;
    type ReplayError = CartIntegrityError;

    fn aggregate_type() -> &'static str {
        "ShoppingCart"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn version(&self) -> Version {
        self.pos
    }

    fn apply(&self, event: &CartEvent) -> Result<Self, CartIntegrityError> {
        match event {
            CartEvent::ItemAdded(data) => self.apply_item_added(data),
            CartEvent::ItemRemoved(data) => self.apply_item_removed(data),
        }
    }

    fn handle(&self, command: &CartCommand) -> Result<CartEvent, CartError> {
        match command {
            CartCommand::AddItem(cmd) => self.add_item(cmd),
            CartCommand::RemoveItem(cmd) => self.remove_item(cmd),
        }
    }
}

// Construction and replay
impl ShoppingCart {
    /// A cart with no events applied.
    pub fn empty(user_id: UserId, id: AggregateId) -> Self {
        Self {
            user_id,
            id,
            pos: Version::initial(),
            lines: BTreeMap::new(),
        }
    }

    /// Rebuilds a cart from its event log.
    ///
    /// `events` must be this cart's events in ascending `pos` order.
    pub fn reconstruct<'a, I>(
        user_id: UserId,
        id: AggregateId,
        events: I,
    ) -> Result<Self, CartIntegrityError>
    where
        I: IntoIterator<Item = &'a CartEvent>,
    {
        Self::empty(user_id, id).replay(events)
    }
}

// Query methods
impl ShoppingCart {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn pos(&self) -> Version {
        self.pos
    }

    /// Units of `product_id` in the cart, 0 if it has no line.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.lines.get(product_id).map_or(0, |line| line.quantity)
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Lines ordered by product ID.
    pub fn lines(&self) -> impl Iterator<Item = (&ProductId, &CartLine)> {
        self.lines.iter()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of captured price × quantity over all lines.
    ///
    /// None only for a cart replayed from a log the handler would not have
    /// written, whose total does not fit in `Money`.
    pub fn total_amount(&self) -> Option<Money> {
        Self::total_of(self.lines.values())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// Command methods (return events, never change the cart)
impl ShoppingCart {
    /// Adding is always allowed; the event carries the command's price even
    /// though an existing line keeps its captured one.
    pub fn add_item(&self, cmd: &AddItem) -> Result<CartEvent, CartError> {
        self.ensure_same_cart(cmd.cart_id)?;

        let current = self.quantity_of(&cmd.product_id);
        let Some(quantity) = current.checked_add(cmd.quantity) else {
            return Err(CartError::QuantityOverflow {
                cart_id: self.id,
                product_id: cmd.product_id,
                current,
                added: cmd.quantity,
            });
        };

        let line = match self.lines.get(&cmd.product_id) {
            Some(existing) => existing.with_quantity(quantity),
            None => CartLine::new(cmd.price, quantity),
        };
        let others = self
            .lines
            .iter()
            .filter(|(product_id, _)| **product_id != cmd.product_id)
            .map(|(_, line)| line);
        if Self::total_of(others.chain([&line])).is_none() {
            return Err(CartError::AmountOverflow {
                cart_id: self.id,
                product_id: cmd.product_id,
                quantity: cmd.quantity,
                price: cmd.price,
            });
        }

        Ok(CartEvent::item_added(
            cmd.cart_id,
            cmd.product_id,
            cmd.quantity,
            cmd.price,
            self.next_pos()?,
        ))
    }

    /// Removing needs at least `cmd.quantity` units on the line.
    pub fn remove_item(&self, cmd: &RemoveItem) -> Result<CartEvent, CartError> {
        self.ensure_same_cart(cmd.cart_id)?;

        let actual_quantity = self.quantity_of(&cmd.product_id);
        if actual_quantity < cmd.quantity {
            return Err(CartError::NotEnoughItemsInCart {
                cart_id: self.id,
                product_id: cmd.product_id,
                required_quantity: cmd.quantity,
                actual_quantity,
            });
        }

        Ok(CartEvent::item_removed(
            cmd.cart_id,
            cmd.product_id,
            cmd.quantity,
            self.next_pos()?,
        ))
    }

    fn next_pos(&self) -> Result<Version, CartError> {
        self.pos
            .next()
            .ok_or(CartError::PositionExhausted { cart_id: self.id })
    }

    fn total_of<'a>(lines: impl Iterator<Item = &'a CartLine>) -> Option<Money> {
        lines
            .map(CartLine::total_price)
            .try_fold(Money::zero(), |acc, price| acc.checked_add(price?))
    }

    fn ensure_same_cart(&self, command_cart_id: AggregateId) -> Result<(), CartError> {
        if command_cart_id == self.id {
            Ok(())
        } else {
            Err(CartError::WrongCart {
                cart_id: self.id,
                command_cart_id,
            })
        }
    }
}

// Apply event helpers
impl ShoppingCart {
    fn apply_item_added(&self, data: &ItemAddedData) -> Result<Self, CartIntegrityError> {
        let line = match self.lines.get(&data.product_id) {
            Some(existing) => {
                let quantity = existing.quantity.checked_add(data.quantity).ok_or(
                    CartIntegrityError::QuantityOverflow {
                        cart_id: self.id,
                        product_id: data.product_id,
                        pos: data.pos,
                    },
                )?;
                existing.with_quantity(quantity)
            }
            None => CartLine::new(data.price, data.quantity),
        };

        Ok(self
            .clone()
            .with_pos(data.pos)
            .with_line(data.product_id, line))
    }

    fn apply_item_removed(&self, data: &ItemRemovedData) -> Result<Self, CartIntegrityError> {
        let Some(existing) = self.lines.get(&data.product_id) else {
            // Removing nothing from nothing is accepted by the handler.
            if data.quantity == 0 {
                return Ok(self.clone().with_pos(data.pos));
            }
            return Err(CartIntegrityError::MissingLineForRemoval {
                cart_id: self.id,
                product_id: data.product_id,
                pos: data.pos,
            });
        };

        let remaining = existing.quantity.checked_sub(data.quantity).ok_or(
            CartIntegrityError::QuantityUnderflow {
                cart_id: self.id,
                product_id: data.product_id,
                pos: data.pos,
                available: existing.quantity,
                removed: data.quantity,
            },
        )?;

        let next = self.clone().with_pos(data.pos);
        if remaining == 0 {
            Ok(next.without_line(&data.product_id))
        } else {
            Ok(next.with_line(data.product_id, existing.with_quantity(remaining)))
        }
    }

    fn with_pos(self, pos: Version) -> Self {
        Self { pos, ..self }
    }

    fn with_line(mut self, product_id: ProductId, line: CartLine) -> Self {
        self.lines.insert(product_id, line);
        self
    }

    fn without_line(mut self, product_id: &ProductId) -> Self {
        self.lines.remove(product_id);
        self
    }
}
