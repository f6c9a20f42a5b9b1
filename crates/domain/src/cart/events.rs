//! Cart domain events.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{Money, ProductId};

/// Events that can occur on a cart aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// Units of a product were put into the cart.
    ItemAdded(ItemAddedData),

    /// Units of a product were taken out of the cart.
    ItemRemoved(ItemRemovedData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "ItemAdded",
            CartEvent::ItemRemoved(_) => "ItemRemoved",
        }
    }

    fn aggregate_id(&self) -> AggregateId {
        match self {
            CartEvent::ItemAdded(data) => data.cart_id,
            CartEvent::ItemRemoved(data) => data.cart_id,
        }
    }

    fn version(&self) -> Version {
        match self {
            CartEvent::ItemAdded(data) => data.pos,
            CartEvent::ItemRemoved(data) => data.pos,
        }
    }
}

/// Data for ItemAdded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAddedData {
    pub cart_id: AggregateId,
    pub product_id: ProductId,
    pub quantity: u32,

    /// Unit price offered with this addition. Only used if the cart has no
    /// line for the product yet.
    pub price: Money,

    pub pos: Version,
}

/// Data for ItemRemoved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub cart_id: AggregateId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub pos: Version,
}

impl CartEvent {
    pub fn item_added(
        cart_id: AggregateId,
        product_id: ProductId,
        quantity: u32,
        price: Money,
        pos: Version,
    ) -> Self {
        CartEvent::ItemAdded(ItemAddedData {
            cart_id,
            product_id,
            quantity,
            price,
            pos,
        })
    }

    pub fn item_removed(
        cart_id: AggregateId,
        product_id: ProductId,
        quantity: u32,
        pos: Version,
    ) -> Self {
        CartEvent::ItemRemoved(ItemRemovedData {
            cart_id,
            product_id,
            quantity,
            pos,
        })
    }

    pub fn product_id(&self) -> ProductId {
        match self {
            CartEvent::ItemAdded(data) => data.product_id,
            CartEvent::ItemRemoved(data) => data.product_id,
        }
    }

    pub fn quantity(&self) -> u32 {
        match self {
            CartEvent::ItemAdded(data) => data.quantity,
            CartEvent::ItemRemoved(data) => data.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn cart_id() -> AggregateId {
        AggregateId::from_uuid(Uuid::from_u128(9))
    }

    #[test]
    fn test_event_metadata() {
        let event = CartEvent::item_added(
            cart_id(),
            ProductId::new(42),
            2,
            Money::from_cents(100),
            Version::new(1),
        );
        assert_eq!(event.event_type(), "ItemAdded");
        assert_eq!(event.aggregate_id(), cart_id());
        assert_eq!(event.version(), Version::new(1));
        assert_eq!(event.product_id(), ProductId::new(42));

        let event = CartEvent::item_removed(cart_id(), ProductId::new(42), 2, Version::new(2));
        assert_eq!(event.event_type(), "ItemRemoved");
        assert_eq!(event.version(), Version::new(2));
        assert_eq!(event.quantity(), 2);
    }

    #[test]
    fn test_item_added_wire_shape() {
        let event = CartEvent::item_added(
            cart_id(),
            ProductId::new(42),
            2,
            Money::from_cents(100),
            Version::new(1),
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "ItemAdded",
                "data": {
                    "cart_id": cart_id().to_string(),
                    "product_id": 42,
                    "quantity": 2,
                    "price": 100,
                    "pos": 1
                }
            })
        );

        let decoded: CartEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_item_removed_has_no_price() {
        let event = CartEvent::item_removed(cart_id(), ProductId::new(42), 1, Version::new(3));
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["data"].get("price").is_none());
        assert_eq!(json["data"]["pos"], 3);
    }
}
