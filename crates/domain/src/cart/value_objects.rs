//! Value objects for the cart domain.

use serde::{Deserialize, Serialize};

/// Identifier of the user who owns a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Money amount in cents, to keep prices exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (e.g. dollars).
    pub fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> u64 {
        (self.0 % 100).unsigned_abs()
    }

    /// Multiplies by a quantity, or None on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Adds two amounts, or None on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Sums amounts, or None if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}${}.{:02}",
            self.units().unsigned_abs(),
            self.cents_part()
        )
    }
}

/// One product line of a cart.
///
/// `price` is the unit price captured when the product was first added;
/// later additions of the same product only change `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub price: Money,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(price: Money, quantity: u32) -> Self {
        Self { price, quantity }
    }

    /// Returns the same line holding `quantity` units.
    pub fn with_quantity(self, quantity: u32) -> Self {
        Self { quantity, ..self }
    }

    /// Returns price × quantity, or None if it does not fit in `Money`.
    pub fn total_price(&self) -> Option<Money> {
        self.price.checked_multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(
            Money::from_cents(i64::MIN).to_string(),
            "-$92233720368547758.08"
        );
    }

    #[test]
    fn test_money_checked_sum() {
        let total = Money::checked_sum([100, 250, 5].into_iter().map(Money::from_cents));
        assert_eq!(total, Some(Money::from_cents(355)));
        assert_eq!(Money::checked_sum([]), Some(Money::zero()));

        let overflowing = [Money::from_cents(i64::MAX), Money::from_cents(1)];
        assert_eq!(Money::checked_sum(overflowing), None);
    }

    #[test]
    fn test_cart_line_total_price() {
        let line = CartLine::new(Money::from_cents(100), 3);
        assert_eq!(line.total_price(), Some(Money::from_cents(300)));
        assert_eq!(line.with_quantity(1).total_price(), Some(Money::from_cents(100)));
        assert_eq!(line.with_quantity(1).price, line.price);
    }

    #[test]
    fn test_total_price_overflow_is_none() {
        let line = CartLine::new(Money::from_cents(i64::MAX / 2 + 1), 2);
        assert_eq!(line.total_price(), None);
        assert_eq!(line.with_quantity(1).total_price(), Some(line.price));
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&ProductId::new(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&UserId::new(1)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Money::from_cents(100)).unwrap(), "100");
    }
}
