//! The cart store.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s plus two cached projections,
//! `item_count` and `total`. The projections are recomputed inside every
//! mutating method, so a caller holding `&Cart` never sees them out of step
//! with the items.
//!
//! Mutations never fail. Invalid input (blank id or name, non-positive price
//! or quantity) leaves the cart untouched and reports [`CartChange::Unchanged`].
//! So does a change whose count or total would not fit: projections are
//! computed before the items are touched.
//! The returned [`CartChange`] is what the owner of the cart uses to decide
//! whether to persist it and notify the page.
//!
//! # Example
//!
//! ```rust
//! use kiro_core::{Cart, CartChange};
//! use rust_decimal::Decimal;
//!
//! let mut cart = Cart::new();
//! cart.add_item("1", "HP Laptop", Decimal::from(49_999), 1);
//! cart.add_item("2", "Smartphone", Decimal::from(29_999), 1);
//! assert_eq!(cart.add_item("1", "HP Laptop", Decimal::from(49_999), 1), CartChange::Incremented);
//!
//! assert_eq!(cart.item_count(), 3);
//! assert_eq!(cart.total(), Decimal::from(129_997));
//! assert_eq!(cart.summary().formatted_total, "₹129,997");
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Price};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key within the cart.
    pub product_id: String,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// `unit_price × quantity`, or `None` if it does not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    fn is_valid(&self) -> bool {
        !self.product_id.trim().is_empty()
            && !self.name.trim().is_empty()
            && self.unit_price > Decimal::ZERO
            && self.quantity > 0
    }
}

/// What a cart mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Added,
    /// An existing line's quantity was increased.
    Incremented,
    /// A line's quantity was set.
    Updated,
    /// A line was deleted.
    Removed,
    /// Every line was deleted.
    Cleared,
    /// Nothing changed (invalid input or unknown product).
    Unchanged,
}

impl CartChange {
    /// Whether the cart must be persisted and observers notified.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Error produced when a stored cart violates the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCart {
    #[error("duplicate cart line for product {0}")]
    DuplicateProduct(String),
    #[error("invalid cart line for product {0:?}")]
    InvalidItem(String),
    #[error("cart count or total overflows")]
    TotalOverflow,
}

/// Count and total over `(unit_price, quantity)` pairs, `None` on overflow.
fn projections(lines: impl IntoIterator<Item = (Decimal, u32)>) -> Option<(u64, Decimal)> {
    lines
        .into_iter()
        .try_fold((0_u64, Decimal::ZERO), |(count, total), (price, quantity)| {
            let line = price.checked_mul(Decimal::from(quantity))?;
            Some((
                count.checked_add(u64::from(quantity))?,
                total.checked_add(line)?,
            ))
        })
}

/// The stored shape of a cart. Cached projections are ignored on read.
#[derive(Deserialize)]
struct CartRecord {
    items: Vec<CartItem>,
}

impl TryFrom<CartRecord> for Cart {
    type Error = InvalidCart;

    fn try_from(record: CartRecord) -> Result<Self, Self::Error> {
        Self::from_items(record.items)
    }
}

/// A shopping cart with derived count and total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CartRecord")]
pub struct Cart {
    items: Vec<CartItem>,
    total: Decimal,
    item_count: u64,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    /// Rebuild a cart from stored lines, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCart` if two lines share a product id or a line has a
    /// blank id or name, a non-positive price, or a zero quantity, and
    /// `TotalOverflow` if the lines cannot be totalled.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, InvalidCart> {
        for (i, item) in items.iter().enumerate() {
            if !item.is_valid() {
                return Err(InvalidCart::InvalidItem(item.product_id.clone()));
            }
            if items
                .iter()
                .take(i)
                .any(|earlier| earlier.product_id == item.product_id)
            {
                return Err(InvalidCart::DuplicateProduct(item.product_id.clone()));
            }
        }

        let (item_count, total) =
            projections(items.iter().map(|item| (item.unit_price, item.quantity)))
                .ok_or(InvalidCart::TotalOverflow)?;
        Ok(Self {
            items,
            total,
            item_count,
        })
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of quantities.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Sum of `unit_price × quantity`.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Blank `product_id` or `name`, a price that is not positive, a zero
    /// quantity, or an addition that would overflow the count or total leave
    /// the cart unchanged.
    pub fn add_item(
        &mut self,
        product_id: &str,
        name: &str,
        unit_price: Decimal,
        quantity: u32,
    ) -> CartChange {
        self.add_item_at(product_id, name, unit_price, quantity, Utc::now())
    }

    /// [`Cart::add_item`] with an explicit timestamp for new lines.
    pub fn add_item_at(
        &mut self,
        product_id: &str,
        name: &str,
        unit_price: Decimal,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> CartChange {
        if product_id.trim().is_empty()
            || name.trim().is_empty()
            || unit_price <= Decimal::ZERO
            || quantity == 0
        {
            return CartChange::Unchanged;
        }

        let existing = self.position(product_id);
        let new_quantity = match existing.and_then(|i| self.items.get(i)) {
            Some(item) => item.quantity.checked_add(quantity),
            None => Some(quantity),
        };
        let Some(new_quantity) = new_quantity else {
            return CartChange::Unchanged;
        };
        let Some((item_count, total)) = projections(
            self.lines_with(existing, new_quantity)
                .chain(existing.is_none().then_some((unit_price, quantity))),
        ) else {
            return CartChange::Unchanged;
        };

        let change = if let Some(item) = existing.and_then(|i| self.items.get_mut(i)) {
            item.quantity = new_quantity;
            CartChange::Incremented
        } else {
            self.items.push(CartItem {
                product_id: product_id.to_owned(),
                name: name.to_owned(),
                unit_price,
                quantity,
                added_at: now,
            });
            CartChange::Added
        };

        self.item_count = item_count;
        self.total = total;
        change
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// A quantity that would overflow the count or total is ignored.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let Some(i) = self.position(product_id) else {
            return CartChange::Unchanged;
        };
        let Ok(quantity) = u32::try_from(quantity) else {
            return CartChange::Unchanged;
        };
        let Some((item_count, total)) = projections(self.lines_with(Some(i), quantity)) else {
            return CartChange::Unchanged;
        };

        if let Some(item) = self.items.get_mut(i) {
            item.quantity = quantity;
        }
        self.item_count = item_count;
        self.total = total;
        CartChange::Updated
    }

    /// Delete a line if present.
    pub fn remove_item(&mut self, product_id: &str) -> CartChange {
        let Some(i) = self.position(product_id) else {
            return CartChange::Unchanged;
        };

        let Some((item_count, total)) = projections(
            self.lines_with(None, 0)
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, line)| line),
        ) else {
            return CartChange::Unchanged;
        };

        self.items.remove(i);
        self.item_count = item_count;
        self.total = total;
        CartChange::Removed
    }

    /// Delete every line.
    pub fn clear(&mut self) -> CartChange {
        self.items.clear();
        self.total = Decimal::ZERO;
        self.item_count = 0;
        CartChange::Cleared
    }

    /// Read-only projection for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary<'_> {
        CartSummary {
            items: &self.items,
            item_count: self.item_count,
            total: self.total,
            formatted_total: Price::new(self.total, CurrencyCode::default()).display(),
        }
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
    }

    /// Every line as `(unit_price, quantity)`, with line `replace` at `quantity`.
    fn lines_with(
        &self,
        replace: Option<usize>,
        quantity: u32,
    ) -> impl Iterator<Item = (Decimal, u32)> + '_ {
        self.items.iter().enumerate().map(move |(i, item)| {
            if Some(i) == replace {
                (item.unit_price, quantity)
            } else {
                (item.unit_price, item.quantity)
            }
        })
    }
}

/// A read-only view of a cart with its display total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary<'a> {
    pub items: &'a [CartItem],
    pub item_count: u64,
    pub total: Decimal,
    pub formatted_total: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn laptop(cart: &mut Cart) -> CartChange {
        cart.add_item("1", "HP Laptop", Decimal::from(49_999), 1)
    }

    fn phone(cart: &mut Cart) -> CartChange {
        cart.add_item("2", "Smartphone", Decimal::from(29_999), 1)
    }

    #[test]
    fn test_add_merges_and_recomputes() {
        let mut cart = Cart::new();
        assert_eq!(laptop(&mut cart), CartChange::Added);
        assert_eq!(phone(&mut cart), CartChange::Added);
        assert_eq!(laptop(&mut cart), CartChange::Incremented);

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].product_id.as_str(), items[0].quantity), ("1", 2));
        assert_eq!((items[1].product_id.as_str(), items[1].quantity), ("2", 1));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::from(129_997));
    }

    #[test]
    fn test_add_with_quantity() {
        let mut cart = Cart::new();
        cart.add_item("3", "Headphones", Decimal::new(199_950, 2), 3);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Decimal::new(599_850, 2));
    }

    #[test]
    fn test_add_rejects_missing_fields() {
        let mut cart = Cart::new();
        laptop(&mut cart);
        let before = cart.clone();

        assert_eq!(
            cart.add_item("", "Thing", Decimal::from(10), 1),
            CartChange::Unchanged
        );
        assert_eq!(
            cart.add_item("9", "  ", Decimal::from(10), 1),
            CartChange::Unchanged
        );
        assert_eq!(
            cart.add_item("9", "Thing", Decimal::ZERO, 1),
            CartChange::Unchanged
        );
        assert_eq!(
            cart.add_item("9", "Thing", Decimal::from(-5), 1),
            CartChange::Unchanged
        );
        assert_eq!(
            cart.add_item("9", "Thing", Decimal::from(10), 0),
            CartChange::Unchanged
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals_hold_after_every_add() {
        let mut cart = Cart::new();
        let adds = [
            ("a", 100, 1),
            ("b", 250, 2),
            ("a", 100, 4),
            ("c", 5, 10),
            ("b", 250, 1),
        ];
        for (id, price, qty) in adds {
            cart.add_item(id, "Item", Decimal::from(price), qty);
            let count: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
            let total: Decimal = cart.items().iter().map(|i| i.line_total().unwrap()).sum();
            assert_eq!(cart.item_count(), count);
            assert_eq!(cart.total(), total);
        }
        assert_eq!(cart.item_count(), 18);
        assert_eq!(cart.total(), Decimal::from(500 + 750 + 50));
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        laptop(&mut cart);
        phone(&mut cart);

        assert_eq!(cart.set_quantity("2", 4), CartChange::Updated);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), Decimal::from(49_999 + 4 * 29_999));

        assert_eq!(cart.set_quantity("missing", 4), CartChange::Unchanged);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        for quantity in [0, -1, -100] {
            let mut via_set = Cart::new();
            laptop(&mut via_set);
            phone(&mut via_set);
            let mut via_remove = via_set.clone();

            assert_eq!(via_set.set_quantity("1", quantity), CartChange::Removed);
            via_remove.remove_item("1");
            assert_eq!(via_set, via_remove);
            assert_eq!(via_set.item_count(), 1);
        }
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new();
        laptop(&mut cart);
        phone(&mut cart);

        assert_eq!(cart.remove_item("1"), CartChange::Removed);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), Decimal::from(29_999));
        assert_eq!(cart.remove_item("1"), CartChange::Unchanged);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        laptop(&mut cart);
        phone(&mut cart);
        laptop(&mut cart);

        assert_eq!(cart.clear(), CartChange::Cleared);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart, Cart::new());
    }

    #[test]
    fn test_summary() {
        let mut cart = Cart::new();
        laptop(&mut cart);
        phone(&mut cart);
        laptop(&mut cart);

        let summary = cart.summary();
        assert_eq!(summary.items, cart.items());
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, Decimal::from(129_997));
        assert_eq!(summary.formatted_total, "₹129,997");
    }

    #[test]
    fn test_summary_formats_large_totals() {
        let mut cart = Cart::new();
        cart.add_item("tv", "Television", Decimal::from(1_234_567), 1);
        assert_eq!(cart.summary().formatted_total, "₹1,234,567");
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        let at = "2024-05-01T10:00:00Z".parse().unwrap();
        cart.add_item_at("1", "HP Laptop", Decimal::from(49_999), 2, at);

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["itemCount"], 2);
        assert_eq!(value["total"], "99998");
        assert_eq!(value["items"][0]["productId"], "1");
        assert_eq!(value["items"][0]["price"], "49999");
        assert_eq!(value["items"][0]["addedAt"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_deserialize_recomputes_projections() {
        let json = r#"{
            "items": [
                {"productId": "1", "name": "HP Laptop", "price": 49999, "quantity": 2,
                 "addedAt": "2024-05-01T10:00:00.000Z"}
            ],
            "total": 1,
            "itemCount": 99
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::from(99_998));
    }

    #[test]
    fn test_deserialize_rejects_broken_invariants() {
        let duplicate = r#"{"items": [
            {"productId": "1", "name": "A", "price": 1, "quantity": 1, "addedAt": "2024-05-01T10:00:00Z"},
            {"productId": "1", "name": "A", "price": 1, "quantity": 1, "addedAt": "2024-05-01T10:00:00Z"}
        ]}"#;
        assert!(serde_json::from_str::<Cart>(duplicate).is_err());

        let zero_quantity = r#"{"items": [
            {"productId": "1", "name": "A", "price": 1, "quantity": 0, "addedAt": "2024-05-01T10:00:00Z"}
        ]}"#;
        assert!(serde_json::from_str::<Cart>(zero_quantity).is_err());
    }

    fn big_ticket() -> Decimal {
        "50000000000000000000000000000".parse().unwrap()
    }

    #[test]
    fn test_add_that_would_overflow_is_ignored() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_item("1", "Big", Decimal::MAX, 2),
            CartChange::Unchanged
        );
        assert!(cart.is_empty());

        assert_eq!(cart.add_item("1", "Big", big_ticket(), 1), CartChange::Added);
        let before = cart.clone();
        assert_eq!(cart.add_item("1", "Big", big_ticket(), 1), CartChange::Unchanged);
        assert_eq!(cart.add_item("2", "Bigger", big_ticket(), 1), CartChange::Unchanged);
        assert_eq!(cart, before);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total(), big_ticket());
    }

    #[test]
    fn test_add_past_max_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item("1", "Cable", Decimal::ONE, u32::MAX);
        assert_eq!(cart.add_item("1", "Cable", Decimal::ONE, 1), CartChange::Unchanged);
        assert_eq!(cart.item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_set_quantity_that_would_overflow_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item("1", "Big", Decimal::from(10_u64.pow(20)), 1);
        laptop(&mut cart);
        let before = cart.clone();

        assert_eq!(cart.set_quantity("1", i64::MAX), CartChange::Unchanged);
        assert_eq!(cart.set_quantity("1", i64::from(u32::MAX)), CartChange::Unchanged);
        assert_eq!(cart, before);

        assert_eq!(cart.set_quantity("1", 3), CartChange::Updated);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_from_items_rejects_overflowing_totals() {
        let at = "2024-05-01T10:00:00Z".parse().unwrap();
        let line = |id: &str| CartItem {
            product_id: id.to_owned(),
            name: "Big".to_owned(),
            unit_price: big_ticket(),
            quantity: 1,
            added_at: at,
        };

        assert!(Cart::from_items(vec![line("1")]).is_ok());
        assert_eq!(
            Cart::from_items(vec![line("1"), line("2")]),
            Err(InvalidCart::TotalOverflow)
        );

        let overflowing = r#"{"items": [
            {"productId": "1", "name": "Big", "price": "50000000000000000000000000000", "quantity": 2, "addedAt": "2024-05-01T10:00:00Z"}
        ]}"#;
        assert!(serde_json::from_str::<Cart>(overflowing).is_err());
    }

    #[test]
    fn test_change_is_mutation() {
        assert!(CartChange::Added.is_mutation());
        assert!(CartChange::Cleared.is_mutation());
        assert!(!CartChange::Unchanged.is_mutation());
    }
}
