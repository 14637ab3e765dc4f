//! Cart lines and in-memory cart state.
//!
//! Totals are always recomputed from the line list, never stored, so they
//! cannot drift out of sync with the lines.

use serde::{Deserialize, Serialize};

use super::dish::DishSnapshot;
use super::id::DishId;
use super::price::{CurrencyCode, Price};

/// One dish in the cart with its quantity.
///
/// Invariant: a cart holds at most one line per dish id, and `quantity` is
/// always positive - mutations that would drive it to zero remove the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub dish: DishSnapshot,
    pub quantity: u32,
}

impl CartLine {
    /// Create a line for `quantity` units of a dish.
    #[must_use]
    pub const fn new(dish: DishSnapshot, quantity: u32) -> Self {
        Self { dish, quantity }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.dish.price.line_total(self.quantity)
    }
}

/// The in-memory cart: an ordered sequence of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from validated lines.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of items: the sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Total price: the sum of price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let currency = self
            .lines
            .first()
            .map_or(CurrencyCode::default(), |line| {
                line.dish.price.currency_code
            });
        self.lines
            .iter()
            .fold(Price::zero(currency), |acc, line| acc + line.line_total())
    }

    /// Find the line for a dish, if present.
    #[must_use]
    pub fn line(&self, dish_id: DishId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.dish.id == dish_id)
    }

    /// Add `quantity` units of a dish. An existing line for the same dish id
    /// is incremented rather than duplicated.
    pub fn add(&mut self, dish: DishSnapshot, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|line| line.dish.id == dish.id) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine::new(dish, quantity));
        }
    }

    /// Remove the line for a dish entirely. Returns whether a line was removed.
    pub fn remove(&mut self, dish_id: DishId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.dish.id != dish_id);
        self.lines.len() != before
    }

    /// Set the quantity for a dish. A quantity of zero or below removes the
    /// line, matching the positive-quantity invariant.
    pub fn set_quantity(&mut self, dish_id: DishId, quantity: i64) {
        if quantity <= 0 {
            self.remove(dish_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|line| line.dish.id == dish_id) {
            line.quantity = quantity;
        }
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn snapshot(id: i32, cents: i64) -> DishSnapshot {
        DishSnapshot {
            id: DishId::new(id),
            name: format!("dish-{id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
            is_available: true,
        }
    }

    #[test]
    fn test_totals_recomputed_from_lines() {
        let mut cart = CartState::empty();
        cart.add(snapshot(1, 1000), 2);
        cart.add(snapshot(2, 450), 3);

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price().amount, Decimal::new(3350, 2));

        cart.remove(DishId::new(2));
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price().amount, Decimal::new(2000, 2));
    }

    #[test]
    fn test_add_existing_dish_increments_quantity() {
        let mut cart = CartState::empty();
        cart.add(snapshot(1, 1000), 1);
        cart.add(snapshot(1, 1000), 2);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(DishId::new(1)).map(|l| l.quantity), Some(3));
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes_line() {
        for quantity in [0_i64, -5] {
            let mut by_update = CartState::empty();
            by_update.add(snapshot(1, 1000), 2);
            by_update.set_quantity(DishId::new(1), quantity);

            let mut by_remove = CartState::empty();
            by_remove.add(snapshot(1, 1000), 2);
            by_remove.remove(DishId::new(1));

            assert_eq!(by_update, by_remove);
            assert!(by_update.is_empty());
        }
    }

    #[test]
    fn test_set_quantity_replaces_not_increments() {
        let mut cart = CartState::empty();
        cart.add(snapshot(1, 1000), 5);
        cart.set_quantity(DishId::new(1), 2);
        assert_eq!(cart.line(DishId::new(1)).map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = CartState::empty();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price().amount, Decimal::ZERO);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = CartState::empty();
        cart.add(snapshot(1, 1000), 0);
        assert!(cart.is_empty());
    }
}
