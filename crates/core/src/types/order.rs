//! Orders placed at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::id::OrderId;
use super::price::Price;
use super::status::OrderStatus;

/// A placed order as returned by the orders endpoints.
///
/// The item list reuses [`CartLine`]: an order is the cart it was checked
/// out from, frozen with the prices in effect at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<CartLine>,
    pub status: OrderStatus,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// Total number of items across all order lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}
