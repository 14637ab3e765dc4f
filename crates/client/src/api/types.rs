//! Wire types for the ordering backend's REST API.
//!
//! Success responses use a `{ "data": ... }` envelope. Error bodies are
//! handled separately by the classifier in [`crate::error`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use tavola_core::{Dish, DishCategory, DishId, Order, OrderStatus, Price};

use crate::session::UserProfile;

/// Standard success envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartData {
    pub cart: RemoteCart,
}

/// The cart as the backend returns it.
///
/// Items stay raw JSON so the synchronizer can filter a corrupt entry
/// without failing the whole response; the reported totals are advisory -
/// the in-memory state always recomputes its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_price: Option<Price>,
}

/// One `{ dishId, quantity }` pair of the full-replacement cart update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub dish_id: DishId,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplaceCartRequest {
    pub items: Vec<CartItemInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthData {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserData {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DishData {
    pub dish: Dish,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DishesData {
    pub dishes: Vec<Dish>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderData {
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersData {
    pub orders: Vec<Order>,
}

/// Fields for creating or replacing a menu dish (admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub category: DishCategory,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Checkout request. The idempotency key lets the backend drop a
/// double-submitted order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceOrderRequest {
    pub idempotency_key: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusRequest {
    pub status: OrderStatus,
}
