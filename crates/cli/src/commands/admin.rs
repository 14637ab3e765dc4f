//! Admin commands: menu management and order status updates.
//!
//! Authorization lives in the backend; these commands just send the
//! session's token and surface whatever it decides.

use rust_decimal::Decimal;

use tavola_client::api::types::DishInput;
use tavola_client::error::ApiError;
use tavola_core::{CurrencyCode, DishCategory, DishId, OrderId, OrderStatus, Price};

use super::Context;

#[allow(clippy::too_many_arguments)]
fn dish_input(
    name: String,
    price: Decimal,
    category: DishCategory,
    description: Option<String>,
    image_url: Option<String>,
    is_available: bool,
) -> DishInput {
    DishInput {
        name,
        description,
        price: Price::new(price, CurrencyCode::default()),
        category,
        is_available,
        image_url,
    }
}

/// Add a dish to the menu.
///
/// # Errors
///
/// Returns a classified error if the backend rejects the dish (validation
/// messages surface per field).
#[allow(clippy::too_many_arguments)]
pub async fn add_dish(
    ctx: &Context,
    name: String,
    price: Decimal,
    category: DishCategory,
    description: Option<String>,
    image_url: Option<String>,
    is_available: bool,
) -> Result<(), ApiError> {
    let input = dish_input(name, price, category, description, image_url, is_available);
    let dish = ctx.api.create_dish(&ctx.session, &input).await?;
    tracing::info!("Created dish #{}: {} - {}", dish.id, dish.name, dish.price);
    Ok(())
}

/// Replace a dish's menu entry.
///
/// # Errors
///
/// Returns a classified error if the dish is not found or rejected.
#[allow(clippy::too_many_arguments)]
pub async fn update_dish(
    ctx: &Context,
    dish_id: DishId,
    name: String,
    price: Decimal,
    category: DishCategory,
    description: Option<String>,
    image_url: Option<String>,
    is_available: bool,
) -> Result<(), ApiError> {
    let input = dish_input(name, price, category, description, image_url, is_available);
    let dish = ctx.api.update_dish(&ctx.session, dish_id, &input).await?;
    tracing::info!("Updated dish #{}: {} - {}", dish.id, dish.name, dish.price);
    Ok(())
}

/// Remove a dish from the menu.
///
/// # Errors
///
/// Returns a classified error if the dish is not found.
pub async fn remove_dish(ctx: &Context, dish_id: DishId) -> Result<(), ApiError> {
    ctx.api.delete_dish(&ctx.session, dish_id).await?;
    tracing::info!("Removed dish #{dish_id}");
    Ok(())
}

/// Mark a dish available or sold out.
///
/// # Errors
///
/// Returns a classified error if the dish is not found.
pub async fn set_dish_availability(
    ctx: &Context,
    dish_id: DishId,
    available: bool,
) -> Result<(), ApiError> {
    let dish = ctx
        .api
        .set_dish_availability(&ctx.session, dish_id, available)
        .await?;
    let state = if dish.is_available {
        "available"
    } else {
        "sold out"
    };
    tracing::info!("Dish #{}: {} is now {state}", dish.id, dish.name);
    Ok(())
}

/// Move an order to a new status.
///
/// # Errors
///
/// Returns a classified error if the order is not found or the transition
/// is rejected.
pub async fn set_order_status(
    ctx: &Context,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<(), ApiError> {
    let order = ctx
        .api
        .set_order_status(&ctx.session, order_id, status)
        .await?;
    tracing::info!("Order #{} is now {}", order.id, order.status);
    Ok(())
}
