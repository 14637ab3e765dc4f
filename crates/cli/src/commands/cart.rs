//! Cart commands: show, add, remove, update, clear, checkout.

use tavola_client::error::ApiError;
use tavola_core::{CartState, DishId};

use super::{Context, finish_with_wait};

/// Show the cart.
pub async fn show(ctx: &Context) {
    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;
    print_cart(cart.state());
}

/// Add a dish to the cart.
///
/// # Errors
///
/// Returns a classified error if the dish lookup or persistence fails; the
/// optimistic in-memory update stands either way.
pub async fn add(
    ctx: &Context,
    dish_id: DishId,
    quantity: u32,
    wait: bool,
) -> Result<(), ApiError> {
    let dish = ctx.api.get_dish(dish_id).await?;
    if !dish.is_available {
        tracing::warn!("{} is currently sold out", dish.name);
    }

    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;
    let result = cart.add(&ctx.session, dish.snapshot(), quantity).await;
    finish_with_wait(&mut cart, &ctx.session, wait, result).await?;

    tracing::info!("Added {quantity} x {}", dish.name);
    print_cart(cart.state());
    Ok(())
}

/// Remove a dish from the cart.
///
/// # Errors
///
/// Returns a classified error if persistence fails.
pub async fn remove(ctx: &Context, dish_id: DishId, wait: bool) -> Result<(), ApiError> {
    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;

    if cart.state().line(dish_id).is_none() {
        tracing::info!("Dish {dish_id} is not in the cart");
        return Ok(());
    }

    let result = cart.remove(&ctx.session, dish_id).await;
    finish_with_wait(&mut cart, &ctx.session, wait, result).await?;

    print_cart(cart.state());
    Ok(())
}

/// Set the quantity for a dish (0 removes it).
///
/// # Errors
///
/// Returns a classified error if persistence fails.
pub async fn update(
    ctx: &Context,
    dish_id: DishId,
    quantity: i64,
    wait: bool,
) -> Result<(), ApiError> {
    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;

    let result = cart.update_quantity(&ctx.session, dish_id, quantity).await;
    finish_with_wait(&mut cart, &ctx.session, wait, result).await?;

    print_cart(cart.state());
    Ok(())
}

/// Empty the cart. Always leaves it visibly empty, even if the remote
/// clear fails.
pub async fn clear(ctx: &Context) {
    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;
    cart.clear(&ctx.session).await;
    tracing::info!("Cart cleared");
}

/// Turn the cart into an order.
///
/// # Errors
///
/// Returns a classified error if not signed in, the cart is empty, or the
/// backend rejects the checkout.
pub async fn checkout(ctx: &Context) -> Result<(), ApiError> {
    if !ctx.session.is_authenticated() {
        tracing::error!("Sign in to check out: tavola auth login");
        return Ok(());
    }

    let mut cart = ctx.cart();
    cart.load(&ctx.session).await;
    if cart.state().is_empty() {
        tracing::info!("The cart is empty");
        return Ok(());
    }

    let order = ctx.api.place_order(&ctx.session).await?;
    tracing::info!(
        "Order #{} placed: {} item(s), {} ({})",
        order.id,
        order.total_items(),
        order.total,
        order.status
    );

    // The backend consumed the remote cart; resync the local copy
    cart.load(&ctx.session).await;
    Ok(())
}

fn print_cart(state: &CartState) {
    if state.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }
    for line in state.lines() {
        tracing::info!(
            "{} x {} (#{}) - {}",
            line.quantity,
            line.dish.name,
            line.dish.id,
            line.line_total()
        );
    }
    tracing::info!(
        "Total: {} item(s), {}",
        state.total_items(),
        state.total_price()
    );
}
