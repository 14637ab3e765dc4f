//! Order tracking commands.

use tavola_client::error::ApiError;
use tavola_core::{Order, OrderId};

use super::Context;

/// List the signed-in user's orders.
///
/// # Errors
///
/// Returns a classified error if the fetch fails.
pub async fn list(ctx: &Context) -> Result<(), ApiError> {
    if !ctx.session.is_authenticated() {
        tracing::error!("Sign in to see your orders: tavola auth login");
        return Ok(());
    }

    let orders = ctx.api.list_orders(&ctx.session).await?;
    if orders.is_empty() {
        tracing::info!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        tracing::info!("{}", summary(order));
    }
    Ok(())
}

/// Show one order with its lines.
///
/// # Errors
///
/// Returns a classified error if the order is not found.
pub async fn show(ctx: &Context, order_id: OrderId) -> Result<(), ApiError> {
    if !ctx.session.is_authenticated() {
        tracing::error!("Sign in to see your orders: tavola auth login");
        return Ok(());
    }

    let order = ctx.api.get_order(&ctx.session, order_id).await?;
    tracing::info!("{}", summary(&order));
    for line in &order.items {
        tracing::info!(
            "  {} x {} - {}",
            line.quantity,
            line.dish.name,
            line.line_total()
        );
    }
    Ok(())
}

fn summary(order: &Order) -> String {
    format!(
        "Order #{} [{}] {} item(s), {} - placed {}",
        order.id,
        order.status,
        order.total_items(),
        order.total,
        order.placed_at.format("%Y-%m-%d %H:%M")
    )
}
