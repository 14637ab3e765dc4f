//! Menu browsing commands.

use tavola_client::error::ApiError;
use tavola_core::{Dish, DishCategory, DishId};

use super::Context;

/// List dishes, optionally filtered by category.
///
/// # Errors
///
/// Returns a classified error if the menu fetch fails.
pub async fn list(ctx: &Context, category: Option<DishCategory>) -> Result<(), ApiError> {
    let dishes = ctx.api.list_dishes(category).await?;

    if dishes.is_empty() {
        tracing::info!("No dishes on the menu");
        return Ok(());
    }

    for dish in &dishes {
        tracing::info!("{}", summary(dish));
    }
    Ok(())
}

/// Show one dish in full.
///
/// # Errors
///
/// Returns a classified error if the dish is not found.
pub async fn show(ctx: &Context, dish_id: DishId) -> Result<(), ApiError> {
    let dish = ctx.api.get_dish(dish_id).await?;

    tracing::info!("{}", summary(&dish));
    if !dish.description.is_empty() {
        tracing::info!("  {}", dish.description);
    }
    if let Some(url) = &dish.image_url {
        tracing::info!("  {url}");
    }
    Ok(())
}

fn summary(dish: &Dish) -> String {
    let availability = if dish.is_available { "" } else { " (sold out)" };
    format!(
        "#{} {} - {} [{}]{availability}",
        dish.id, dish.name, dish.price, dish.category
    )
}
