//! Menu dishes and the snapshot carried in cart lines.

use serde::{Deserialize, Serialize};

use super::id::DishId;
use super::price::Price;

/// A menu entry as served by the dishes endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: DishCategory,
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Dish {
    /// The subset of dish data captured into a cart line.
    #[must_use]
    pub fn snapshot(&self) -> DishSnapshot {
        DishSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            is_available: self.is_available,
        }
    }
}

/// Menu category for grouping and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    Starter,
    #[default]
    Main,
    Side,
    Dessert,
    Drink,
}

impl std::fmt::Display for DishCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starter => write!(f, "starter"),
            Self::Main => write!(f, "main"),
            Self::Side => write!(f, "side"),
            Self::Dessert => write!(f, "dessert"),
            Self::Drink => write!(f, "drink"),
        }
    }
}

impl std::str::FromStr for DishCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(Self::Starter),
            "main" => Ok(Self::Main),
            "side" => Ok(Self::Side),
            "dessert" => Ok(Self::Dessert),
            "drink" => Ok(Self::Drink),
            _ => Err(format!("invalid dish category: {s}")),
        }
    }
}

/// The dish data a cart line carries: enough to render and price the line
/// without refetching the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishSnapshot {
    pub id: DishId,
    pub name: String,
    pub price: Price,
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::price::CurrencyCode;

    fn margherita() -> Dish {
        Dish {
            id: DishId::new(1),
            name: "Margherita".to_string(),
            description: "Tomato, mozzarella, basil".to_string(),
            price: Price::new(Decimal::new(1150, 2), CurrencyCode::USD),
            category: DishCategory::Main,
            is_available: true,
            image_url: None,
        }
    }

    #[test]
    fn test_snapshot_captures_pricing_fields() {
        let dish = margherita();
        let snap = dish.snapshot();
        assert_eq!(snap.id, dish.id);
        assert_eq!(snap.name, dish.name);
        assert_eq!(snap.price, dish.price);
        assert!(snap.is_available);
    }

    #[test]
    fn test_dish_serde_camel_case() {
        let json = serde_json::to_value(margherita()).expect("serialize");
        assert!(json.get("isAvailable").is_some());
        assert!(json.get("is_available").is_none());
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            DishCategory::Starter,
            DishCategory::Main,
            DishCategory::Side,
            DishCategory::Dessert,
            DishCategory::Drink,
        ] {
            let parsed: DishCategory = category.to_string().parse().expect("round trip");
            assert_eq!(parsed, category);
        }
    }
}
