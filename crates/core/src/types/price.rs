//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts use [`Decimal`] so menu prices and cart totals never pick up
/// floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Total for `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            amount: self.amount + rhs.amount,
            currency_code: self.currency_code,
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    #[test]
    fn test_line_total() {
        let price = usd(1250);
        let total = price.line_total(3);
        assert_eq!(total.amount, Decimal::new(3750, 2));
        assert_eq!(total.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(usd(999).to_string(), "$9.99");
        assert_eq!(usd(500).to_string(), "$5.00");
        assert_eq!(
            Price::new(Decimal::new(1200, 2), CurrencyCode::EUR).to_string(),
            "\u{20ac}12.00"
        );
    }

    #[test]
    fn test_add() {
        let total = usd(999) + usd(501);
        assert_eq!(total.amount, Decimal::new(1500, 2));
    }

    #[test]
    fn test_zero() {
        let zero = Price::zero(CurrencyCode::USD);
        assert_eq!(zero.amount, Decimal::ZERO);
        assert_eq!(zero.to_string(), "$0.00");
    }
}
