use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ProductError;

// ============================================================================
// Catalog Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// XP points
    Points,
    Cash,
}

/// A price or charge in one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "currency", content = "value", rename_all = "snake_case")]
pub enum Amount {
    Points(u64),
    Cash(Decimal),
}

impl Amount {
    pub fn currency(&self) -> Currency {
        match self {
            Amount::Points(_) => Currency::Points,
            Amount::Cash(_) => Currency::Cash,
        }
    }

    pub fn points(&self) -> Option<u64> {
        match self {
            Amount::Points(points) => Some(*points),
            Amount::Cash(_) => None,
        }
    }

    /// Unit price times quantity, `None` on overflow
    pub fn checked_mul(self, quantity: u32) -> Option<Amount> {
        match self {
            Amount::Points(points) => points.checked_mul(u64::from(quantity)).map(Amount::Points),
            Amount::Cash(cash) => cash.checked_mul(Decimal::from(quantity)).map(Amount::Cash),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Points(points) => write!(f, "{points} pts"),
            Amount::Cash(cash) => write!(f, "${cash}"),
        }
    }
}

/// Regular prices in both currencies plus optional discounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceList {
    pub cash: Decimal,
    pub points: u64,
    #[serde(default)]
    pub discounted_cash: Option<Decimal>,
    #[serde(default)]
    pub discounted_points: Option<u64>,
}

impl PriceList {
    pub fn new(cash: Decimal, points: u64) -> Self {
        Self {
            cash,
            points,
            discounted_cash: None,
            discounted_points: None,
        }
    }

    pub fn with_discounts(mut self, cash: Option<Decimal>, points: Option<u64>) -> Self {
        self.discounted_cash = cash;
        self.discounted_points = points;
        self
    }

    /// The price charged today: the discount when there is one
    pub fn effective(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Points => Amount::Points(self.discounted_points.unwrap_or(self.points)),
            Currency::Cash => Amount::Cash(self.discounted_cash.unwrap_or(self.cash)),
        }
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        if self.cash < Decimal::ZERO {
            return Err(ProductError::NegativePrice);
        }
        if let Some(discount) = self.discounted_cash {
            if discount < Decimal::ZERO {
                return Err(ProductError::NegativePrice);
            }
            if discount > self.cash {
                return Err(ProductError::DiscountAboveRegular(Currency::Cash));
            }
        }
        if let Some(discount) = self.discounted_points {
            if discount > self.points {
                return Err(ProductError::DiscountAboveRegular(Currency::Points));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_price_prefers_discount() {
        let prices = PriceList::new(dec!(25.00), 60);
        assert_eq!(prices.effective(Currency::Points), Amount::Points(60));
        assert_eq!(prices.effective(Currency::Cash), Amount::Cash(dec!(25.00)));

        let discounted = prices.with_discounts(Some(dec!(19.99)), Some(45));
        assert_eq!(discounted.effective(Currency::Points), Amount::Points(45));
        assert_eq!(discounted.effective(Currency::Cash), Amount::Cash(dec!(19.99)));
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(Amount::Points(60).checked_mul(3), Some(Amount::Points(180)));
        assert_eq!(Amount::Cash(dec!(12.50)).checked_mul(2), Some(Amount::Cash(dec!(25.00))));
        assert_eq!(Amount::Points(u64::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_price_validation() {
        assert!(PriceList::new(dec!(0), 0).validate().is_ok());
        assert!(matches!(
            PriceList::new(dec!(-1), 10).validate(),
            Err(ProductError::NegativePrice)
        ));
        assert!(matches!(
            PriceList::new(dec!(10), 10).with_discounts(None, Some(11)).validate(),
            Err(ProductError::DiscountAboveRegular(Currency::Points))
        ));
        assert!(matches!(
            PriceList::new(dec!(10), 10).with_discounts(Some(dec!(10.01)), None).validate(),
            Err(ProductError::DiscountAboveRegular(Currency::Cash))
        ));
    }

    #[test]
    fn test_amount_serialization_shape() {
        let json = serde_json::to_value(Amount::Points(60)).unwrap();
        assert_eq!(json, serde_json::json!({ "currency": "points", "value": 60 }));

        let cash: Amount = serde_json::from_value(serde_json::json!({ "currency": "cash", "value": "9.50" })).unwrap();
        assert_eq!(cash, Amount::Cash(dec!(9.50)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::Points(60).to_string(), "60 pts");
        assert_eq!(Amount::Cash(dec!(9.50)).to_string(), "$9.50");
    }
}
