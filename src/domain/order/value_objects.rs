use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::catalog::Currency;
use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Lifecycle of an order.
///
/// ```text
/// Pending ──▶ Shipped ──▶ Delivered
///    │           │
///    └───────────┴──▶ Canceled
/// ```
///
/// `Delivered` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    /// The only place allowed transitions are decided.
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        use OrderStatus::*;

        match (self, next) {
            (Pending, Shipped) | (Shipped, Delivered) | (Pending, Canceled) | (Shipped, Canceled) => Ok(next),
            (from, to) => Err(OrderError::InvalidStatusTransition { from, to }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Points,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn currency(self) -> Currency {
        match self {
            PaymentMethod::Points => Currency::Points,
            PaymentMethod::CashOnDelivery => Currency::Cash,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Points => "points",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "points" => Ok(PaymentMethod::Points),
            "cash_on_delivery" | "cod" => Ok(PaymentMethod::CashOnDelivery),
            _ => Err(OrderError::UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Product fields copied onto the order when it is placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub name: String,
    pub image_url: Option<String>,
}

// ============================================================================
// Unit Tests
// ============================================================================
