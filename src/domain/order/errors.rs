use crate::domain::catalog::Currency;
use super::value_objects::{OrderStatus, PaymentMethod};

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Payment method {method} cannot be charged in {charged:?}")]
    CurrencyMismatch { method: PaymentMethod, charged: Currency },

    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Order is already placed")]
    AlreadyPlaced,

    #[error("Aggregate not initialized")]
    NotInitialized,
}
