use super::value_objects::Currency;

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("Prices cannot be negative")]
    NegativePrice,

    #[error("Discounted {0:?} price is above the regular price")]
    DiscountAboveRegular(Currency),

    #[error("Stock underflow: {stock} in stock, adjustment {delta}")]
    StockUnderflow { stock: u64, delta: i64 },

    #[error("Stock overflow: {stock} in stock, adjustment {delta}")]
    StockOverflow { stock: u64, delta: i64 },

    #[error("Stock adjustment cannot be zero")]
    ZeroAdjustment,

    #[error("Product is already registered")]
    AlreadyRegistered,

    #[error("Aggregate not initialized")]
    NotInitialized,
}
