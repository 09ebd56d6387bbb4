// ============================================================================
// Account Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Display name cannot be empty")]
    EmptyDisplayName,

    #[error("Shipping address is missing {0}")]
    IncompleteAddress(&'static str),

    #[error("Insufficient points: required {required}, available {available}")]
    InsufficientPoints { required: u64, available: u64 },

    #[error("Points amount must be positive")]
    ZeroAmount,

    #[error("Points balance would overflow")]
    BalanceOverflow,

    #[error("Account is already open")]
    AlreadyOpened,

    #[error("Aggregate not initialized")]
    NotInitialized,
}
