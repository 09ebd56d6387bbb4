use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::account::{AccountError, Role};
use crate::domain::catalog::ProductError;
use crate::domain::order::OrderStatus;
use crate::event_sourcing::{CommandError, StoreError};
use crate::utils::IsTransient;

// ============================================================================
// Ledger Errors
// ============================================================================
//
// Every variant except `StorageConflict` is permanent. A failed command has
// written nothing.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Product,
    Order,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Account => f.write_str("Account"),
            EntityKind::Product => f.write_str("Product"),
            EntityKind::Order => f.write_str("Order"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientBalance { required: u64, available: u64 },

    /// `stale` marks a transition that lost a race: the order was moved by
    /// another command between load and commit, and `from` is where it is now.
    #[error("{}", describe_transition(.order_id, .from, .to, .stale))]
    InvalidTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
        stale: bool,
    },

    #[error("Role {role} is not allowed to {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error("Concurrent update on {aggregate_type} {aggregate_id}")]
    StorageConflict {
        aggregate_type: String,
        aggregate_id: Uuid,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Account {account_id} has no shipping address")]
    AddressRequired { account_id: Uuid },

    #[error("Product {product_id} is out of stock: {requested} requested, {available} available")]
    OutOfStock {
        product_id: Uuid,
        requested: u64,
        available: u64,
    },

    #[error("Rejected: {0}")]
    Validation(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl LedgerError {
    /// Stable machine-readable name, used in HTTP bodies and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::InvalidTransition { .. } => "invalid_transition",
            LedgerError::Forbidden { .. } => "forbidden",
            LedgerError::StorageConflict { .. } => "storage_conflict",
            LedgerError::InvalidQuantity(_) => "invalid_quantity",
            LedgerError::EmptyCart => "empty_cart",
            LedgerError::AddressRequired { .. } => "address_required",
            LedgerError::OutOfStock { .. } => "out_of_stock",
            LedgerError::Validation(_) => "validation",
            LedgerError::InvariantViolation(_) => "invariant_violation",
            LedgerError::Storage(_) => "storage",
        }
    }

    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        LedgerError::NotFound { entity, id }
    }

    /// Flatten a single-stream command failure
    pub fn from_command<E>(entity: EntityKind, error: CommandError<E>) -> Self
    where
        E: std::error::Error + Into<LedgerError> + 'static,
    {
        match error {
            CommandError::NotFound { aggregate_id, .. } => LedgerError::NotFound {
                entity,
                id: aggregate_id,
            },
            CommandError::Rejected(e) => e.into(),
            CommandError::Store(e) => e.into(),
        }
    }
}

fn describe_transition(order_id: &Uuid, from: &OrderStatus, to: &OrderStatus, stale: &bool) -> String {
    if *stale {
        format!("Order {order_id} changed concurrently (now {from}); cannot apply {to}")
    } else {
        format!("Order {order_id} cannot move from {from} to {to}")
    }
}

impl IsTransient for LedgerError {
    fn is_transient(&self) -> bool {
        matches!(self, LedgerError::StorageConflict { .. })
    }
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict {
                aggregate_type,
                aggregate_id,
                ..
            } => LedgerError::StorageConflict {
                aggregate_type,
                aggregate_id,
            },
            StoreError::Corrupt { .. } => LedgerError::InvariantViolation(error.to_string()),
            other => LedgerError::Storage(other),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Storage(StoreError::Serialization(error))
    }
}

impl From<AccountError> for LedgerError {
    fn from(error: AccountError) -> Self {
        match error {
            AccountError::InsufficientPoints { required, available } => {
                LedgerError::InsufficientBalance { required, available }
            }
            AccountError::EmptyDisplayName
            | AccountError::IncompleteAddress(_)
            | AccountError::ZeroAmount
            | AccountError::BalanceOverflow => LedgerError::Validation(error.to_string()),
            AccountError::AlreadyOpened | AccountError::NotInitialized => {
                LedgerError::InvariantViolation(error.to_string())
            }
        }
    }
}

impl From<ProductError> for LedgerError {
    fn from(error: ProductError) -> Self {
        match error {
            ProductError::StockUnderflow { .. }
            | ProductError::AlreadyRegistered
            | ProductError::NotInitialized => LedgerError::InvariantViolation(error.to_string()),
            ProductError::EmptyName
            | ProductError::NegativePrice
            | ProductError::DiscountAboveRegular(_)
            | ProductError::StockOverflow { .. }
            | ProductError::ZeroAdjustment => LedgerError::Validation(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_conflict_is_transient() {
        let conflict = LedgerError::from(StoreError::Conflict {
            aggregate_type: "Account".to_string(),
            aggregate_id: Uuid::new_v4(),
            expected: 1,
            actual: 2,
        });
        assert_eq!(conflict.kind(), "storage_conflict");
        assert!(conflict.is_transient());

        assert!(!LedgerError::EmptyCart.is_transient());
        assert!(!LedgerError::InsufficientBalance { required: 60, available: 0 }.is_transient());
    }

    #[test]
    fn test_account_errors_map_to_ledger_kinds() {
        let insufficient = LedgerError::from(AccountError::InsufficientPoints {
            required: 60,
            available: 40,
        });
        assert!(matches!(
            insufficient,
            LedgerError::InsufficientBalance { required: 60, available: 40 }
        ));
        assert_eq!(LedgerError::from(AccountError::ZeroAmount).kind(), "validation");
    }

    #[test]
    fn test_stale_transition_message_names_the_race() {
        let id = Uuid::nil();
        let illegal = LedgerError::InvalidTransition {
            order_id: id,
            from: OrderStatus::Delivered,
            to: OrderStatus::Canceled,
            stale: false,
        };
        assert!(illegal.to_string().contains("cannot move from delivered to canceled"));

        let stale = LedgerError::InvalidTransition {
            order_id: id,
            from: OrderStatus::Shipped,
            to: OrderStatus::Canceled,
            stale: true,
        };
        let message = stale.to_string();
        assert!(message.contains("changed concurrently (now shipped)"));
        assert!(!message.contains("cannot move from"));
        assert_eq!(stale.kind(), "invalid_transition");
    }

    #[test]
    fn test_stock_underflow_is_an_invariant_violation() {
        let error = LedgerError::from(ProductError::StockUnderflow { stock: 0, delta: -1 });
        assert_eq!(error.kind(), "invariant_violation");
    }

    #[test]
    fn test_command_not_found_keeps_entity() {
        let id = Uuid::new_v4();
        let error = LedgerError::from_command::<AccountError>(
            EntityKind::Account,
            CommandError::NotFound {
                aggregate_type: "Account",
                aggregate_id: id,
            },
        );
        assert!(matches!(
            error,
            LedgerError::NotFound { entity: EntityKind::Account, id: found } if found == id
        ));
    }
}
