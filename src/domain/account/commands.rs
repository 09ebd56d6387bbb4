use uuid::Uuid;
use super::value_objects::{AccountCreditReason, Address};

// ============================================================================
// Account Domain Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum AccountCommand {
    OpenAccount {
        display_name: String,
        starting_points: u64,
    },
    SetShippingAddress {
        address: Address,
    },
    DebitPoints {
        amount: u64,
        order_ids: Vec<Uuid>,
    },
    CreditPoints {
        amount: u64,
        reason: AccountCreditReason,
    },
}
