use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{AccountCreditReason, Address};

// ============================================================================
// Account Domain Events
// ============================================================================

/// Union type for all account events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    Opened(AccountOpened),
    AddressChanged(AccountAddressChanged),
    PointsDebited(PointsDebited),
    PointsCredited(PointsCredited),
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened(_) => "AccountOpened",
            AccountEvent::AddressChanged(_) => "AccountAddressChanged",
            AccountEvent::PointsDebited(_) => "PointsDebited",
            AccountEvent::PointsCredited(_) => "PointsCredited",
        }
    }
}

// Individual event types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpened {
    pub display_name: String,
    pub starting_points: u64,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAddressChanged {
    pub address: Address,
}

/// Points spent at checkout, one debit per checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsDebited {
    pub amount: u64,
    pub order_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsCredited {
    pub amount: u64,
    pub reason: AccountCreditReason,
}
