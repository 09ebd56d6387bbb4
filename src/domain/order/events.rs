use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::domain::account::Role;
use crate::domain::catalog::Amount;
use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{PaymentMethod, ProductSnapshot};

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed(OrderPlaced),
    Shipped(OrderShipped),
    Delivered(OrderDelivered),
    Canceled(OrderCanceled),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::Shipped(_) => "OrderShipped",
            OrderEvent::Delivered(_) => "OrderDelivered",
            OrderEvent::Canceled(_) => "OrderCanceled",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Initial event. `amount_charged` is never revised afterwards.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPlaced {
    pub account_id: Uuid,
    pub product_id: Uuid,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub payment_method: PaymentMethod,
    pub amount_charged: Amount,
    pub placed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderShipped {
    pub shipped_at: DateTime<Utc>,
    pub by_role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
    pub by_role: Role,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCanceled {
    pub canceled_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub by_role: Role,
}
