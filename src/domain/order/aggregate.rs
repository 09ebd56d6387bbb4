use serde::Serialize;
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::domain::catalog::Amount;
use crate::event_sourcing::core::Aggregate;
use super::value_objects::{OrderStatus, PaymentMethod, ProductSnapshot};
use super::events::*;
use super::commands::OrderCommand;
use super::errors::OrderError;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderAggregate {
    // Identity
    pub order_id: Uuid,
    pub version: i64,

    // Snapshot taken at placement
    pub account_id: Uuid,
    pub product_id: Uuid,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub payment_method: PaymentMethod,
    pub amount_charged: Amount,

    pub status: OrderStatus,

    // Audit Trail
    pub placed_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
}

impl OrderAggregate {
    /// Points to give back if this order were canceled now
    pub fn refundable_points(&self) -> Option<u64> {
        match self.payment_method {
            PaymentMethod::Points => self.amount_charged.points().filter(|points| *points > 0),
            PaymentMethod::CashOnDelivery => None,
        }
    }

    fn advance(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        self.status = self.status.transition_to(to)?;
        Ok(())
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    const AGGREGATE_TYPE: &'static str = "Order";

    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                order_id: aggregate_id,
                version: 1,
                account_id: e.account_id,
                product_id: e.product_id,
                product: e.product.clone(),
                quantity: e.quantity,
                payment_method: e.payment_method,
                amount_charged: e.amount_charged,
                status: OrderStatus::Pending,
                placed_at: e.placed_at,
                shipped_at: None,
                delivered_at: None,
                canceled_at: None,
                cancel_reason: None,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Placed(_) => return Err(OrderError::AlreadyPlaced),
            OrderEvent::Shipped(e) => {
                self.advance(OrderStatus::Shipped)?;
                self.shipped_at = Some(e.shipped_at);
            }
            OrderEvent::Delivered(e) => {
                self.advance(OrderStatus::Delivered)?;
                self.delivered_at = Some(e.delivered_at);
            }
            OrderEvent::Canceled(e) => {
                self.advance(OrderStatus::Canceled)?;
                self.canceled_at = Some(e.canceled_at);
                self.cancel_reason = e.reason.clone();
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_initial_command(command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder {
                account_id,
                product_id,
                product,
                quantity,
                payment_method,
                amount_charged,
            } => {
                if *quantity == 0 {
                    return Err(OrderError::InvalidQuantity);
                }
                if amount_charged.currency() != payment_method.currency() {
                    return Err(OrderError::CurrencyMismatch {
                        method: *payment_method,
                        charged: amount_charged.currency(),
                    });
                }

                Ok(vec![OrderEvent::Placed(OrderPlaced {
                    account_id: *account_id,
                    product_id: *product_id,
                    product: product.clone(),
                    quantity: *quantity,
                    payment_method: *payment_method,
                    amount_charged: *amount_charged,
                    placed_at: Utc::now(),
                })])
            }
            OrderCommand::Transition { .. } => Err(OrderError::NotInitialized),
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder { .. } => Err(OrderError::AlreadyPlaced),

            OrderCommand::Transition { to, role, reason } => {
                let next = self.status.transition_to(*to)?;
                let now = Utc::now();

                let event = match next {
                    OrderStatus::Shipped => OrderEvent::Shipped(OrderShipped {
                        shipped_at: now,
                        by_role: *role,
                    }),
                    OrderStatus::Delivered => OrderEvent::Delivered(OrderDelivered {
                        delivered_at: now,
                        by_role: *role,
                    }),
                    OrderStatus::Canceled => OrderEvent::Canceled(OrderCanceled {
                        canceled_at: now,
                        reason: reason.clone(),
                        by_role: *role,
                    }),
                    // transition_to never yields Pending
                    OrderStatus::Pending => {
                        return Err(OrderError::InvalidStatusTransition { from: self.status, to: next })
                    }
                };

                Ok(vec![event])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.order_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
