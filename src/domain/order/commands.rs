use uuid::Uuid;

use crate::domain::account::Role;
use crate::domain::catalog::Amount;
use super::value_objects::{OrderStatus, PaymentMethod, ProductSnapshot};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    PlaceOrder {
        account_id: Uuid,
        product_id: Uuid,
        product: ProductSnapshot,
        quantity: u32,
        payment_method: PaymentMethod,
        amount_charged: Amount,
    },
    Transition {
        to: OrderStatus,
        role: Role,
        reason: Option<String>,
    },
}
