use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account::Role;
use crate::domain::order::{OrderAggregate, OrderStatus};
use super::errors::LedgerError;
use super::order_ledger::OrderLedger;

/// Refuse anyone who is not an admin or a seller
pub fn require_operator(role: Role, action: &'static str) -> Result<(), LedgerError> {
    if role.is_operator() {
        Ok(())
    } else {
        tracing::warn!(role = %role, action = action, "Operator action refused");
        Err(LedgerError::Forbidden { role, action })
    }
}

/// Operator-facing commands over the ledger's `transition`
#[derive(Clone)]
pub struct FulfillmentController {
    ledger: Arc<OrderLedger>,
}

impl FulfillmentController {
    pub fn new(ledger: Arc<OrderLedger>) -> Self {
        Self { ledger }
    }

    pub async fn ship(&self, order_id: Uuid, role: Role) -> Result<OrderAggregate, LedgerError> {
        self.authorize(role, "ship orders")?;
        self.ledger.transition(order_id, OrderStatus::Shipped, role, None).await
    }

    pub async fn deliver(&self, order_id: Uuid, role: Role) -> Result<OrderAggregate, LedgerError> {
        self.authorize(role, "deliver orders")?;
        self.ledger.transition(order_id, OrderStatus::Delivered, role, None).await
    }

    pub async fn cancel(
        &self,
        order_id: Uuid,
        role: Role,
        reason: Option<String>,
    ) -> Result<OrderAggregate, LedgerError> {
        self.authorize(role, "cancel orders")?;
        self.ledger.transition(order_id, OrderStatus::Canceled, role, reason).await
    }

    fn authorize(&self, role: Role, action: &'static str) -> Result<(), LedgerError> {
        require_operator(role, action).inspect_err(|e| {
            self.ledger.metrics().record_rejection(e.kind());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::{EventStore, InMemoryEventStore};
    use crate::metrics::Metrics;

    fn controller() -> FulfillmentController {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let ledger = OrderLedger::new(store, Arc::new(Metrics::new().unwrap()));
        FulfillmentController::new(Arc::new(ledger))
    }

    #[test]
    fn test_require_operator() {
        assert!(require_operator(Role::Admin, "ship orders").is_ok());
        assert!(require_operator(Role::Seller, "ship orders").is_ok());
        assert!(matches!(
            require_operator(Role::Buyer, "ship orders"),
            Err(LedgerError::Forbidden { role: Role::Buyer, .. })
        ));
    }

    #[tokio::test]
    async fn test_buyer_is_forbidden_before_lookup() {
        let controller = controller();

        // Forbidden wins even for an order that does not exist
        let result = controller.deliver(Uuid::new_v4(), Role::Buyer).await;
        assert!(matches!(result, Err(LedgerError::Forbidden { .. })));
        assert_eq!(
            controller.ledger.metrics().rejections.with_label_values(&["forbidden"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn test_operator_gets_ledger_answer() {
        let controller = controller();
        let result = controller.ship(Uuid::new_v4(), Role::Seller).await;
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }
}
