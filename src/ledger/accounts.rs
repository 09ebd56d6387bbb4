use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account::{AccountAggregate, AccountCommand, AccountCreditReason, Address, Role};
use crate::event_sourcing::{CommandHandler, EventStore};
use super::errors::{EntityKind, LedgerError};
use super::fulfillment::require_operator;

/// Account administration: opening, shipping address, XP grants
#[derive(Clone)]
pub struct AccountBook {
    handler: CommandHandler<AccountAggregate>,
}

impl AccountBook {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub async fn open(&self, display_name: String, starting_points: u64) -> Result<AccountAggregate, LedgerError> {
        let account_id = Uuid::new_v4();
        self.handler
            .create(
                account_id,
                AccountCommand::OpenAccount { display_name, starting_points },
                Uuid::new_v4(),
            )
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Account, e))
    }

    pub async fn get(&self, account_id: Uuid) -> Result<AccountAggregate, LedgerError> {
        self.handler
            .load(account_id)
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Account, e))
    }

    pub async fn set_shipping_address(
        &self,
        account_id: Uuid,
        address: Address,
    ) -> Result<AccountAggregate, LedgerError> {
        self.handler
            .handle(account_id, AccountCommand::SetShippingAddress { address }, Uuid::new_v4())
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Account, e))
    }

    /// Credit XP earned outside the store
    pub async fn grant_points(
        &self,
        role: Role,
        account_id: Uuid,
        amount: u64,
        note: Option<String>,
    ) -> Result<AccountAggregate, LedgerError> {
        require_operator(role, "grant points")?;

        let account = self
            .handler
            .handle(
                account_id,
                AccountCommand::CreditPoints {
                    amount,
                    reason: AccountCreditReason::Grant { note },
                },
                Uuid::new_v4(),
            )
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Account, e))?;

        tracing::info!(account_id = %account_id, amount = amount, balance = account.points_balance, "Points granted");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::InMemoryEventStore;

    fn book() -> AccountBook {
        AccountBook::new(Arc::new(InMemoryEventStore::new()))
    }

    #[tokio::test]
    async fn test_open_and_grant() {
        let book = book();
        let account = book.open("Casey".to_string(), 25).await.unwrap();

        let updated = book
            .grant_points(Role::Admin, account.account_id, 75, Some("drill streak".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.points_balance, 100);
        assert_eq!(book.get(account.account_id).await.unwrap().points_balance, 100);
    }

    #[tokio::test]
    async fn test_buyer_cannot_grant() {
        let book = book();
        let account = book.open("Casey".to_string(), 0).await.unwrap();

        let result = book.grant_points(Role::Buyer, account.account_id, 10, None).await;
        assert!(matches!(result, Err(LedgerError::Forbidden { .. })));
        assert_eq!(book.get(account.account_id).await.unwrap().points_balance, 0);
    }

    #[tokio::test]
    async fn test_incomplete_address_is_a_validation_error() {
        let book = book();
        let account = book.open("Casey".to_string(), 0).await.unwrap();

        let result = book
            .set_shipping_address(
                account.account_id,
                Address {
                    street: "3 Rim Ave".to_string(),
                    city: String::new(),
                    state: "TX".to_string(),
                    postal_code: "73301".to_string(),
                    country: "US".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let result = book().get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(LedgerError::NotFound { entity: EntityKind::Account, .. })));
    }
}
