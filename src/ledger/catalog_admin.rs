use std::sync::Arc;
use uuid::Uuid;

use crate::domain::account::Role;
use crate::domain::catalog::{PriceList, ProductAggregate, ProductCommand};
use crate::event_sourcing::{CommandHandler, EventStore};
use super::errors::{EntityKind, LedgerError};
use super::fulfillment::require_operator;

/// Product administration for admins and sellers
#[derive(Clone)]
pub struct CatalogAdmin {
    handler: CommandHandler<ProductAggregate>,
}

impl CatalogAdmin {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub async fn register(
        &self,
        role: Role,
        name: String,
        image_url: Option<String>,
        prices: PriceList,
        stock: u64,
    ) -> Result<ProductAggregate, LedgerError> {
        require_operator(role, "register products")?;

        self.handler
            .create(
                Uuid::new_v4(),
                ProductCommand::RegisterProduct { name, image_url, prices, stock },
                Uuid::new_v4(),
            )
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Product, e))
    }

    pub async fn change_prices(
        &self,
        role: Role,
        product_id: Uuid,
        prices: PriceList,
    ) -> Result<ProductAggregate, LedgerError> {
        require_operator(role, "change prices")?;

        self.handler
            .handle(product_id, ProductCommand::ChangePrices { prices }, Uuid::new_v4())
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Product, e))
    }

    pub async fn restock(&self, role: Role, product_id: Uuid, units: u64) -> Result<ProductAggregate, LedgerError> {
        require_operator(role, "restock products")?;

        let delta = i64::try_from(units)
            .map_err(|_| LedgerError::InvalidQuantity(format!("cannot restock {units} units at once")))?;

        self.handler
            .handle(product_id, ProductCommand::AdjustStock { delta, order_id: None }, Uuid::new_v4())
            .await
            .map_err(|e| LedgerError::from_command(EntityKind::Product, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Amount, Currency};
    use crate::event_sourcing::InMemoryEventStore;
    use rust_decimal_macros::dec;

    fn admin() -> CatalogAdmin {
        CatalogAdmin::new(Arc::new(InMemoryEventStore::new()))
    }

    #[tokio::test]
    async fn test_register_reprice_restock() {
        let admin = admin();
        let product = admin
            .register(Role::Seller, "Rebounder Net".to_string(), None, PriceList::new(dec!(40), 200), 1)
            .await
            .unwrap();

        let repriced = admin
            .change_prices(
                Role::Admin,
                product.product_id,
                PriceList::new(dec!(40), 200).with_discounts(None, Some(150)),
            )
            .await
            .unwrap();
        assert_eq!(repriced.price(Currency::Points), Amount::Points(150));

        let restocked = admin.restock(Role::Admin, product.product_id, 9).await.unwrap();
        assert_eq!(restocked.stock, 10);
    }

    #[tokio::test]
    async fn test_buyer_cannot_register() {
        let result = admin()
            .register(Role::Buyer, "Ball".to_string(), None, PriceList::new(dec!(1), 1), 1)
            .await;
        assert!(matches!(result, Err(LedgerError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_invalid_prices_and_zero_restock() {
        let admin = admin();
        let product = admin
            .register(Role::Admin, "Ball".to_string(), None, PriceList::new(dec!(10), 10), 0)
            .await
            .unwrap();

        let bad = admin
            .change_prices(Role::Admin, product.product_id, PriceList::new(dec!(-1), 10))
            .await;
        assert!(matches!(bad, Err(LedgerError::Validation(_))));

        let zero = admin.restock(Role::Admin, product.product_id, 0).await;
        assert!(matches!(zero, Err(LedgerError::Validation(_))));

        let missing = admin.restock(Role::Admin, Uuid::new_v4(), 1).await;
        assert!(matches!(missing, Err(LedgerError::NotFound { entity: EntityKind::Product, .. })));
    }
}
