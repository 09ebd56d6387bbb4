use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::{Amount, Currency, ProductAggregate};
use crate::domain::order::ProductSnapshot;
use crate::event_sourcing::store::{load_aggregate, EventStore};
use super::cart::Cart;
use super::errors::{EntityKind, LedgerError};

// ============================================================================
// Catalog Reader
// ============================================================================
//
// Read-only view over product streams. Prices read here are snapshotted into
// orders at checkout and never consulted again for those orders.
//
// ============================================================================

/// A cart line resolved against the catalog
#[derive(Debug, Clone, Serialize)]
pub struct QuotedLine {
    pub product_id: Uuid,
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub unit_price: Amount,
    pub line_total: Amount,
    pub stock: u64,
}

#[derive(Clone)]
pub struct CatalogReader {
    store: Arc<dyn EventStore>,
}

impl CatalogReader {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductAggregate, LedgerError> {
        load_aggregate::<ProductAggregate>(self.store.as_ref(), product_id)
            .await?
            .ok_or(LedgerError::not_found(EntityKind::Product, product_id))
    }

    /// Effective price: the discount when one is set
    pub async fn get_price(&self, product_id: Uuid, currency: Currency) -> Result<Amount, LedgerError> {
        Ok(self.get_product(product_id).await?.price(currency))
    }

    pub async fn get_stock(&self, product_id: Uuid) -> Result<u64, LedgerError> {
        Ok(self.get_product(product_id).await?.stock)
    }

    /// Resolve every cart line, refusing zero quantities and lines the
    /// current stock cannot cover.
    pub async fn quote(&self, cart: &Cart, currency: Currency) -> Result<Vec<QuotedLine>, LedgerError> {
        if cart.is_empty() {
            return Err(LedgerError::EmptyCart);
        }

        let mut quoted = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            if line.quantity == 0 {
                return Err(LedgerError::InvalidQuantity(format!(
                    "product {} has quantity 0",
                    line.product_id
                )));
            }

            let product = self.get_product(line.product_id).await?;
            if u64::from(line.quantity) > product.stock {
                return Err(LedgerError::OutOfStock {
                    product_id: line.product_id,
                    requested: u64::from(line.quantity),
                    available: product.stock,
                });
            }

            let unit_price = product.price(currency);
            let line_total = unit_price.checked_mul(line.quantity).ok_or_else(|| {
                LedgerError::InvalidQuantity(format!("total for product {} overflows", line.product_id))
            })?;

            quoted.push(QuotedLine {
                product_id: line.product_id,
                product: ProductSnapshot {
                    name: product.name,
                    image_url: product.image_url,
                },
                quantity: line.quantity,
                unit_price,
                line_total,
                stock: product.stock,
            });
        }

        tracing::debug!(lines = quoted.len(), currency = ?currency, "Quoted cart");
        Ok(quoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{PriceList, ProductCommand};
    use crate::event_sourcing::{CommandHandler, InMemoryEventStore};
    use rust_decimal_macros::dec;

    async fn setup() -> (CatalogReader, Uuid) {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let products = CommandHandler::<ProductAggregate>::new(store.clone());
        let product_id = Uuid::new_v4();
        products
            .create(
                product_id,
                ProductCommand::RegisterProduct {
                    name: "Grip Socks".to_string(),
                    image_url: None,
                    prices: PriceList::new(dec!(8.00), 40).with_discounts(Some(dec!(6.50)), None),
                    stock: 3,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        (CatalogReader::new(store), product_id)
    }

    #[tokio::test]
    async fn test_price_and_stock() {
        let (catalog, product_id) = setup().await;

        assert_eq!(catalog.get_price(product_id, Currency::Points).await.unwrap(), Amount::Points(40));
        assert_eq!(catalog.get_price(product_id, Currency::Cash).await.unwrap(), Amount::Cash(dec!(6.50)));
        assert_eq!(catalog.get_stock(product_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (catalog, _) = setup().await;
        let result = catalog.get_stock(Uuid::new_v4()).await;
        assert!(matches!(result, Err(LedgerError::NotFound { entity: EntityKind::Product, .. })));
    }

    #[tokio::test]
    async fn test_quote_totals_lines() {
        let (catalog, product_id) = setup().await;

        let lines = catalog.quote(&Cart::single(product_id, 2), Currency::Points).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_total, Amount::Points(80));
        assert_eq!(lines[0].product.name, "Grip Socks");
    }

    #[tokio::test]
    async fn test_quote_refusals() {
        let (catalog, product_id) = setup().await;

        let empty = catalog.quote(&Cart::new(), Currency::Points).await;
        assert!(matches!(empty, Err(LedgerError::EmptyCart)));

        let zero = catalog.quote(&Cart::single(product_id, 0), Currency::Points).await;
        assert!(matches!(zero, Err(LedgerError::InvalidQuantity(_))));

        let too_many = catalog.quote(&Cart::single(product_id, 4), Currency::Cash).await;
        assert!(matches!(
            too_many,
            Err(LedgerError::OutOfStock { requested: 4, available: 3, .. })
        ));
    }
}
