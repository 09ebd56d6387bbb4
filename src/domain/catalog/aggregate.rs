use serde::Serialize;
use uuid::Uuid;

use crate::event_sourcing::core::Aggregate;
use super::commands::ProductCommand;
use super::errors::ProductError;
use super::events::*;
use super::value_objects::{Amount, Currency, PriceList};

// ============================================================================
// Product Aggregate - Prices and Stock
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProductAggregate {
    pub product_id: Uuid,
    pub version: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub prices: PriceList,
    pub stock: u64,
}

impl ProductAggregate {
    pub fn price(&self, currency: Currency) -> Amount {
        self.prices.effective(currency)
    }

    fn adjusted_stock(&self, delta: i64) -> Result<u64, ProductError> {
        if delta >= 0 {
            self.stock.checked_add(delta.unsigned_abs()).ok_or(ProductError::StockOverflow {
                stock: self.stock,
                delta,
            })
        } else {
            self.stock.checked_sub(delta.unsigned_abs()).ok_or(ProductError::StockUnderflow {
                stock: self.stock,
                delta,
            })
        }
    }
}

impl Aggregate for ProductAggregate {
    const AGGREGATE_TYPE: &'static str = "Product";

    type Event = ProductEvent;
    type Command = ProductCommand;
    type Error = ProductError;

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            ProductEvent::Registered(e) => Ok(Self {
                product_id: aggregate_id,
                version: 1,
                name: e.name.clone(),
                image_url: e.image_url.clone(),
                prices: e.prices.clone(),
                stock: e.stock,
            }),
            _ => Err(ProductError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            ProductEvent::Registered(_) => return Err(ProductError::AlreadyRegistered),
            ProductEvent::PricesChanged(e) => {
                self.prices = e.prices.clone();
            }
            ProductEvent::StockAdjusted(e) => {
                self.stock = self.adjusted_stock(e.delta)?;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_initial_command(command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::RegisterProduct { name, image_url, prices, stock } => {
                if name.trim().is_empty() {
                    return Err(ProductError::EmptyName);
                }
                prices.validate()?;

                Ok(vec![ProductEvent::Registered(ProductRegistered {
                    name: name.trim().to_string(),
                    image_url: image_url.clone().filter(|url| !url.trim().is_empty()),
                    prices: prices.clone(),
                    stock: *stock,
                })])
            }
            _ => Err(ProductError::NotInitialized),
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::RegisterProduct { .. } => Err(ProductError::AlreadyRegistered),

            ProductCommand::ChangePrices { prices } => {
                prices.validate()?;

                if &self.prices == prices {
                    return Ok(vec![]); // No change
                }

                Ok(vec![ProductEvent::PricesChanged(ProductPricesChanged {
                    prices: prices.clone(),
                })])
            }

            ProductCommand::AdjustStock { delta, order_id } => {
                if *delta == 0 {
                    return Err(ProductError::ZeroAdjustment);
                }
                self.adjusted_stock(*delta)?;

                Ok(vec![ProductEvent::StockAdjusted(ProductStockAdjusted {
                    delta: *delta,
                    order_id: *order_id,
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.product_id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
