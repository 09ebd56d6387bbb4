use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::PriceList;

// ============================================================================
// Product Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    Registered(ProductRegistered),
    PricesChanged(ProductPricesChanged),
    StockAdjusted(ProductStockAdjusted),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Registered(_) => "ProductRegistered",
            ProductEvent::PricesChanged(_) => "ProductPricesChanged",
            ProductEvent::StockAdjusted(_) => "ProductStockAdjusted",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductRegistered {
    pub name: String,
    pub image_url: Option<String>,
    pub prices: PriceList,
    pub stock: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductPricesChanged {
    pub prices: PriceList,
}

/// Positive delta restocks; negative delta ships units out
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProductStockAdjusted {
    pub delta: i64,
    /// Set when the adjustment comes from delivering an order
    pub order_id: Option<Uuid>,
}
