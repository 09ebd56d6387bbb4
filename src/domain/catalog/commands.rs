use uuid::Uuid;
use super::value_objects::PriceList;

// ============================================================================
// Product Commands
// ============================================================================

#[derive(Debug, Clone)]
pub enum ProductCommand {
    RegisterProduct {
        name: String,
        image_url: Option<String>,
        prices: PriceList,
        stock: u64,
    },
    ChangePrices {
        prices: PriceList,
    },
    AdjustStock {
        delta: i64,
        order_id: Option<Uuid>,
    },
}
