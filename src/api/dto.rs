use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::PriceList;
use crate::domain::order::{OrderAggregate, PaymentMethod};
use crate::ledger::{CartLine, SalesSummary};

// ============================================================================
// Request / Response Bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    pub display_name: String,
    #[serde(default)]
    pub starting_points: u64,
}

#[derive(Debug, Deserialize)]
pub struct GrantPointsRequest {
    pub amount: u64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub prices: PriceList,
    #[serde(default)]
    pub stock: u64,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub units: u64,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub account_id: Uuid,
    pub payment_method: PaymentMethod,
    pub lines: Vec<CartLine>,
}

/// Price a cart without placing anything
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub payment_method: PaymentMethod,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub orders: Vec<OrderAggregate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `GET /orders?status=&method=`
#[derive(Debug, Default, Deserialize)]
pub struct OrderQueueQuery {
    pub status: Option<String>,
    pub method: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SalesSummaryResponse {
    #[serde(flatten)]
    pub summary: SalesSummary,
    pub order_count: u64,
    pub realized_cash: Decimal,
}

impl From<SalesSummary> for SalesSummaryResponse {
    fn from(summary: SalesSummary) -> Self {
        Self {
            order_count: summary.order_count(),
            realized_cash: summary.realized_cash(),
            summary,
        }
    }
}
