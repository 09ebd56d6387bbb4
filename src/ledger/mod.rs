// ============================================================================
// Ledger - Checkout, Fulfillment and the Points Balance
// ============================================================================
//
// Application services over the domain aggregates. Anything that touches
// more than one stream goes through `OrderLedger`, which owns the atomic
// change sets; single-stream administration uses the generic CommandHandler.
//
// ============================================================================

pub mod accounts;
pub mod cart;
pub mod catalog_admin;
pub mod catalog_reader;
pub mod errors;
pub mod fulfillment;
pub mod order_ledger;
pub mod sales;

pub use accounts::AccountBook;
pub use cart::{Cart, CartLine};
pub use catalog_admin::CatalogAdmin;
pub use catalog_reader::{CatalogReader, QuotedLine};
pub use errors::{EntityKind, LedgerError};
pub use fulfillment::{require_operator, FulfillmentController};
pub use order_ledger::OrderLedger;
pub use sales::{SalesSummary, StatusTotals};
