// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// One order per product line. The status machine lives on `OrderStatus`;
// balance and stock side effects are composed by the ledger, not here.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
