// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
//
// Cross-aggregate effects (debits, refunds, stock) are composed in `ledger`.
//
// ============================================================================

pub mod account;
pub mod catalog;
pub mod order;
