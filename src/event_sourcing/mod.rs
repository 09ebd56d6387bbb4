// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable event sourcing infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

pub mod command_handler;
pub mod core;
pub mod store;

pub use self::command_handler::{CommandError, CommandHandler};
pub use self::core::*;
pub use self::store::*;
