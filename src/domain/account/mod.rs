// ============================================================================
// Account Domain - Points Balance and Shipping Address
// ============================================================================
//
// Profiles and authentication live elsewhere; this aggregate keeps only what
// checkout needs, so balance changes can share a change set with orders.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
