// ============================================================================
// Event Store Implementations
// ============================================================================

pub mod event_store;
pub mod memory;
pub mod postgres;

pub use event_store::{load_aggregate, load_all, EventStore, StoreError};
pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
