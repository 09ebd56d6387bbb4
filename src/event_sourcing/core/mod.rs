// ============================================================================
// Event Sourcing Core - Generic Infrastructure Abstractions
// ============================================================================
//
// Generic, reusable building blocks with no domain-specific code:
// aggregates, event envelopes and multi-stream change sets.
//
// ============================================================================

pub mod aggregate;
pub mod change_set;
pub mod event;

pub use aggregate::Aggregate;
pub use change_set::{ChangeSet, StreamAppend};
pub use event::{deserialize_event, serialize_event, DomainEvent, EventEnvelope, RawEnvelope};
