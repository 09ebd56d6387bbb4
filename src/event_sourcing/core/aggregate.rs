use uuid::Uuid;
use anyhow::{Result, bail};
use super::event::{DomainEvent, EventEnvelope};

// ============================================================================
// Aggregate Root Pattern - Event Sourcing Core
// ============================================================================
//
// Key Principles:
// 1. State is derived from events (not stored directly)
// 2. Commands are validated before emitting events
// 3. Events represent facts that have already happened
// 4. Aggregates enforce business invariants
// 5. All state changes flow through events
//
// `version()` is the number of events applied so far, which is also the
// sequence number of the last event in the stream.
//
// ============================================================================

pub trait Aggregate: Sized + Send + Sync {
    /// Stream namespace, e.g. "Order"
    const AGGREGATE_TYPE: &'static str;

    type Event: DomainEvent;
    type Command;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create new aggregate from first event
    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply subsequent events to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle a command addressed to a stream with no events yet
    fn handle_initial_command(command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    fn version(&self) -> i64;

    /// Fold freshly produced events into a new aggregate.
    /// Returns `None` when there is nothing to fold.
    fn replay(aggregate_id: Uuid, events: &[Self::Event]) -> Result<Option<Self>, Self::Error> {
        let Some((first, rest)) = events.split_first() else {
            return Ok(None);
        };

        let mut aggregate = Self::apply_first_event(aggregate_id, first)?;
        for event in rest {
            aggregate.apply_event(event)?;
        }
        Ok(Some(aggregate))
    }

    /// Load aggregate from event history (reconstruct from events)
    fn load_from_events(events: Vec<EventEnvelope<Self::Event>>) -> Result<Self> {
        let Some((first, rest)) = events.split_first() else {
            bail!("No events to load");
        };

        if first.sequence_number != 1 {
            bail!(
                "Stream {} starts at sequence {} instead of 1",
                first.aggregate_id,
                first.sequence_number
            );
        }

        let mut aggregate = Self::apply_first_event(first.aggregate_id, &first.event_data)
            .map_err(|e| anyhow::anyhow!("Failed to apply first event: {}", e))?;

        for envelope in rest {
            if envelope.sequence_number != aggregate.version() + 1 {
                bail!(
                    "Sequence gap in stream {}: expected {}, found {}",
                    envelope.aggregate_id,
                    aggregate.version() + 1,
                    envelope.sequence_number
                );
            }
            aggregate.apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event: {}", e))?;
        }

        Ok(aggregate)
    }
}
