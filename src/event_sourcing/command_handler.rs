use std::sync::Arc;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, ChangeSet};
use crate::event_sourcing::store::{load_aggregate, EventStore, StoreError};

// ============================================================================
// Generic Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// For commands that touch exactly one stream. Multi-stream operations build
// their own ChangeSet (see the ledger).
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError<E: std::error::Error + 'static> {
    #[error("{aggregate_type} not found: {aggregate_id}")]
    NotFound {
        aggregate_type: &'static str,
        aggregate_id: Uuid,
    },

    #[error(transparent)]
    Rejected(E),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CommandHandler<A: Aggregate> {
    event_store: Arc<dyn EventStore>,
    _aggregate: std::marker::PhantomData<fn() -> A>,
}

impl<A: Aggregate> Clone for CommandHandler<A> {
    fn clone(&self) -> Self {
        Self::new(self.event_store.clone())
    }
}

impl<A: Aggregate> CommandHandler<A> {
    pub fn new(event_store: Arc<dyn EventStore>) -> Self {
        Self {
            event_store,
            _aggregate: std::marker::PhantomData,
        }
    }

    /// Start a new stream with an initial command
    pub async fn create(
        &self,
        aggregate_id: Uuid,
        command: A::Command,
        correlation_id: Uuid,
    ) -> Result<A, CommandError<A::Error>> {
        let events = A::handle_initial_command(&command).map_err(CommandError::Rejected)?;

        let mut change_set = ChangeSet::new(correlation_id);
        change_set
            .append::<A>(aggregate_id, 0, &events)
            .map_err(StoreError::from)?;
        self.event_store.append(change_set).await?;

        tracing::info!(
            aggregate_type = A::AGGREGATE_TYPE,
            aggregate_id = %aggregate_id,
            event_count = events.len(),
            "Created aggregate"
        );

        A::replay(aggregate_id, &events)
            .map_err(CommandError::Rejected)?
            .ok_or(CommandError::NotFound {
                aggregate_type: A::AGGREGATE_TYPE,
                aggregate_id,
            })
    }

    /// Handle a command against an existing stream and persist resulting events
    pub async fn handle(
        &self,
        aggregate_id: Uuid,
        command: A::Command,
        correlation_id: Uuid,
    ) -> Result<A, CommandError<A::Error>> {
        let mut aggregate = self.load(aggregate_id).await?;
        let expected_version = aggregate.version();

        let events = aggregate.handle_command(&command).map_err(CommandError::Rejected)?;
        if events.is_empty() {
            return Ok(aggregate);
        }

        let mut change_set = ChangeSet::new(correlation_id);
        change_set
            .append::<A>(aggregate_id, expected_version, &events)
            .map_err(StoreError::from)?;
        self.event_store.append(change_set).await?;

        for event in &events {
            aggregate.apply_event(event).map_err(CommandError::Rejected)?;
        }

        tracing::info!(
            aggregate_type = A::AGGREGATE_TYPE,
            aggregate_id = %aggregate_id,
            new_version = aggregate.version(),
            "Handled command"
        );

        Ok(aggregate)
    }

    pub async fn load(&self, aggregate_id: Uuid) -> Result<A, CommandError<A::Error>> {
        load_aggregate::<A>(self.event_store.as_ref(), aggregate_id)
            .await?
            .ok_or(CommandError::NotFound {
                aggregate_type: A::AGGREGATE_TYPE,
                aggregate_id,
            })
    }
}
