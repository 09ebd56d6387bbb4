use async_trait::async_trait;
use uuid::Uuid;

use crate::event_sourcing::core::{deserialize_event, Aggregate, ChangeSet, EventEnvelope, RawEnvelope};

// ============================================================================
// Event Store - Repository for Events
// ============================================================================
//
// Responsibilities:
// 1. Append change sets atomically across streams (append-only)
// 2. Load event history for aggregates
// 3. Enforce optimistic concurrency per stream
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(
        "Concurrency conflict on {aggregate_type} {aggregate_id}: expected version {expected}, but current is {actual}"
    )]
    Conflict {
        aggregate_type: String,
        aggregate_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("Corrupt event stream for {aggregate_type} {aggregate_id}: {reason}")]
    Corrupt {
        aggregate_type: String,
        aggregate_id: Uuid,
        reason: String,
    },

    #[error("Event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Commit every stream append in the change set, or none of them.
    async fn append(&self, change_set: ChangeSet) -> Result<(), StoreError>;

    /// All events of one stream in sequence order (empty for unknown streams)
    async fn load_events(
        &self,
        aggregate_type: &str,
        aggregate_id: Uuid,
    ) -> Result<Vec<RawEnvelope>, StoreError>;

    /// Current version of a stream, 0 when it does not exist
    async fn current_version(&self, aggregate_type: &str, aggregate_id: Uuid) -> Result<i64, StoreError>;

    /// Ids of every stream of the given type
    async fn aggregate_ids(&self, aggregate_type: &str) -> Result<Vec<Uuid>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

// ============================================================================
// Typed Loading Helpers
// ============================================================================

/// Load aggregate from events, `None` if the stream is empty
pub async fn load_aggregate<A: Aggregate>(
    store: &dyn EventStore,
    aggregate_id: Uuid,
) -> Result<Option<A>, StoreError> {
    let raw = store.load_events(A::AGGREGATE_TYPE, aggregate_id).await?;
    if raw.is_empty() {
        return Ok(None);
    }

    let events = raw
        .into_iter()
        .map(|envelope| envelope.try_map(deserialize_event::<A::Event>))
        .collect::<Result<Vec<EventEnvelope<A::Event>>, _>>()?;

    tracing::debug!(
        aggregate_type = A::AGGREGATE_TYPE,
        aggregate_id = %aggregate_id,
        event_count = events.len(),
        "Loaded events"
    );

    A::load_from_events(events)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            aggregate_type: A::AGGREGATE_TYPE.to_string(),
            aggregate_id,
            reason: e.to_string(),
        })
}

/// Load every aggregate of one type
pub async fn load_all<A: Aggregate>(store: &dyn EventStore) -> Result<Vec<A>, StoreError> {
    let ids = store.aggregate_ids(A::AGGREGATE_TYPE).await?;
    let mut aggregates = Vec::with_capacity(ids.len());

    for id in ids {
        if let Some(aggregate) = load_aggregate::<A>(store, id).await? {
            aggregates.push(aggregate);
        }
    }

    Ok(aggregates)
}
