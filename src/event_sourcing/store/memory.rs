use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{ChangeSet, RawEnvelope};
use super::event_store::{EventStore, StoreError};

// ============================================================================
// In-Memory Event Store
// ============================================================================
//
// A single write lock covers the version check and the append of a whole
// change set, which makes the commit atomic across streams.
//
// ============================================================================

type StreamKey = (String, Uuid);

#[derive(Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<StreamKey, Vec<RawEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, change_set: ChangeSet) -> Result<(), StoreError> {
        let correlation_id = change_set.correlation_id();
        let appends = change_set.into_appends();

        let mut streams = self.streams.write().await;

        // Check optimistic concurrency for every stream before touching any
        for append in &appends {
            let key = (append.aggregate_type.clone(), append.aggregate_id);
            let current = streams.get(&key).map_or(0, |events| events.len() as i64);
            if current != append.expected_version {
                return Err(StoreError::Conflict {
                    aggregate_type: append.aggregate_type.clone(),
                    aggregate_id: append.aggregate_id,
                    expected: append.expected_version,
                    actual: current,
                });
            }
        }

        let mut event_count = 0;
        for append in appends {
            event_count += append.events.len();
            streams
                .entry((append.aggregate_type, append.aggregate_id))
                .or_default()
                .extend(append.events);
        }

        tracing::debug!(
            correlation_id = %correlation_id,
            event_count = event_count,
            "Appended change set to in-memory store"
        );

        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_type: &str,
        aggregate_id: Uuid,
    ) -> Result<Vec<RawEnvelope>, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&(aggregate_type.to_string(), aggregate_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn current_version(&self, aggregate_type: &str, aggregate_id: Uuid) -> Result<i64, StoreError> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&(aggregate_type.to_string(), aggregate_id))
            .map_or(0, |events| events.len() as i64))
    }

    async fn aggregate_ids(&self, aggregate_type: &str) -> Result<Vec<Uuid>, StoreError> {
        let streams = self.streams.read().await;
        let mut ids: Vec<Uuid> = streams
            .keys()
            .filter(|(kind, _)| kind == aggregate_type)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
