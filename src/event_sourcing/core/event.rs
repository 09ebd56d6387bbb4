use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ============================================================================
// Event Envelope - Event Metadata
// ============================================================================
//
// Wraps domain events with the metadata the store persists alongside them.
// Generic over the payload: typed domain events on the way in and out of
// aggregates, `serde_json::Value` inside the store.
//
// ============================================================================

/// Payload as persisted by an event store
pub type RawEnvelope = EventEnvelope<serde_json::Value>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,
    pub correlation_id: Uuid,

    // Who triggered this event (account id when known)
    pub user_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,

    pub metadata: HashMap<String, String>,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: Uuid,
        sequence_number: i64,
        event_type: impl Into<String>,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_type: aggregate_type.into(),
            aggregate_id,
            sequence_number,
            event_type: event_type.into(),
            event_version: 1,
            event_data,
            causation_id: None,
            correlation_id,
            user_id: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_event_version(mut self, event_version: i32) -> Self {
        self.event_version = event_version;
        self
    }

    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Convert the payload, keeping every piece of metadata
    pub fn try_map<T, Err>(
        self,
        f: impl FnOnce(E) -> Result<T, Err>,
    ) -> Result<EventEnvelope<T>, Err> {
        Ok(EventEnvelope {
            event_id: self.event_id,
            aggregate_type: self.aggregate_type,
            aggregate_id: self.aggregate_id,
            sequence_number: self.sequence_number,
            event_type: self.event_type,
            event_version: self.event_version,
            event_data: f(self.event_data)?,
            causation_id: self.causation_id,
            correlation_id: self.correlation_id,
            user_id: self.user_id,
            timestamp: self.timestamp,
            metadata: self.metadata,
        })
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// All domain events implement this to be stored and replayed.
pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Name of the concrete event, e.g. "OrderPlaced"
    fn event_type(&self) -> &'static str;

    fn event_version(&self) -> i32 {
        1
    }
}

// ============================================================================
// Event Serialization Helpers
// ============================================================================

pub fn serialize_event<E: Serialize>(event: &E) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(event)
}

pub fn deserialize_event<E: DeserializeOwned>(value: serde_json::Value) -> Result<E, serde_json::Error> {
    serde_json::from_value(value)
}

// ============================================================================
// Tests
// ============================================================================
