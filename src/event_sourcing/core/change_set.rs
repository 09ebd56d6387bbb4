use std::collections::HashMap;
use uuid::Uuid;

use super::aggregate::Aggregate;
use super::event::{serialize_event, DomainEvent, EventEnvelope, RawEnvelope};

// ============================================================================
// Change Set - One Atomic Unit of Work
// ============================================================================
//
// Collects appends to any number of streams. An event store commits a change
// set all-or-nothing: every stream must still be at its expected version,
// otherwise nothing is written.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct StreamAppend {
    pub aggregate_type: String,
    pub aggregate_id: Uuid,
    pub expected_version: i64,
    pub events: Vec<RawEnvelope>,
}

impl StreamAppend {
    pub fn new_version(&self) -> i64 {
        self.expected_version + self.events.len() as i64
    }
}

#[derive(Debug, Clone)]
pub struct ChangeSet {
    correlation_id: Uuid,
    user_id: Option<Uuid>,
    metadata: HashMap<String, String>,
    appends: Vec<StreamAppend>,
}

impl ChangeSet {
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            user_id: None,
            metadata: HashMap::new(),
            appends: Vec::new(),
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Queue events for one stream. `expected_version` is the version the
    /// caller read the aggregate at (0 for a new stream). Appending to the
    /// same stream twice continues its sequence.
    pub fn append<A: Aggregate>(
        &mut self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[A::Event],
    ) -> Result<(), serde_json::Error> {
        let position = self
            .appends
            .iter()
            .position(|a| a.aggregate_type == A::AGGREGATE_TYPE && a.aggregate_id == aggregate_id);

        let index = match position {
            Some(index) => index,
            None => {
                self.appends.push(StreamAppend {
                    aggregate_type: A::AGGREGATE_TYPE.to_string(),
                    aggregate_id,
                    expected_version,
                    events: Vec::new(),
                });
                self.appends.len() - 1
            }
        };

        let mut seq = self.appends[index].new_version();
        for event in events {
            seq += 1;
            let envelope = self.envelope::<A>(aggregate_id, seq, event)?;
            self.appends[index].events.push(envelope);
        }

        Ok(())
    }

    fn envelope<A: Aggregate>(
        &self,
        aggregate_id: Uuid,
        sequence_number: i64,
        event: &A::Event,
    ) -> Result<RawEnvelope, serde_json::Error> {
        let mut envelope = EventEnvelope::new(
            A::AGGREGATE_TYPE,
            aggregate_id,
            sequence_number,
            event.event_type(),
            serialize_event(event)?,
            self.correlation_id,
        )
        .with_event_version(event.event_version());

        if let Some(user_id) = self.user_id {
            envelope = envelope.with_user(user_id);
        }
        for (key, value) in &self.metadata {
            envelope = envelope.with_metadata(key.clone(), value.clone());
        }

        Ok(envelope)
    }

    pub fn is_empty(&self) -> bool {
        self.appends.iter().all(|a| a.events.is_empty())
    }

    pub fn event_count(&self) -> usize {
        self.appends.iter().map(|a| a.events.len()).sum()
    }

    pub fn streams(&self) -> &[StreamAppend] {
        &self.appends
    }

    pub fn into_appends(self) -> Vec<StreamAppend> {
        self.appends
    }
}
