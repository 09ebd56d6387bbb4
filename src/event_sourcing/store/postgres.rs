use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Row, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::event_sourcing::core::{ChangeSet, EventEnvelope, RawEnvelope, StreamAppend};
use super::event_store::{EventStore, StoreError};

// ============================================================================
// PostgreSQL Event Store
// ============================================================================
//
// One database transaction per change set. Each stream is guarded by a
// conditional write on `aggregate_sequence`:
// - new stream:      INSERT ... ON CONFLICT DO NOTHING
// - existing stream: UPDATE ... WHERE current_sequence = expected
// Zero affected rows means another writer got there first; the whole
// transaction is rolled back and the conflict reported.
//
// ============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS event_store (
        aggregate_type TEXT NOT NULL,
        aggregate_id UUID NOT NULL,
        sequence_number BIGINT NOT NULL,
        event_id UUID NOT NULL UNIQUE,
        event_type TEXT NOT NULL,
        event_version INT NOT NULL,
        event_data TEXT NOT NULL,
        causation_id UUID,
        correlation_id UUID NOT NULL,
        user_id UUID,
        metadata TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (aggregate_type, aggregate_id, sequence_number)
    )",
    "CREATE TABLE IF NOT EXISTS aggregate_sequence (
        aggregate_type TEXT NOT NULL,
        aggregate_id UUID NOT NULL,
        current_sequence BIGINT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        PRIMARY KEY (aggregate_type, aggregate_id)
    )",
];

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(anyhow::Error::new(err))
}

pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        tracing::info!(max_connections = max_connections, "Connecting to PostgreSQL event store");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables if they do not exist yet
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        tracing::info!("Event store schema ready");
        Ok(())
    }

    async fn claim_stream(
        tx: &mut Transaction<'_, Postgres>,
        append: &StreamAppend,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = if append.expected_version == 0 {
            sqlx::query(
                "INSERT INTO aggregate_sequence (aggregate_type, aggregate_id, current_sequence, updated_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (aggregate_type, aggregate_id) DO NOTHING",
            )
            .bind(&append.aggregate_type)
            .bind(append.aggregate_id)
            .bind(append.new_version())
            .bind(now)
            .execute(&mut **tx)
            .await
        } else {
            sqlx::query(
                "UPDATE aggregate_sequence SET current_sequence = $3, updated_at = $4
                 WHERE aggregate_type = $1 AND aggregate_id = $2 AND current_sequence = $5",
            )
            .bind(&append.aggregate_type)
            .bind(append.aggregate_id)
            .bind(append.new_version())
            .bind(now)
            .bind(append.expected_version)
            .execute(&mut **tx)
            .await
        };

        Ok(result.map_err(backend)?.rows_affected() == 1)
    }

    async fn insert_event(tx: &mut Transaction<'_, Postgres>, envelope: &RawEnvelope) -> Result<(), StoreError> {
        let metadata = serde_json::to_string(&envelope.metadata)?;

        sqlx::query(
            "INSERT INTO event_store (
                aggregate_type, aggregate_id, sequence_number, event_id, event_type, event_version,
                event_data, causation_id, correlation_id, user_id, metadata, timestamp
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&envelope.aggregate_type)
        .bind(envelope.aggregate_id)
        .bind(envelope.sequence_number)
        .bind(envelope.event_id)
        .bind(&envelope.event_type)
        .bind(envelope.event_version)
        .bind(envelope.event_data.to_string())
        .bind(envelope.causation_id)
        .bind(envelope.correlation_id)
        .bind(envelope.user_id)
        .bind(metadata)
        .bind(envelope.timestamp)
        .execute(&mut **tx)
        .await
        .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn append(&self, change_set: ChangeSet) -> Result<(), StoreError> {
        let correlation_id = change_set.correlation_id();
        let event_count = change_set.event_count();
        let appends = change_set.into_appends();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(backend)?;

        for append in &appends {
            if !Self::claim_stream(&mut tx, append, now).await? {
                let actual: Option<i64> = sqlx::query_scalar(
                    "SELECT current_sequence FROM aggregate_sequence
                     WHERE aggregate_type = $1 AND aggregate_id = $2",
                )
                .bind(&append.aggregate_type)
                .bind(append.aggregate_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(backend)?;

                tx.rollback().await.map_err(backend)?;

                return Err(StoreError::Conflict {
                    aggregate_type: append.aggregate_type.clone(),
                    aggregate_id: append.aggregate_id,
                    expected: append.expected_version,
                    actual: actual.unwrap_or(0),
                });
            }

            for envelope in &append.events {
                Self::insert_event(&mut tx, envelope).await?;
            }
        }

        tx.commit().await.map_err(backend)?;

        tracing::info!(
            correlation_id = %correlation_id,
            stream_count = appends.len(),
            event_count = event_count,
            "✅ Committed change set to event store"
        );

        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_type: &str,
        aggregate_id: Uuid,
    ) -> Result<Vec<RawEnvelope>, StoreError> {
        let rows = sqlx::query(
            "SELECT aggregate_type, aggregate_id, sequence_number, event_id, event_type, event_version,
                    event_data, causation_id, correlation_id, user_id, metadata, timestamp
             FROM event_store
             WHERE aggregate_type = $1 AND aggregate_id = $2
             ORDER BY sequence_number ASC",
        )
        .bind(aggregate_type)
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let event_data: String = row.try_get("event_data").map_err(backend)?;
            let metadata: String = row.try_get("metadata").map_err(backend)?;

            events.push(EventEnvelope {
                event_id: row.try_get("event_id").map_err(backend)?,
                aggregate_type: row.try_get("aggregate_type").map_err(backend)?,
                aggregate_id: row.try_get("aggregate_id").map_err(backend)?,
                sequence_number: row.try_get("sequence_number").map_err(backend)?,
                event_type: row.try_get("event_type").map_err(backend)?,
                event_version: row.try_get("event_version").map_err(backend)?,
                event_data: serde_json::from_str(&event_data)?,
                causation_id: row.try_get("causation_id").map_err(backend)?,
                correlation_id: row.try_get("correlation_id").map_err(backend)?,
                user_id: row.try_get("user_id").map_err(backend)?,
                timestamp: row.try_get("timestamp").map_err(backend)?,
                metadata: serde_json::from_str::<HashMap<String, String>>(&metadata)?,
            });
        }

        tracing::debug!("Loaded {} events for {} {}", events.len(), aggregate_type, aggregate_id);
        Ok(events)
    }

    async fn current_version(&self, aggregate_type: &str, aggregate_id: Uuid) -> Result<i64, StoreError> {
        let version: Option<i64> = sqlx::query_scalar(
            "SELECT current_sequence FROM aggregate_sequence
             WHERE aggregate_type = $1 AND aggregate_id = $2",
        )
        .bind(aggregate_type)
        .bind(aggregate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(version.unwrap_or(0))
    }

    async fn aggregate_ids(&self, aggregate_type: &str) -> Result<Vec<Uuid>, StoreError> {
        sqlx::query_scalar(
            "SELECT aggregate_id FROM aggregate_sequence WHERE aggregate_type = $1 ORDER BY aggregate_id",
        )
        .bind(aggregate_type)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(backend)?;
        Ok(())
    }
}

// ============================================================================
// Integration Tests
// ============================================================================
//
// These need a reachable PostgreSQL instance:
//   DATABASE_URL=postgres://... cargo test -- --ignored
//
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountAggregate, AccountEvent, AccountOpened};
    use crate::event_sourcing::core::Aggregate;
    use crate::event_sourcing::store::load_aggregate;

    async fn store() -> PostgresEventStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres tests");
        let store = PostgresEventStore::connect(&url, 5).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn opened() -> AccountEvent {
        AccountEvent::Opened(AccountOpened {
            display_name: "Postgres".to_string(),
            starting_points: 25,
            opened_at: Utc::now(),
        })
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
    async fn test_append_load_and_conflict() {
        let store = store().await;
        let id = Uuid::new_v4();

        let mut cs = ChangeSet::new(Uuid::new_v4());
        cs.append::<AccountAggregate>(id, 0, &[opened()]).unwrap();
        store.append(cs).await.unwrap();

        let account = load_aggregate::<AccountAggregate>(&store, id).await.unwrap().unwrap();
        assert_eq!(account.points_balance, 25);
        assert_eq!(account.version(), 1);

        // A second "create" for the same stream is stale
        let mut cs = ChangeSet::new(Uuid::new_v4());
        cs.append::<AccountAggregate>(id, 0, &[opened()]).unwrap();
        let err = store.append(cs).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { actual: 1, .. }));

        assert_eq!(store.current_version(AccountAggregate::AGGREGATE_TYPE, id).await.unwrap(), 1);
        assert!(store.aggregate_ids(AccountAggregate::AGGREGATE_TYPE).await.unwrap().contains(&id));
    }
}
