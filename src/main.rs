use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use courtside_ledger::api::{self, AppState};
use courtside_ledger::config::{AppConfig, StorageBackend, StorageConfig};
use courtside_ledger::event_sourcing::{EventStore, InMemoryEventStore, PostgresEventStore};
use courtside_ledger::metrics::{self, Metrics};
use courtside_ledger::utils::{retry_with_backoff, RetryConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter)))
        .init();

    tracing::info!("🚀 Starting Courtside ledger");

    // === 1. Event store ===
    let store = connect_store(&config.storage).await?;
    store.health_check().await?;

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. HTTP API (+ metrics endpoint) ===
    let state = AppState::new(store, metrics.clone(), config.retry_config());
    let api_server = api::serve(state, config.server.host.clone(), config.server.port);

    if config.metrics.enabled {
        let registry = Arc::new(metrics.registry().clone());
        let metrics_server = metrics::start_metrics_server(registry, config.server.host.clone(), config.metrics.port);
        futures_util::future::try_join(api_server, metrics_server).await?;
    } else {
        api_server.await?;
    }

    tracing::info!("👋 Ledger stopped");
    Ok(())
}

async fn connect_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn EventStore>> {
    match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory event store; state is lost on restart");
            Ok(Arc::new(InMemoryEventStore::new()))
        }
        StorageBackend::Postgres => {
            let url = storage
                .database_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for the postgres backend"))?;

            tracing::info!("Connecting to PostgreSQL...");
            let startup = RetryConfig {
                max_attempts: 5,
                initial_delay: std::time::Duration::from_millis(500),
                max_delay: std::time::Duration::from_secs(5),
                multiplier: 2.0,
            };
            let store = retry_with_backoff(startup, |_attempt| {
                PostgresEventStore::connect(&url, storage.max_connections)
            })
            .await
            .into_result()?;

            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
