use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use inspection_api::config::{self, StorageBackend};
use inspection_api::database::{Datastore, DatabaseManager, MemoryDatastore, PgDatastore};
use inspection_api::routes;
use inspection_api::state::AppState;
use inspection_api::storage::{EvidenceStorage, LocalStorage, MemoryStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,inspection_api=debug")),
        )
        .init();

    let config = config::config().clone();
    tracing::info!("Starting field inspection API in {:?} mode", config.environment);

    if inspection_api::is_development!() && std::env::var("JWT_SECRET").is_err() {
        tracing::warn!("JWT_SECRET not set; using the development signing secret");
    }
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let (store, storage): (Arc<dyn Datastore>, Arc<dyn EvidenceStorage>) = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            tokio::fs::create_dir_all(&config.storage.evidence_dir)
                .await
                .with_context(|| format!("failed to create {}", config.storage.evidence_dir.display()))?;
            let storage = LocalStorage::new(
                config.storage.evidence_dir.clone(),
                config.storage.public_base_url.clone(),
            );
            (Arc::new(PgDatastore::new(pool)), Arc::new(storage))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory datastore; nothing will be persisted");
            (
                Arc::new(MemoryDatastore::new()),
                Arc::new(MemoryStorage::new(config.storage.public_base_url.clone())),
            )
        }
    };

    let port = config.server.port;
    let app = routes::app(AppState::new(store, storage, config));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Field inspection API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
