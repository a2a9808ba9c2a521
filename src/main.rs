use std::sync::Arc;

use anyhow::Context;

use ecom_admin_api::blob::DiskBlobStore;
use ecom_admin_api::store::{DocumentStore, MemoryStore, PgStore};
use ecom_admin_api::{app, config, resources, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Ecom Admin API in {:?} mode", config.environment);

    let store: Arc<dyn DocumentStore> = match config.database.url.as_deref() {
        Some(url) => {
            let store = PgStore::connect(url, config.database.max_connections)
                .await
                .context("failed to connect to Postgres")?
                .with_unique_keys(resources::UNIQUE_KEYS);
            store.migrate().await.context("failed to prepare schema")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; serving from the in-memory store");
            Arc::new(MemoryStore::new().with_unique_keys(resources::UNIQUE_KEYS))
        }
    };

    let blobs = Arc::new(DiskBlobStore::new(&config.uploads.dir));
    let app = app(AppState { store: store.clone(), blobs });

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    println!("🚀 Ecom Admin API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
