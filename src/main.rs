//! Hospital operations console server.
//!
//! Entry point: configuration, logging, token store, then the HTTP server.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use hospital_ops::{
    AppState,
    backend::BackendClient,
    config::AppConfig,
    server,
    session::FileTokenStore,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before the config reads the environment
    let _ = dotenv();

    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);
    telemetry::init(&config.log);

    let store = FileTokenStore::open(&config.session.store_path)
        .await
        .with_context(|| {
            format!(
                "failed to open session store at {}",
                config.session.store_path.display()
            )
        })?;
    info!(
        name: "session.store.opened",
        path = %config.session.store_path.display(),
        "Token store ready"
    );

    let backend = BackendClient::from_config(&config.backend).context("invalid backend URL")?;
    let state = AppState::new(Arc::clone(&config), Arc::new(store), backend);

    server::start_server(state).await
}
