use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backoffice_api::config::Config;
use backoffice_api::routes::build_router;
use backoffice_api::state::AppState;
use backoffice_api::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed env vars abort start-up)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "backoffice_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting back-office API v{}", env!("CARGO_PKG_VERSION"));

    let store = if config.seed_demo_data {
        info!("Seeding in-memory store with demo data");
        Store::seeded()
    } else {
        Store::empty()
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create upload dir {}", config.upload_dir.display()))?;
    info!("Uploads stored under {}", config.upload_dir.display());

    if !config.mock_latency.is_zero() {
        info!("Simulating {}ms latency per call", config.mock_latency.as_millis());
    }

    let state = AppState::new(config.clone(), store);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
