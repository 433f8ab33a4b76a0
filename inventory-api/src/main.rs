use anyhow::Context;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use common_observability::init_tracing;
use inventory_api::{build_router, config::load_config, AppState, PgInventoryRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to DATABASE_URL")?;

    let repo = PgInventoryRepository::new(pool);
    repo.migrate().await.context("Failed to run inventory migrations")?;
    info!("Database ready");

    if config.test_mode {
        warn!("INVENTORY_TEST_MODE is on: DELETE /api/inventory will purge all items");
    }
    let state = AppState::new(Arc::new(repo), config.test_mode);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            config
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("x-trace-id"),
        ])
        .expose_headers([
            HeaderName::from_static("x-error-code"),
            HeaderName::from_static("location"),
        ]);

    let app = build_router(state).layer(cors);

    let addr = config.socket_addr();
    info!(%addr, "starting inventory-api");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("inventory-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
