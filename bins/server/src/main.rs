//! Stockwise API Server
//!
//! Main entry point for the Stockwise inventory service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockwise_api::{AppState, InMemoryRateLimitStore, RateLimitStore, create_router, run_janitor};
use stockwise_db::connect_with_pool;
use stockwise_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockwise=debug,stockwise_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
        Duration::from_secs(config.database.acquire_timeout_secs),
    )
    .await
    .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        ..JwtConfig::default()
    });

    let rate_limiter: Arc<dyn RateLimitStore> =
        Arc::new(InMemoryRateLimitStore::from_config(&config.rate_limit));
    tokio::spawn(run_janitor(
        Arc::clone(&rate_limiter),
        Duration::from_secs(config.rate_limit.sweep_interval_secs),
    ));
    info!(
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Rate limiter configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        rate_limiter,
        allocation_max_retries: config.allocation.max_retries,
        sku_max_attempts: config.sku.max_attempts,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
