//! Service entry point: configuration, database pool, background job
//! runner, and the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use spin_rewards::adapters::http::{api_router, AppState};
use spin_rewards::adapters::postgres::{
    PostgresJobStore, PostgresRaffleRepository, PostgresReferralRepository,
    PostgresUserRepository, PostgresWebhookEventRepository,
};
use spin_rewards::adapters::scheduler::{JobRunner, JobRunnerConfig};
use spin_rewards::config::AppConfig;
use spin_rewards::ports::{
    JobStore, RaffleRepository, ReferralRepository, UserRepository, WebhookEventRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.server.log_level)?)
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let raffles: Arc<dyn RaffleRepository> = Arc::new(PostgresRaffleRepository::new(pool.clone()));
    let referrals: Arc<dyn ReferralRepository> =
        Arc::new(PostgresReferralRepository::new(pool.clone()));
    let events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    let jobs: Arc<dyn JobStore> = Arc::new(PostgresJobStore::new(pool));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = JobRunner::with_config(
        jobs.clone(),
        users.clone(),
        raffles.clone(),
        events.clone(),
        JobRunnerConfig {
            poll_interval: config.scheduler.poll_interval(),
            claim_batch: config.scheduler.claim_batch,
            event_retention: config.scheduler.event_retention(),
        },
    );
    let runner_handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    let state = AppState::new(users, raffles, referrals, events, jobs, config.payment.clone());

    let origins = config.server.cors_origins_list();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let parsed = origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new().allow_origin(parsed).allow_methods(Any).allow_headers(Any)
    };

    let router = api_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the runner after the server drains so in-flight webhooks can
    // still schedule jobs; the runner does a final sweep on shutdown.
    let _ = shutdown_tx.send(true);
    runner_handle.await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
