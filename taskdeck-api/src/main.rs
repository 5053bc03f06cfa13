//! # Taskdeck API Server
//!
//! Serves the Taskdeck REST API: accounts, projects, tasks, the activity
//! feed and dashboard aggregates, backed by PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskdeck JWT_SECRET=... cargo run -p taskdeck-api
//! ```

use anyhow::Context;
use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
