//! # Taskdeck seed tool
//!
//! Loads demo data: the legacy dashboard metric and revenue sources, plus a
//! demo account with five sample projects. Safe to re-run; each run
//! replaces the rows it created before.
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/taskdeck cargo run -p taskdeck-api --bin taskdeck-seed
//! ```
//!
//! `SEED_USER_EMAIL` and `SEED_USER_PASSWORD` override the demo account
//! credentials.

use anyhow::Context;
use std::env;
use taskdeck_shared::{
    auth::password,
    db::{migrations, pool, seed},
    models::user::{CreateUser, User, UserRole},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_EMAIL: &str = "demo@taskdeck.dev";
const DEFAULT_PASSWORD: &str = "demo123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_shared=info,taskdeck_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let email = env::var("SEED_USER_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
    let demo_password =
        env::var("SEED_USER_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

    migrations::ensure_database_exists(&database_url)
        .await
        .context("Failed to create database")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: database_url,
        max_connections: 2,
        min_connections: 1,
        ..Default::default()
    })
    .await
    .context("Failed to connect to the database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    let legacy = seed::seed_legacy(&db)
        .await
        .context("Failed to seed dashboard metrics")?;

    let owner = match User::find_by_email(&db, &email).await? {
        Some(user) => user,
        None => {
            let password_hash = password::hash_password(&demo_password)?;
            let user = User::create(
                &db,
                CreateUser {
                    email: email.clone(),
                    password_hash,
                    first_name: "Demo".to_string(),
                    last_name: "User".to_string(),
                    role: UserRole::User,
                },
            )
            .await
            .context("Failed to create demo user")?;
            tracing::info!(user_id = %user.id, email = %email, "Demo user created");
            user
        }
    };

    let projects = seed::seed_demo_projects(&db, owner.id)
        .await
        .context("Failed to seed demo projects")?;

    tracing::info!(
        metrics = legacy.metrics,
        revenue_sources = legacy.revenue_sources,
        projects = projects.projects,
        owner = %owner.email,
        "Seed completed"
    );

    pool::close_pool(db).await;

    Ok(())
}
