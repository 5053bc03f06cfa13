/// Shared setup for API integration tests
///
/// Each context owns a fresh user so tests can run in parallel against one
/// database. Tests skip when `DATABASE_URL` is not set.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::{
    auth::jwt,
    db::migrations,
    models::user::{CreateUser, User, UserRole},
};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Connects, migrates and creates a user with an access token
    ///
    /// Returns `None` when no database is configured.
    pub async fn new() -> anyhow::Result<Option<Self>> {
        Self::with_role(UserRole::User).await
    }

    pub async fn with_role(role: UserRole) -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return Ok(None);
        };

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            _ => None,
        })?;

        let db = PgPool::connect(&config.database.url).await?;
        migrations::run_migrations(&db).await?;

        let user = create_user(&db, role).await?;
        let (token, _) = jwt::issue_token_pair(user.id, user.role, TEST_JWT_SECRET)?;

        let app = build_router(AppState::new(db.clone(), config));

        Ok(Some(Self {
            db,
            app,
            user,
            token,
        }))
    }

    /// Another user with their own token, sharing this context's router
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = create_user(&self.db, UserRole::User).await?;
        let (token, _) = jwt::issue_token_pair(user.id, user.role, TEST_JWT_SECRET)?;
        Ok((user, token))
    }

    /// Sends a request as this context's user
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Removes the user; projects, tasks and activities cascade
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

async fn create_user(db: &PgPool, role: UserRole) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: "unused".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        },
    )
    .await?;

    Ok(user)
}
