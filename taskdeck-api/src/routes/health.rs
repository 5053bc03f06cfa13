/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "database": "connected" }
/// ```
///
/// Always answers 200; a lost database shows up as `"degraded"`.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::db::pool;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

impl HealthResponse {
    fn new(database_up: bool) -> Self {
        let (status, database) = if database_up {
            ("healthy", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_up = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    Json(HealthResponse::new(database_up))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_states() {
        let up = HealthResponse::new(true);
        assert_eq!(up.status, "healthy");
        assert_eq!(up.database, "connected");
        assert_eq!(up.version, env!("CARGO_PKG_VERSION"));

        let down = HealthResponse::new(false);
        assert_eq!(down.status, "degraded");
        assert_eq!(down.database, "disconnected");
    }
}
