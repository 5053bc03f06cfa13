/// Configuration management for the API server
///
/// Configuration comes from environment variables; a `.env` file is loaded
/// first when present (development).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3001)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `API_PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HS256 signing secret, at least 32 characters (required)
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` means any origin
    pub cors_origins: Vec<String>,

    /// Production mode adds `Strict-Transport-Security`
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 characters. Generate with `openssl rand -hex 32`.
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Shortest accepted `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Config {
    /// Loads configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("API_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("API_PORT is not a valid port: {}", raw))?,
            None => 3001,
        };

        let cors_origins = parse_origins(&lookup("API_CORS_ORIGINS").unwrap_or_else(|| "*".to_string()));

        let production = lookup("API_PRODUCTION")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {}", raw))?,
            None => 10,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/taskdeck"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert_eq!(config.database.max_connections, 10);
        assert!(config.allows_any_origin());
        assert!(!config.api.production);
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("API_CORS_ORIGINS", "http://localhost:3000, https://app.example.com"),
            ("API_PRODUCTION", "true"),
            ("DATABASE_URL", "postgresql://localhost/taskdeck"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
        assert!(!config.allows_any_origin());
        assert!(config.api.production);
        assert_eq!(config.database.max_connections, 25);
    }

    #[test]
    fn test_missing_required() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).is_err());
        assert!(
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgresql://localhost/x")]))
                .is_err()
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/taskdeck"),
            ("JWT_SECRET", "too-short"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_port() {
        assert!(Config::from_lookup(lookup_from(&[
            ("API_PORT", "http"),
            ("DATABASE_URL", "postgresql://localhost/taskdeck"),
            ("JWT_SECRET", SECRET),
        ]))
        .is_err());
    }
}
