/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::{jwt_auth_middleware, AuthError};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to sign and verify JWTs
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health                          (public)
/// └── /api
///     ├── /auth/register|login|refresh     (public)
///     ├── GET /metrics, /revenue-sources   (public)
///     └── everything else                  (bearer token)
///         ├── GET  /auth/me
///         ├── GET  /users                  (admin)
///         ├── GET|PUT /users/profile, PUT /users/password
///         ├── GET|POST /projects, GET|PUT|DELETE /projects/:id
///         ├── POST /tasks, GET /tasks/project/:projectId, PUT|DELETE /tasks/:id
///         ├── GET  /dashboard/overview|project-progress|activities
///         └── GET  /activities
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/metrics", get(routes::legacy::metrics))
        .route("/revenue-sources", get(routes::legacy::revenue_sources));

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/users", get(routes::users::list_users))
        .route(
            "/users/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/users/password", put(routes::users::change_password))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/tasks", post(routes::tasks::create_task))
        .route(
            "/tasks/project/:project_id",
            get(routes::tasks::list_project_tasks),
        )
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/dashboard/overview", get(routes::dashboard::overview))
        .route(
            "/dashboard/project-progress",
            get(routes::dashboard::project_progress),
        )
        .route("/dashboard/activities", get(routes::dashboard::activity_feed))
        .route("/activities", get(routes::activities::list_activities))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Permissive when `*` is configured, otherwise the listed origins only
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Puts an `AuthContext` into request extensions or answers 401
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use std::collections::HashMap;
    use taskdeck_shared::{auth::jwt, models::user::UserRole};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret-at-least-32-characters";

    fn test_config(origins: &str) -> Config {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://localhost/taskdeck_unused"),
            ("JWT_SECRET", SECRET),
            ("API_CORS_ORIGINS", origins),
        ]
        .into_iter()
        .collect();

        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    /// Router over a pool that never connects; only requests rejected
    /// before reaching the database can be exercised.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/taskdeck_unused")
            .unwrap();
        build_router(AppState::new(pool, test_config("*")))
    }

    async fn send(request: Request) -> Response {
        test_app().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        for uri in [
            "/api/auth/me",
            "/api/projects",
            "/api/dashboard/overview",
            "/api/activities",
            "/api/users/profile",
        ] {
            let response = send(get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let response = send(get_request("/api/projects", Some("not-a-jwt"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (_, refresh) = jwt::issue_token_pair(Uuid::new_v4(), UserRole::User, SECRET).unwrap();
        let response = send(get_request("/api/projects", Some(&refresh))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_forbidden_for_users() {
        let (token, _) = jwt::issue_token_pair(Uuid::new_v4(), UserRole::User, SECRET).unwrap();

        let response = send(get_request("/api/users", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_path_id_is_bad_request() {
        let (token, _) = jwt::issue_token_pair(Uuid::new_v4(), UserRole::User, SECRET).unwrap();

        let response = send(get_request("/api/projects/not-a-uuid", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_activity_filter_is_bad_request() {
        let (token, _) = jwt::issue_token_pair(Uuid::new_v4(), UserRole::User, SECRET).unwrap();

        let response = send(get_request("/api/activities?type=NOPE", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(get_request("/api/activities?offset=-5", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_with_security_headers() {
        let response = send(get_request("/api/nothing-here", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }

    fn preflight(origin: &str) -> Request {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/projects")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_layer_with_explicit_origins() {
        let config = test_config("http://localhost:3000,http://localhost:5173");
        assert!(!config.allows_any_origin());

        let app = Router::new()
            .route("/api/projects", get(|| async { "ok" }))
            .layer(cors_layer(&config));

        let response = app
            .clone()
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );

        let response = app.oneshot(preflight("http://evil.example")).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_allows_any_origin() {
        let response = send(preflight("http://anywhere.example")).await;
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
