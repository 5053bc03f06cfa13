/// Bearer-token authentication for Axum
///
/// The middleware validates `Authorization: Bearer <token>` and inserts an
/// [`AuthContext`] into the request extensions. Handlers take `AuthContext`
/// as an argument; it is also an extractor.
///
/// # Example
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use taskdeck_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let secret = "your-jwt-secret-at-least-32-bytes-long".to_string();
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(move |req, next| {
///         jwt_auth_middleware(secret.clone(), req, next)
///     }));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::UserRole;

/// Identity of the caller, available to every protected handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with [`AuthError::Forbidden`] unless the caller is an admin
    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Authentication and authorization failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("{0}")]
    InvalidToken(String),

    #[error("Admin access required")]
    Forbidden,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        }
    }
}

/// Validates the bearer token in `headers`
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)?;

    let claims = validate_access_token(token, secret)?;

    Ok(AuthContext::from_claims(&claims))
}

/// JWT authentication middleware
///
/// Responds 401 when the header is missing, is not a bearer token, or the
/// token is invalid or expired.
pub async fn jwt_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = authenticate(req.headers(), &secret)?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
