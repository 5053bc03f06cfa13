/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create an account and get tokens
/// - `POST /api/auth/login` - Exchange credentials for tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token for an access token
/// - `GET /api/auth/me` - Current user (authenticated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    fields,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User, UserRole},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register/login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: &'static str,

    pub user: User,

    /// Access token (24h)
    pub token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub token: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
///
/// { "email": "ada@example.com", "password": "secret1", "firstName": "Ada", "lastName": "Lovelace" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration can still win the race; the unique
    // constraint then surfaces as 409 through `From<sqlx::Error>`.
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            role: UserRole::User,
        },
    )
    .await?;

    let (token, refresh_token) = jwt::issue_token_pair(user.id, user.role, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            user,
            token,
            refresh_token,
        }),
    ))
}

/// Login
///
/// Unknown email, wrong password and deactivated accounts all answer with
/// the same 401.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    if !user.is_active {
        tracing::debug!(user_id = %user.id, "Login rejected: account inactive");
        return Err(invalid_credentials());
    }

    User::update_last_login(&state.db, user.id).await?;

    let (token, refresh_token) = jwt::issue_token_pair(user.id, user.role, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        user,
        token,
        refresh_token,
    }))
}

/// Token refresh
///
/// The new access token carries the account's current role. Deleted or
/// deactivated accounts can no longer refresh.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let token = jwt::refresh_access_token(&req.refresh_token, user.role, state.jwt_secret())?;

    Ok(Json(RefreshResponse { token }))
}

/// Current user
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":" ada@example.com ","password":"secret1","firstName":" Ada ","lastName":"Lovelace"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.first_name, "Ada");

        let short: RegisterRequest = serde_json::from_str(
            r#"{"email":"ada@example.com","password":"12345","firstName":"Ada","lastName":"L"}"#,
        )
        .unwrap();
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let blank: RegisterRequest = serde_json::from_str(
            r#"{"email":"not-an-email","password":"secret1","firstName":"   ","lastName":"L"}"#,
        )
        .unwrap();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let req: RefreshRequest = serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.refresh_token, "abc");
    }

    #[test]
    fn test_auth_response_shape() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$hidden".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar: None,
            role: UserRole::User,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            last_login_at: None,
        };

        let json = serde_json::to_value(AuthResponse {
            message: "Login successful",
            user,
            token: "a".to_string(),
            refresh_token: "r".to_string(),
        })
        .unwrap();

        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["user"]["firstName"], "Ada");
        assert!(json["user"].get("passwordHash").is_none());
    }
}
