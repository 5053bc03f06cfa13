/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`. Errors render as `{"error": "..."}`,
/// with a `details` array for validation failures.
///
/// # Example
///
/// ```
/// use taskdeck_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Project not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskdeck_shared::{
    auth::{jwt::JwtError, middleware::AuthError, password::PasswordError},
    models::ParseEnumError,
    stats::PageError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unique constraint guarding `users.email`
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found, or owned by someone else (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Internal server error (500); the message is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation, as named in the JSON body
    pub field: String,

    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, details) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (msg, None),
            ApiError::ValidationError(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                    return ApiError::Conflict("User already exists".to_string());
                }
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden => ApiError::Forbidden(err.to_string()),
            _ => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<ParseEnumError> for ApiError {
    fn from(err: ParseEnumError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field.to_string());
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `first_name` -> `firstName`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "First name is required"))]
        first_name: String,
        #[validate(range(min = 0, max = 100))]
        progress: i32,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Project not found".to_string());
        assert_eq!(err.to_string(), "Not found: Project not found");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ValidationError(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized(String::new()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden(String::new()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict(String::new()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InternalError(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_validation_errors_render_details() {
        let form = Form {
            first_name: String::new(),
            progress: 150,
        };
        let err = ApiError::from(form.validate().unwrap_err());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["details"][0]["field"], "firstName");
        assert_eq!(json["details"][0]["message"], "First name is required");
        assert_eq!(json["details"][1]["field"], "progress");
        assert_eq!(json["details"][1]["message"], "progress is invalid");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::MissingCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::from(JwtError::Expired).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_row_not_found_is_404() {
        assert_eq!(
            ApiError::from(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("current_password"), "currentPassword");
        assert_eq!(camel_case("email"), "email");
    }
}
