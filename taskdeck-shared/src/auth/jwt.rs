/// JWT token generation and validation module
///
/// Tokens are signed with HS256 and carry the user's id and role, so the
/// middleware can authorize requests without a database round trip.
///
/// # Token Types
///
/// - **Access Token**: 24 hours, sent as `Authorization: Bearer <token>`
/// - **Refresh Token**: 30 days, exchanged at `/api/auth/refresh`
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use taskdeck_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, UserRole::User, TokenType::Access);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Value of the `iss` claim on every token
pub const ISSUER: &str = "taskdeck";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Expected {expected} token")]
    WrongTokenType { expected: &'static str },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(24),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// Standard `sub`/`iss`/`iat`/`exp`/`nbf` plus the user's `role` and the
/// `token_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,

    /// Role at the time the token was issued
    pub role: UserRole,

    pub iss: String,

    pub iat: i64,

    pub exp: i64,

    pub nbf: i64,

    pub token_type: TokenType,
}

impl Claims {
    /// Creates claims with the token type's default lifetime
    pub fn new(user_id: Uuid, role: UserRole, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, role, token_type, token_type.default_expiration())
    }

    /// Creates claims that expire after `expires_in`
    pub fn with_expiration(
        user_id: Uuid,
        role: UserRole,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs `claims` with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates signature, expiry, not-before and issuer
///
/// # Errors
///
/// `JwtError::Expired` for expired tokens, `JwtError::ValidationError` for
/// everything else (bad signature, wrong issuer, malformed input).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Access {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Access.as_str(),
        });
    }

    Ok(claims)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongTokenType {
            expected: TokenType::Refresh.as_str(),
        });
    }

    Ok(claims)
}

/// Issues a new access token from a refresh token
///
/// `current_role` replaces the role baked into the refresh token, so a role
/// change takes effect on the next refresh.
pub fn refresh_access_token(
    refresh_token: &str,
    current_role: UserRole,
    secret: &str,
) -> Result<String, JwtError> {
    let refresh_claims = validate_refresh_token(refresh_token, secret)?;

    let access_claims = Claims::new(refresh_claims.sub, current_role, TokenType::Access);

    create_token(&access_claims, secret)
}

/// Issues an `(access, refresh)` token pair for a freshly authenticated user
pub fn issue_token_pair(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
) -> Result<(String, String), JwtError> {
    let access = create_token(&Claims::new(user_id, role, TokenType::Access), secret)?;
    let refresh = create_token(&Claims::new(user_id, role, TokenType::Refresh), secret)?;
    Ok((access, refresh))
}
