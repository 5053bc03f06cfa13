/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: HS256 access/refresh tokens carrying the user's role
/// - [`middleware`]: Bearer-token middleware and the [`middleware::AuthContext`] extractor
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::jwt::issue_token_pair;
/// use taskdeck_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, refresh_token) =
///     issue_token_pair(Uuid::new_v4(), UserRole::User, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
