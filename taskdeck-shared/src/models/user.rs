/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('ADMIN', 'USER');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     avatar VARCHAR(512),
///     role user_role NOT NULL DEFAULT 'USER',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::user::{User, CreateUser, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
///     role: UserRole::User,
/// })
/// .await?;
///
/// let found = User::find_by_email(&pool, "ADA@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// May list every account
    Admin,

    /// Regular account
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

/// User account
///
/// The password hash is never serialized into API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT)
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    /// Optional avatar URL
    pub avatar: Option<String>,

    pub role: UserRole,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub last_login_at: Option<DateTime<Utc>>,
}

/// User with ownership counters, as returned by the profile endpoints
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,

    /// Number of projects owned by the user
    pub project_count: i64,

    /// Number of activity rows recorded for the user
    pub activity_count: i64,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    pub role: UserRole,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// `Some(None)` clears the avatar
    pub avatar: Option<Option<String>>,

    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.avatar.is_none()
            && self.password_hash.is_none()
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a database error carrying the `users_email_key` constraint
    /// when the email is already registered.
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email::TEXT AS email, password_hash, first_name, last_name, avatar,
                      role, is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email::TEXT AS email, password_hash, first_name, last_name, avatar,
                   role, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email::TEXT AS email, password_hash, first_name, last_name, avatar,
                   role, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1::CITEXT
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Loads a user together with their project and activity counts
    pub async fn find_profile(pool: &PgPool, id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.email::TEXT AS email, u.password_hash, u.first_name, u.last_name,
                   u.avatar, u.role, u.is_active, u.created_at, u.updated_at, u.last_login_at,
                   (SELECT COUNT(*) FROM projects p WHERE p.user_id = u.id) AS project_count,
                   (SELECT COUNT(*) FROM activities a WHERE a.user_id = u.id) AS activity_count
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Lists every user with counters, newest first
    pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.email::TEXT AS email, u.password_hash, u.first_name, u.last_name,
                   u.avatar, u.role, u.is_active, u.created_at, u.updated_at, u.last_login_at,
                   (SELECT COUNT(*) FROM projects p WHERE p.user_id = u.id) AS project_count,
                   (SELECT COUNT(*) FROM activities a WHERE a.user_id = u.id) AS activity_count
            FROM users u
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(profiles)
    }

    /// Updates an existing user
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is always bumped.
    /// Returns `None` if the user doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.avatar.is_some() {
            bind_count += 1;
            query.push_str(&format!(", avatar = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email::TEXT AS email, password_hash, first_name, last_name, \
             avatar, role, is_active, created_at, updated_at, last_login_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(avatar) = data.avatar {
            q = q.bind(avatar);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Permanently deletes a user; projects, tasks and activities cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// "First Last", used in log lines and greetings
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            avatar: None,
            role: UserRole::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_profile_flattens_user_fields() {
        let profile = UserProfile {
            user: sample_user(),
            project_count: 3,
            activity_count: 7,
        };

        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["projectCount"], 3);
        assert_eq!(json["activityCount"], 7);
    }

    #[test]
    fn test_update_user_default_is_empty() {
        assert!(UpdateUser::default().is_empty());

        let update = UpdateUser {
            avatar: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Ada Lovelace");
    }
}
