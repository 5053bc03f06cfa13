/// User endpoints
///
/// - `GET /api/users` - All users with counters (admin only)
/// - `GET /api/users/profile` - Current user with counters
/// - `PUT /api/users/profile` - Update names and avatar
/// - `PUT /api/users/password` - Change password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::ValidatedJson,
    fields,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User, UserProfile},
};
use validator::{Validate, ValidateUrl};

/// Width of the `users.avatar` column
pub const MAX_AVATAR_LENGTH: usize = 512;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "fields::trimmed_opt")]
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[serde(default, deserialize_with = "fields::trimmed_opt")]
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    /// `null` clears the avatar
    #[serde(default, deserialize_with = "fields::nullable_trimmed")]
    pub avatar: Option<Option<String>>,
}

impl UpdateProfileRequest {
    /// Field checks `Validate` cannot express on a nullable field
    fn check_avatar(&self) -> Result<(), ApiError> {
        let message = match &self.avatar {
            Some(Some(url)) if url.chars().count() > MAX_AVATAR_LENGTH => {
                format!("Avatar URL must be at most {} characters", MAX_AVATAR_LENGTH)
            }
            Some(Some(url)) if !url.validate_url() => "Avatar must be a valid URL".to_string(),
            _ => return Ok(()),
        };

        Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "avatar".to_string(),
            message,
        }]))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdatedResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Lists every user (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<UserProfile>>> {
    auth.require_admin()?;

    let users = User::list_profiles(&state.db).await?;

    Ok(Json(users))
}

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<UserProfile>> {
    let profile = User::find_profile(&state.db, auth.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdatedResponse>> {
    req.check_avatar()?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            avatar: req.avatar,
            password_hash: None,
        },
    )
    .await?
    .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(ProfileUpdatedResponse {
        message: "Profile updated successfully",
        user,
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(user_not_found)?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.new_password)?;

    User::update(
        &state.db,
        user.id,
        UpdateUser {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(user_not_found)?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpdateProfileRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_profile_update_trims_and_rejects_blank_names() {
        let req = parse(r#"{"firstName":"  Grace "}"#);
        assert!(req.validate().is_ok());
        assert_eq!(req.first_name.as_deref(), Some("Grace"));
        assert!(req.last_name.is_none());

        let blank = parse(r#"{"lastName":"   "}"#);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_avatar_must_be_url_but_may_be_cleared() {
        assert!(parse(r#"{"avatar":"https://example.com/me.png"}"#)
            .check_avatar()
            .is_ok());
        assert!(parse(r#"{"avatar":null}"#).check_avatar().is_ok());
        assert!(parse(r#"{}"#).check_avatar().is_ok());

        let err = parse(r#"{"avatar":"not a url"}"#).check_avatar().unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(ref d) if d[0].field == "avatar"));
    }

    #[test]
    fn test_avatar_longer_than_column_is_rejected() {
        let long = format!("https://example.com/{}", "a".repeat(600));
        let err = parse(&format!(r#"{{"avatar":"{}"}}"#, long))
            .check_avatar()
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::ValidationError(ref d)
                if d[0].field == "avatar" && d[0].message.contains("512")
        ));

        let fits = format!("https://example.com/{}", "a".repeat(MAX_AVATAR_LENGTH - 20));
        assert_eq!(fits.len(), MAX_AVATAR_LENGTH);
        assert!(parse(&format!(r#"{{"avatar":"{}"}}"#, fits))
            .check_avatar()
            .is_ok());
    }

    #[test]
    fn test_change_password_validation() {
        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"old","newPassword":"12345"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("new_password"));
    }
}
