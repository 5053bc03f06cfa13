/// Activity feed
///
/// ```text
/// GET /api/activities?type=TASK_COMPLETED&limit=50&offset=0
/// ```
///
/// ```json
/// { "activities": [...], "total": 120, "hasMore": true }
/// ```

use crate::{app::AppState, error::ApiResult, extract::ValidatedQuery};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::activity::{Activity, ActivityEntry, ActivityType},
    stats::PageWindow,
};
use uuid::Uuid;
use validator::Validate;

/// Page size when `limit` is omitted
pub const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ActivityQuery {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPage {
    pub activities: Vec<ActivityEntry>,
    pub total: i64,
    pub has_more: bool,
}

/// Loads one page of `user_id`'s feed
///
/// Shared with the dashboard feed, which only differs in its default size.
pub(crate) async fn load_page(
    db: &PgPool,
    user_id: Uuid,
    query: ActivityQuery,
    default_limit: i64,
) -> ApiResult<ActivityPage> {
    let activity_type = query
        .activity_type
        .as_deref()
        .map(str::parse::<ActivityType>)
        .transpose()?;
    let window = PageWindow::new(query.limit, query.offset, default_limit)?;

    let activities =
        Activity::list_for_user(db, user_id, activity_type, window.limit, window.offset).await?;
    let total = Activity::count_for_user(db, user_id, activity_type).await?;

    Ok(ActivityPage {
        activities,
        total,
        has_more: window.has_more(total),
    })
}

pub async fn list_activities(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedQuery(query): ValidatedQuery<ActivityQuery>,
) -> ApiResult<Json<ActivityPage>> {
    let page = load_page(&state.db, auth.user_id, query, DEFAULT_LIMIT).await?;

    Ok(Json(page))
}
