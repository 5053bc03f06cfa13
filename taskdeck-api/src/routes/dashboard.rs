/// Dashboard endpoints
///
/// - `GET /api/dashboard/overview` - Counters and the 10 newest activities
/// - `GET /api/dashboard/project-progress` - Up to 10 newest active projects
/// - `GET /api/dashboard/activities` - Activity feed, 20 per page by default

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedQuery,
    routes::activities::{self, ActivityPage, ActivityQuery},
};
use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        activity::{Activity, ActivityEntry},
        project::{Priority, Project, ProjectProgress, ProjectStatus},
        task::Task,
    },
    stats::{completion_percentage, status_breakdown},
};

/// Activities embedded in the overview
const RECENT_ACTIVITIES: i64 = 10;

/// Projects shown by the progress widget
const PROGRESS_PROJECTS: i64 = 10;

/// Feed page size when `limit` is omitted
const FEED_DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    /// Project counts keyed by lower-cased status; empty statuses are omitted
    pub project_stats: BTreeMap<String, i64>,
    pub total_projects: i64,
    pub active_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub tasks_percentage: i64,
    /// Open tasks with HIGH priority
    pub pending_requests: i64,
    pub recent_activities: Vec<ActivityEntry>,
}

pub async fn overview(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<DashboardOverview>> {
    let db = &state.db;
    let user_id = auth.user_id;

    let (status_rows, task_counts, active_projects, pending_requests, recent_activities) =
        tokio::try_join!(
            Project::count_by_status(db, user_id),
            Task::counts_for_user(db, user_id),
            Project::count_with_status(db, user_id, ProjectStatus::Active),
            Task::count_open_with_priority(db, user_id, Priority::High),
            Activity::list_for_user(db, user_id, None, RECENT_ACTIVITIES, 0),
        )?;

    let (project_stats, total_projects) = status_breakdown(&status_rows);

    Ok(Json(DashboardOverview {
        project_stats,
        total_projects,
        active_projects,
        total_tasks: task_counts.total,
        completed_tasks: task_counts.completed,
        tasks_percentage: completion_percentage(task_counts.completed, task_counts.total),
        pending_requests,
        recent_activities,
    }))
}

pub async fn project_progress(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ProjectProgress>>> {
    let projects = Project::list_active_progress(&state.db, auth.user_id, PROGRESS_PROJECTS).await?;

    Ok(Json(projects))
}

pub async fn activity_feed(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedQuery(query): ValidatedQuery<ActivityQuery>,
) -> ApiResult<Json<ActivityPage>> {
    let page = activities::load_page(&state.db, auth.user_id, query, FEED_DEFAULT_LIMIT).await?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_shape() {
        let (project_stats, total_projects) =
            status_breakdown(&[(ProjectStatus::Active, 2), (ProjectStatus::OnHold, 1)]);

        let json = serde_json::to_value(DashboardOverview {
            project_stats,
            total_projects,
            active_projects: 2,
            total_tasks: 3,
            completed_tasks: 2,
            tasks_percentage: completion_percentage(2, 3),
            pending_requests: 1,
            recent_activities: Vec::new(),
        })
        .unwrap();

        assert_eq!(json["projectStats"]["active"], 2);
        assert_eq!(json["projectStats"]["on_hold"], 1);
        assert!(json["projectStats"].get("completed").is_none());
        assert_eq!(json["totalProjects"], 3);
        assert_eq!(json["tasksPercentage"], 67);
        assert_eq!(json["pendingRequests"], 1);
        assert!(json["recentActivities"].is_array());
    }
}
