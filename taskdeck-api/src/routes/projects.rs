/// Project endpoints
///
/// Every query is scoped to the authenticated user. A project owned by
/// someone else answers 404, exactly like one that does not exist.
///
/// # Endpoints
///
/// - `GET /api/projects` - List own projects (filters: `status`, `priority`, `search`)
/// - `GET /api/projects/:id` - Project with its tasks
/// - `POST /api/projects` - Create project
/// - `PUT /api/projects/:id` - Partial update
/// - `DELETE /api/projects/:id` - Delete project and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, ValidatedJson, ValidatedQuery},
    fields,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        activity::{Activity, NewActivity},
        project::{
            CreateProject, Priority, Project, ProjectFilter, ProjectStatus, ProjectSummary,
            UpdateProject,
        },
        task::Task,
    },
};
use uuid::Uuid;
use validator::Validate;

/// List filters
///
/// Enum values arrive as raw strings so an unknown value can be reported
/// as a 400 naming the offending value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListProjectsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

impl ListProjectsQuery {
    fn into_filter(self) -> Result<ProjectFilter, ApiError> {
        Ok(ProjectFilter {
            status: self.status.as_deref().map(str::parse::<ProjectStatus>).transpose()?,
            priority: self.priority.as_deref().map(str::parse::<Priority>).transpose()?,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub name: String,

    #[serde(default, deserialize_with = "fields::nullable_trimmed")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default, deserialize_with = "fields::trimmed_opt")]
    #[validate(length(min = 1, max = 200, message = "Project name cannot be empty"))]
    pub name: Option<String>,

    /// `null` clears the description
    #[serde(default, deserialize_with = "fields::nullable_trimmed")]
    pub description: Option<Option<String>>,

    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    pub status: Option<ProjectStatus>,

    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub end_date: Option<DateTime<Utc>>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        UpdateProject {
            name: req.name,
            description: req.description,
            progress: req.progress,
            status: req.status,
            priority: req.priority,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// Project with its tasks, newest first
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,

    pub tasks: Vec<Task>,

    pub task_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: &'static str,
    pub project: ProjectSummary,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

/// Lists the caller's projects, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedQuery(query): ValidatedQuery<ListProjectsQuery>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let filter = query.into_filter()?;

    let projects = Project::list_for_user(&state.db, auth.user_id, &filter).await?;

    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let project = Project::find_owned(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;
    let task_count = tasks.len() as i64;

    Ok(Json(ProjectDetail {
        project,
        tasks,
        task_count,
    }))
}

/// Creates a project and records `PROJECT_CREATED`
///
/// ```text
/// POST /api/projects
///
/// { "name": "Server Migration", "priority": "HIGH", "endDate": "2025-06-30" }
/// ```
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let mut tx = state.db.begin().await?;

    let project = Project::create(
        &mut *tx,
        CreateProject {
            user_id: auth.user_id,
            name: req.name,
            description: req.description.flatten(),
            priority: req.priority.unwrap_or_default(),
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Activity::record(
        &mut *tx,
        NewActivity::project_created(auth.user_id, project.id, &project.name),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created successfully",
            project: ProjectSummary {
                project,
                task_count: 0,
            },
        }),
    ))
}

/// Applies a partial update and records `PROJECT_UPDATED`
///
/// Moving the status to `COMPLETED` from any other status also records
/// `PROJECT_COMPLETED`.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let mut tx = state.db.begin().await?;

    let existing = Project::find_owned_for_update(&mut *tx, id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    let completes = req
        .status
        .is_some_and(|next| existing.status.completes_on(next));

    let project = Project::update(&mut *tx, existing.id, req.into())
        .await?
        .ok_or_else(project_not_found)?;

    Activity::record(
        &mut *tx,
        NewActivity::project_updated(auth.user_id, project.id, &project.name),
    )
    .await?;

    if completes {
        Activity::record(
            &mut *tx,
            NewActivity::project_completed(auth.user_id, project.id, &project.name),
        )
        .await?;
    }

    tx.commit().await?;

    let task_count = Task::count_by_project(&state.db, project.id).await?;

    tracing::info!(
        user_id = %auth.user_id,
        project_id = %project.id,
        completed = completes,
        "Project updated"
    );

    Ok(Json(ProjectResponse {
        message: "Project updated successfully",
        project: ProjectSummary {
            project,
            task_count,
        },
    }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let project = Project::find_owned(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    if !Project::delete(&state.db, project.id).await? {
        return Err(project_not_found());
    }

    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project deleted");

    Ok(Json(MessageResponse {
        message: "Project deleted successfully",
    }))
}
