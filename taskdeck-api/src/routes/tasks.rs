/// Task endpoints
///
/// Tasks are owned through their project: a task whose project belongs to
/// another user answers 404.
///
/// - `GET /api/tasks/project/:projectId` - Tasks of one project
/// - `POST /api/tasks` - Create task
/// - `PUT /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, ValidatedJson},
    fields,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        activity::{Activity, NewActivity},
        project::{Priority, Project},
        task::{CreateTask, Task, UpdateTask},
    },
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(deserialize_with = "fields::trimmed")]
    #[validate(length(min = 1, max = 200, message = "Task title is required"))]
    pub title: String,

    #[serde(default, deserialize_with = "fields::nullable_trimmed")]
    pub description: Option<Option<String>>,

    pub project_id: Uuid,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "fields::trimmed_opt")]
    #[validate(length(min = 1, max = 200, message = "Task title cannot be empty"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "fields::nullable_trimmed")]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,

    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "fields::datetime_opt")]
    pub due_date: Option<DateTime<Utc>>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            completed: req.completed,
            priority: req.priority,
            due_date: req.due_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: &'static str,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found".to_string())
}

pub async fn list_project_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    let project = Project::find_owned(&state.db, project_id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;

    Ok(Json(tasks))
}

/// Creates a task in one of the caller's projects and records `TASK_CREATED`
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let project = Project::find_owned(&state.db, req.project_id, auth.user_id)
        .await?
        .ok_or_else(project_not_found)?;

    let mut tx = state.db.begin().await?;

    let task = Task::create(
        &mut *tx,
        CreateTask {
            project_id: project.id,
            title: req.title,
            description: req.description.flatten(),
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date,
        },
    )
    .await?;

    Activity::record(
        &mut *tx,
        NewActivity::task_created(auth.user_id, project.id, &task.title),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %auth.user_id,
        project_id = %project.id,
        task_id = %task.id,
        "Task created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully",
            task,
        }),
    ))
}

/// Applies a partial update
///
/// `TASK_COMPLETED` is recorded only when `completed` flips from false to
/// true; re-sending `completed: true` records nothing.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let existing = Task::find_owned(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    let update: UpdateTask = req.into();
    let completes = existing.completes_with(&update);

    let mut tx = state.db.begin().await?;

    let task = Task::update(&mut *tx, existing.id, update)
        .await?
        .ok_or_else(task_not_found)?;

    if completes {
        Activity::record(
            &mut *tx,
            NewActivity::task_completed(auth.user_id, task.project_id, &task.title),
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task updated");

    Ok(Json(TaskResponse {
        message: "Task updated successfully",
        task,
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let task = Task::find_owned(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    if !Task::delete(&state.db, task.id).await? {
        return Err(task_not_found());
    }

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request() {
        let project_id = Uuid::new_v4();
        let req: CreateTaskRequest = serde_json::from_str(&format!(
            r#"{{"title":" Write docs ","projectId":"{}","dueDate":"2025-04-01"}}"#,
            project_id
        ))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.title, "Write docs");
        assert_eq!(req.project_id, project_id);
        assert_eq!(req.priority.unwrap_or_default(), Priority::Medium);
        assert!(req.due_date.is_some());
    }

    #[test]
    fn test_create_request_requires_project_and_title() {
        assert!(serde_json::from_str::<CreateTaskRequest>(r#"{"title":"x"}"#).is_err());
        assert!(
            serde_json::from_str::<CreateTaskRequest>(r#"{"title":"x","projectId":"nope"}"#)
                .is_err()
        );

        let blank: CreateTaskRequest = serde_json::from_str(&format!(
            r#"{{"title":"  ","projectId":"{}"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_update_request_maps_fields() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"completed":true,"priority":"HIGH"}"#).unwrap();
        assert!(req.validate().is_ok());

        let update: UpdateTask = req.into();
        assert_eq!(update.completed, Some(true));
        assert_eq!(update.priority, Some(Priority::High));
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }
}
