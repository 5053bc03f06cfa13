/// Project model and database operations
///
/// Projects belong to exactly one user. Every read and write in this module
/// that takes a `user_id` is scoped to that owner, so a project owned by
/// someone else is indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('ACTIVE', 'COMPLETED', 'ON_HOLD', 'CANCELLED');
/// CREATE TYPE priority AS ENUM ('LOW', 'MEDIUM', 'HIGH', 'URGENT');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
///     status project_status NOT NULL DEFAULT 'ACTIVE',
///     priority priority NOT NULL DEFAULT 'MEDIUM',
///     start_date TIMESTAMPTZ,
///     end_date TIMESTAMPTZ,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Cancelled => "CANCELLED",
        }
    }

    /// Key used in the dashboard's per-status breakdown (`on_hold`, ...)
    pub fn stats_key(&self) -> String {
        self.as_str().to_lowercase()
    }

    /// True when moving from `self` to `next` completes the project
    pub fn completes_on(&self, next: ProjectStatus) -> bool {
        *self != ProjectStatus::Completed && next == ProjectStatus::Completed
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("status", s))
    }
}

/// Priority shared by projects and tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("priority", s))
    }
}

/// Project row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// Percent complete, always within 0..=100
    pub progress: i32,

    pub status: ProjectStatus,

    pub priority: Priority,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    /// Owner
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Project with the number of tasks it contains
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,

    pub task_count: i64,
}

/// Slim projection used by the dashboard progress widget
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub id: Uuid,
    pub name: String,
    pub progress: i32,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

/// Optional list filters; `None` means "don't filter"
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,

    pub priority: Option<Priority>,

    /// Case-insensitive substring matched against name and description
    pub search: Option<String>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    pub progress: Option<i32>,

    pub status: Option<ProjectStatus>,

    pub priority: Option<Priority>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,
}

/// Escapes LIKE wildcards so user input only ever matches literally
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl Project {
    /// Inserts a new project owned by `data.user_id`
    pub async fn create<'e, E>(executor: E, data: CreateProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, priority, start_date, end_date, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, progress, status, priority,
                      start_date, end_date, user_id, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.user_id)
        .fetch_one(executor)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, only if `user_id` owns it
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, progress, status, priority,
                   start_date, end_date, user_id, created_at, updated_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Reads an owned project and locks its row until the transaction ends
    ///
    /// Concurrent updates of the same project then see each other's status.
    pub async fn find_owned_for_update<'e, E>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, progress, status, priority,
                   start_date, end_date, user_id, created_at, updated_at
            FROM projects
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(project)
    }

    /// Lists the owner's projects, newest first, with task counts
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: &ProjectFilter,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);

        let projects = sqlx::query_as::<_, ProjectSummary>(
            r#"
            SELECT p.id, p.name, p.description, p.progress, p.status, p.priority,
                   p.start_date, p.end_date, p.user_id, p.created_at, p.updated_at,
                   (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS task_count
            FROM projects p
            WHERE p.user_id = $1
              AND ($2::project_status IS NULL OR p.status = $2)
              AND ($3::priority IS NULL OR p.priority = $3)
              AND ($4::TEXT IS NULL OR p.name ILIKE $4 OR p.description ILIKE $4)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(search)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update
    ///
    /// Callers check ownership first; returns `None` if the row vanished.
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.progress.is_some() {
            bind_count += 1;
            query.push_str(&format!(", progress = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, description, progress, status, priority, \
             start_date, end_date, user_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(progress) = data.progress {
            q = q.bind(progress);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }

        let project = q.fetch_optional(executor).await?;

        Ok(project)
    }

    /// Deletes a project; its tasks cascade and its activities keep a NULL project
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the owner's projects grouped by status
    ///
    /// Statuses without projects are absent from the result.
    pub async fn count_by_status(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<(ProjectStatus, i64)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (ProjectStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM projects
            WHERE user_id = $1
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts the owner's projects in one status
    pub async fn count_with_status(
        pool: &PgPool,
        user_id: Uuid,
        status: ProjectStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM projects WHERE user_id = $1 AND status = $2")
                .bind(user_id)
                .bind(status)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Newest active projects for the dashboard progress widget
    pub async fn list_active_progress(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProjectProgress>, sqlx::Error> {
        let projects = sqlx::query_as::<_, ProjectProgress>(
            r#"
            SELECT id, name, progress, status, priority, created_at
            FROM projects
            WHERE user_id = $1 AND status = 'ACTIVE'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}
