/// Activity (audit trail) model
///
/// Activities are append-only. Handlers record one in the same transaction as
/// the mutation it describes; nothing in the API updates or deletes them.
/// Deleting a project leaves its activities behind with `project_id = NULL`.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::activity::{Activity, NewActivity};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// Activity::record(&mut *tx, NewActivity::project_created(user_id, project_id, "Server Migration")).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// Kind of event an activity records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    ProjectCreated,
    ProjectUpdated,
    ProjectCompleted,
    TaskCreated,
    TaskCompleted,
}

impl ActivityType {
    pub const ALL: [ActivityType; 5] = [
        ActivityType::ProjectCreated,
        ActivityType::ProjectUpdated,
        ActivityType::ProjectCompleted,
        ActivityType::TaskCreated,
        ActivityType::TaskCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::ProjectCreated => "PROJECT_CREATED",
            ActivityType::ProjectUpdated => "PROJECT_UPDATED",
            ActivityType::ProjectCompleted => "PROJECT_COMPLETED",
            ActivityType::TaskCreated => "TASK_CREATED",
            ActivityType::TaskCompleted => "TASK_COMPLETED",
        }
    }
}

impl FromStr for ActivityType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("activity type", s))
    }
}

/// Activity row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub activity_type: ActivityType,

    pub title: String,

    pub description: Option<String>,

    pub user_id: Uuid,

    /// `None` for events whose project has since been deleted
    pub project_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Name of the project an activity refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub name: String,
}

/// Activity as shown in feeds: the row plus `project: {name} | null`
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub activity: Activity,

    pub project: Option<ProjectRef>,
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    #[sqlx(flatten)]
    activity: Activity,
    project_name: Option<String>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            activity: row.activity,
            project: row.project_name.map(|name| ProjectRef { name }),
        }
    }
}

/// Input for appending an activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
}

impl NewActivity {
    fn new(
        activity_type: ActivityType,
        title: &str,
        description: String,
        user_id: Uuid,
        project_id: Uuid,
    ) -> Self {
        Self {
            activity_type,
            title: title.to_string(),
            description: Some(description),
            user_id,
            project_id: Some(project_id),
        }
    }

    pub fn project_created(user_id: Uuid, project_id: Uuid, name: &str) -> Self {
        Self::new(
            ActivityType::ProjectCreated,
            "Project created",
            format!("Created project: {}", name),
            user_id,
            project_id,
        )
    }

    pub fn project_updated(user_id: Uuid, project_id: Uuid, name: &str) -> Self {
        Self::new(
            ActivityType::ProjectUpdated,
            "Project updated",
            format!("Updated project: {}", name),
            user_id,
            project_id,
        )
    }

    pub fn project_completed(user_id: Uuid, project_id: Uuid, name: &str) -> Self {
        Self::new(
            ActivityType::ProjectCompleted,
            "Project completed",
            format!("Completed project: {}", name),
            user_id,
            project_id,
        )
    }

    pub fn task_created(user_id: Uuid, project_id: Uuid, title: &str) -> Self {
        Self::new(
            ActivityType::TaskCreated,
            "Task created",
            format!("Created task: {}", title),
            user_id,
            project_id,
        )
    }

    pub fn task_completed(user_id: Uuid, project_id: Uuid, title: &str) -> Self {
        Self::new(
            ActivityType::TaskCompleted,
            "Task completed",
            format!("Completed task: {}", title),
            user_id,
            project_id,
        )
    }
}

impl Activity {
    /// Appends an activity row
    ///
    /// Stamped with `clock_timestamp()` rather than the transaction start, so
    /// several rows recorded in one transaction list newest first in the
    /// order they were written.
    pub async fn record<'e, E>(executor: E, data: NewActivity) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities
                (type, title, description, user_id, project_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, clock_timestamp(), clock_timestamp())
            RETURNING id, type, title, description, user_id, project_id, created_at, updated_at
            "#,
        )
        .bind(data.activity_type)
        .bind(data.title)
        .bind(data.description)
        .bind(data.user_id)
        .bind(data.project_id)
        .fetch_one(executor)
        .await?;

        Ok(activity)
    }

    /// Lists a user's activities newest first, optionally of one type
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        activity_type: Option<ActivityType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT a.id, a.type, a.title, a.description, a.user_id, a.project_id,
                   a.created_at, a.updated_at, p.name AS project_name
            FROM activities a
            LEFT JOIN projects p ON p.id = a.project_id
            WHERE a.user_id = $1
              AND ($2::activity_type IS NULL OR a.type = $2)
            ORDER BY a.created_at DESC, a.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(activity_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    /// Counts a user's activities, optionally of one type
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: Uuid,
        activity_type: Option<ActivityType>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM activities
            WHERE user_id = $1
              AND ($2::activity_type IS NULL OR type = $2)
            "#,
        )
        .bind(user_id)
        .bind(activity_type)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
