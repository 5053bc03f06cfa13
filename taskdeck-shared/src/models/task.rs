/// Task model and database operations
///
/// Tasks belong to a project and are owned transitively by the project's
/// user. Ownership checks join through `projects` so a task in someone
/// else's project looks exactly like a missing task.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     priority priority NOT NULL DEFAULT 'MEDIUM',
///     due_date TIMESTAMPTZ,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::project::Priority;
/// use taskdeck_shared::models::task::{Task, CreateTask};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Write runbook".to_string(),
///     description: None,
///     priority: Priority::High,
///     due_date: None,
/// })
/// .await?;
///
/// assert!(Task::find_owned(&pool, task.id, user_id).await?.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::project::Priority;

/// Task row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    pub completed: bool,

    pub priority: Priority,

    pub due_date: Option<DateTime<Utc>>,

    /// Parent project
    pub project_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,

    pub priority: Option<Priority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Task totals across every project a user owns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
}

impl Task {
    /// Inserts a new task; callers verify project ownership first
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, priority, due_date, project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, completed, priority, due_date,
                      project_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.project_id)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, only if its project belongs to `user_id`
    pub async fn find_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.title, t.description, t.completed, t.priority, t.due_date,
                   t.project_id, t.created_at, t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, completed, priority, due_date,
                   project_id, created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts a project's tasks
    pub async fn count_by_project(pool: &PgPool, project_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Applies a partial update; callers check ownership first
    pub async fn update<'e, E>(
        executor: E,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(", completed = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, completed, priority, due_date, \
             project_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(executor).await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total and completed task counts over all of the user's projects
    pub async fn counts_for_user(pool: &PgPool, user_id: Uuid) -> Result<TaskCounts, sqlx::Error> {
        let counts = sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE t.completed) AS completed
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }

    /// Counts open (not completed) tasks of one priority across the user's projects
    pub async fn count_open_with_priority(
        pool: &PgPool,
        user_id: Uuid,
        priority: Priority,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.user_id = $1 AND t.completed = FALSE AND t.priority = $2
            "#,
        )
        .bind(user_id)
        .bind(priority)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// True when applying `update` flips this task from open to completed
    pub fn completes_with(&self, update: &UpdateTask) -> bool {
        !self.completed && update.completed == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write runbook".to_string(),
            description: None,
            completed: false,
            priority: Priority::High,
            due_date: None,
            project_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_completes_with_open_task() {
        let task = open_task();
        let update = UpdateTask {
            completed: Some(true),
            ..Default::default()
        };
        assert!(task.completes_with(&update));
    }

    #[test]
    fn test_completes_with_ignores_already_completed() {
        let mut task = open_task();
        task.completed = true;
        let update = UpdateTask {
            completed: Some(true),
            ..Default::default()
        };
        assert!(!task.completes_with(&update));
    }

    #[test]
    fn test_completes_with_ignores_reopen_and_absent() {
        let task = open_task();
        assert!(!task.completes_with(&UpdateTask::default()));
        assert!(!task.completes_with(&UpdateTask {
            completed: Some(false),
            ..Default::default()
        }));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let json = serde_json::to_value(open_task()).unwrap();
        assert!(json.get("projectId").is_some());
        assert!(json.get("dueDate").is_some());
        assert_eq!(json["priority"], "HIGH");
    }
}
