/// Static dashboard demo rows
///
/// The original dashboard widgets read a single metric row and a short list
/// of revenue sources. Both tables are filled by the seed tool only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Headline numbers for the legacy dashboard cards
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetric {
    pub id: Uuid,
    pub earnings_monthly: i32,
    pub earnings_annual: i32,
    pub tasks_percentage: i32,
    pub pending_requests: i32,
    pub created_at: DateTime<Utc>,
}

/// One slice of the revenue pie chart
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSource {
    pub id: Uuid,
    pub source_name: String,
    pub value: i32,
}

impl DashboardMetric {
    /// Oldest metric row, if any
    pub async fn first(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let metric = sqlx::query_as::<_, DashboardMetric>(
            r#"
            SELECT id, earnings_monthly, earnings_annual, tasks_percentage,
                   pending_requests, created_at
            FROM dashboard_metrics
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(metric)
    }

    pub async fn insert<'e, E>(
        executor: E,
        earnings_monthly: i32,
        earnings_annual: i32,
        tasks_percentage: i32,
        pending_requests: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let metric = sqlx::query_as::<_, DashboardMetric>(
            r#"
            INSERT INTO dashboard_metrics
                (earnings_monthly, earnings_annual, tasks_percentage, pending_requests)
            VALUES ($1, $2, $3, $4)
            RETURNING id, earnings_monthly, earnings_annual, tasks_percentage,
                      pending_requests, created_at
            "#,
        )
        .bind(earnings_monthly)
        .bind(earnings_annual)
        .bind(tasks_percentage)
        .bind(pending_requests)
        .fetch_one(executor)
        .await?;

        Ok(metric)
    }

    /// Removes every metric row; returns how many were deleted
    pub async fn clear<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM dashboard_metrics")
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

impl RevenueSource {
    /// All revenue sources, largest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sources = sqlx::query_as::<_, RevenueSource>(
            "SELECT id, source_name, value FROM revenue_sources ORDER BY value DESC, source_name",
        )
        .fetch_all(pool)
        .await?;

        Ok(sources)
    }

    pub async fn insert<'e, E>(executor: E, source_name: &str, value: i32) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let source = sqlx::query_as::<_, RevenueSource>(
            r#"
            INSERT INTO revenue_sources (source_name, value)
            VALUES ($1, $2)
            RETURNING id, source_name, value
            "#,
        )
        .bind(source_name)
        .bind(value)
        .fetch_one(executor)
        .await?;

        Ok(source)
    }

    pub async fn clear<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM revenue_sources")
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
