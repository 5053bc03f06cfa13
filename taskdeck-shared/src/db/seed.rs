/// Demo data for the legacy dashboard widgets and a sample workspace
///
/// Each seeding function resets the rows it owns before inserting, so the
/// seed tool can be re-run safely. Everything happens in one transaction.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::legacy::{DashboardMetric, RevenueSource};
use crate::models::project::{CreateProject, Priority, Project, ProjectStatus, UpdateProject};

/// Demo projects as `(name, progress)`
pub const DEMO_PROJECTS: [(&str, i32); 5] = [
    ("Server Migration", 20),
    ("Sales Tracking", 40),
    ("Customer Database", 60),
    ("Payout Details", 80),
    ("Account Setup", 100),
];

/// Revenue sources as `(source name, value)`
pub const DEMO_REVENUE_SOURCES: [(&str, i32); 3] = [("Direct", 55), ("Social", 30), ("Referral", 15)];

/// Summary of what a seeding run inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub metrics: usize,
    pub revenue_sources: usize,
    pub projects: usize,
}

/// Replaces the dashboard metric and revenue source rows
pub async fn seed_legacy(pool: &PgPool) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let cleared_metrics = DashboardMetric::clear(&mut *tx).await?;
    let cleared_sources = RevenueSource::clear(&mut *tx).await?;
    info!(cleared_metrics, cleared_sources, "Old demo data cleared");

    DashboardMetric::insert(&mut *tx, 40000, 215000, 50, 18).await?;

    for (name, value) in DEMO_REVENUE_SOURCES {
        RevenueSource::insert(&mut *tx, name, value).await?;
    }

    tx.commit().await?;

    info!("Dashboard metrics and revenue sources created");

    Ok(SeedReport {
        metrics: 1,
        revenue_sources: DEMO_REVENUE_SOURCES.len(),
        projects: 0,
    })
}

/// Replaces `owner_id`'s projects with the demo set
///
/// A project at 100% progress is marked COMPLETED.
pub async fn seed_demo_projects(pool: &PgPool, owner_id: Uuid) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let cleared = sqlx::query("DELETE FROM projects WHERE user_id = $1")
        .bind(owner_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    info!(owner_id = %owner_id, cleared, "Old demo projects cleared");

    for (name, progress) in DEMO_PROJECTS {
        let project = Project::create(
            &mut *tx,
            CreateProject {
                user_id: owner_id,
                name: name.to_string(),
                description: None,
                priority: Priority::Medium,
                start_date: None,
                end_date: None,
            },
        )
        .await?;

        Project::update(
            &mut *tx,
            project.id,
            UpdateProject {
                progress: Some(progress),
                status: (progress == 100).then_some(ProjectStatus::Completed),
                ..Default::default()
            },
        )
        .await?;
    }

    tx.commit().await?;

    info!(owner_id = %owner_id, "Demo projects created");

    Ok(SeedReport {
        projects: DEMO_PROJECTS.len(),
        ..Default::default()
    })
}
