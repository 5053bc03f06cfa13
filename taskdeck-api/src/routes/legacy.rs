/// Public demo data behind the original landing dashboard
///
/// - `GET /api/metrics` - First metric row, or `null`
/// - `GET /api/revenue-sources` - Revenue sources, largest first

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskdeck_shared::models::legacy::{DashboardMetric, RevenueSource};

pub async fn metrics(State(state): State<AppState>) -> ApiResult<Json<Option<DashboardMetric>>> {
    let metric = DashboardMetric::first(&state.db).await?;

    Ok(Json(metric))
}

pub async fn revenue_sources(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RevenueSource>>> {
    let sources = RevenueSource::list(&state.db).await?;

    Ok(Json(sources))
}
