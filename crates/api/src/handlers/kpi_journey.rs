//! Handlers for customer-journey KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use altar_core::funnel::{JourneyFunnel, JourneyMilestones};
use altar_core::timeline::JourneyTimeline;
use altar_core::types::DateRange;
use altar_db::repositories::JourneyAnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Combined journey analytics payload.
#[derive(Debug, Serialize)]
pub struct JourneyOverview {
    pub funnel: JourneyFunnel,
    pub milestones: JourneyMilestones,
    pub timeline: JourneyTimeline,
}

/// Assemble the journey overview. The funnel's cohort-narrowing steps
/// are sequential internally, but funnel, milestones, and timeline are
/// independent of each other and run concurrently.
pub async fn journey_overview(
    pool: &PgPool,
    range: &DateRange,
) -> Result<JourneyOverview, crate::error::AppError> {
    let (funnel, milestones, timeline) = tokio::try_join!(
        JourneyAnalyticsRepo::funnel(pool, range),
        JourneyAnalyticsRepo::milestones(pool, range),
        JourneyAnalyticsRepo::timeline(pool, range),
    )?;

    Ok(JourneyOverview {
        funnel,
        milestones,
        timeline,
    })
}

/// GET /api/v1/kpi/journey
pub async fn get_journey(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.resolve(chrono::Utc::now());
    let data = journey_overview(&state.pool, &range).await?;
    Ok(Json(DataResponse { data }))
}
