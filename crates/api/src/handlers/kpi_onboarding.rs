//! Handlers for onboarding funnel, timing, and drop-off KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use altar_core::funnel::{DropOffsResult, FunnelStage};
use altar_core::stats::{rate, TimeAnalysis};
use altar_core::types::DateRange;
use altar_db::repositories::OnboardingAnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Started/completed headline numbers derived from the funnel's first
/// and last stages.
#[derive(Debug, Serialize)]
pub struct OnboardingSummary {
    pub started: i64,
    pub completed: i64,
    pub completion_rate: f64,
}

/// Combined onboarding analytics payload.
#[derive(Debug, Serialize)]
pub struct OnboardingOverview {
    pub funnel: Vec<FunnelStage>,
    pub time_analysis: TimeAnalysis,
    pub drop_offs: DropOffsResult,
    pub summary: OnboardingSummary,
}

/// Assemble the onboarding overview; the three aggregations are
/// independent and run concurrently.
pub async fn onboarding_overview(
    pool: &PgPool,
    range: &DateRange,
) -> Result<OnboardingOverview, crate::error::AppError> {
    let (funnel, time_analysis, drop_offs) = tokio::try_join!(
        OnboardingAnalyticsRepo::funnel(pool, range),
        OnboardingAnalyticsRepo::time_analysis(pool, range),
        OnboardingAnalyticsRepo::drop_offs(pool, range),
    )?;

    let started = funnel.first().map_or(0, |stage| stage.count);
    let completed = funnel.last().map_or(0, |stage| stage.count);

    Ok(OnboardingOverview {
        funnel,
        time_analysis,
        drop_offs,
        summary: OnboardingSummary {
            started,
            completed,
            completion_rate: rate(completed, started),
        },
    })
}

/// GET /api/v1/kpi/onboarding
pub async fn get_onboarding(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.resolve(chrono::Utc::now());
    let data = onboarding_overview(&state.pool, &range).await?;
    Ok(Json(DataResponse { data }))
}
