//! Handlers for churn and activity KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use altar_core::activity::ActivitySummary;
use altar_core::funnel::{ChurnByStage, ChurnOverview};
use altar_core::types::{DateRange, Timestamp};
use altar_db::identity::IdentityDirectory;
use altar_db::repositories::ChurnAnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Combined churn analytics payload.
#[derive(Debug, Serialize)]
pub struct ChurnReport {
    pub overview: ChurnOverview,
    pub by_stage: ChurnByStage,
    pub activity: ActivitySummary,
}

/// Assemble the churn report. The two range aggregations and the
/// whole-base activity scan are independent and run concurrently; the
/// activity snapshot classifies against `now`, not the range.
pub async fn churn_report(
    pool: &PgPool,
    identity: &dyn IdentityDirectory,
    range: &DateRange,
    now: Timestamp,
) -> Result<ChurnReport, crate::error::AppError> {
    let (overview, by_stage, activity) = tokio::try_join!(
        ChurnAnalyticsRepo::overview(pool, range),
        ChurnAnalyticsRepo::by_stage(pool, range),
        ChurnAnalyticsRepo::activity_metrics(identity, now),
    )?;

    Ok(ChurnReport {
        overview,
        by_stage,
        activity,
    })
}

/// GET /api/v1/kpi/churn
pub async fn get_churn(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now();
    let range = params.resolve(now);
    let data = churn_report(&state.pool, state.identity.as_ref(), &range, now).await?;
    Ok(Json(DataResponse { data }))
}
