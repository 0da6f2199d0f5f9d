//! Handlers for wedding overview and engagement KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use altar_core::types::DateRange;
use altar_db::repositories::wedding_analytics_repo::{WeddingEngagement, WeddingOverview};
use altar_db::repositories::WeddingAnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Combined wedding analytics payload.
#[derive(Debug, Serialize)]
pub struct WeddingsOverview {
    pub overview: WeddingOverview,
    pub engagement: WeddingEngagement,
}

/// Assemble the weddings overview; the two aggregations run
/// concurrently.
pub async fn weddings_overview(
    pool: &PgPool,
    range: &DateRange,
) -> Result<WeddingsOverview, crate::error::AppError> {
    let (overview, engagement) = tokio::try_join!(
        WeddingAnalyticsRepo::overview(pool, range),
        WeddingAnalyticsRepo::engagement(pool, range),
    )?;

    Ok(WeddingsOverview {
        overview,
        engagement,
    })
}

/// GET /api/v1/kpi/weddings
pub async fn get_weddings(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.resolve(chrono::Utc::now());
    let data = weddings_overview(&state.pool, &range).await?;
    Ok(Json(DataResponse { data }))
}
