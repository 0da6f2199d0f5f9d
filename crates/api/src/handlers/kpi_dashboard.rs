//! Handler for the combined KPI dashboard.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use altar_core::types::Timestamp;

use crate::error::AppResult;
use crate::handlers::kpi_churn::{churn_report, ChurnReport};
use crate::handlers::kpi_journey::{journey_overview, JourneyOverview};
use crate::handlers::kpi_onboarding::{onboarding_overview, OnboardingOverview};
use crate::handlers::kpi_users::{users_overview, UsersOverview};
use crate::handlers::kpi_weddings::{weddings_overview, WeddingsOverview};
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// The resolved window, echoed so the frontend can label the data.
#[derive(Debug, Serialize)]
pub struct DateRangeEcho {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

/// Every domain overview merged into one response.
#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub users: UsersOverview,
    pub onboarding: OnboardingOverview,
    pub weddings: WeddingsOverview,
    pub churn: ChurnReport,
    pub journey: JourneyOverview,
    pub date_range: DateRangeEcho,
}

/// GET /api/v1/kpi/dashboard
///
/// Fans out to the five domain overviews concurrently and merges the
/// results -- the branches share no state and have no ordering
/// dependency, so a failure in any one fails the whole request with no
/// partial payload.
pub async fn get_dashboard(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let now = chrono::Utc::now();
    let range = params.resolve(now);
    let granularity = params.granularity();

    let (users, onboarding, weddings, churn, journey) = tokio::try_join!(
        users_overview(&state.pool, &range, granularity),
        onboarding_overview(&state.pool, &range),
        weddings_overview(&state.pool, &range),
        churn_report(&state.pool, state.identity.as_ref(), &range, now),
        journey_overview(&state.pool, &range),
    )?;

    let data = DashboardOverview {
        users,
        onboarding,
        weddings,
        churn,
        journey,
        date_range: DateRangeEcho {
            start_date: range.start,
            end_date: range.end,
        },
    };
    Ok(Json(DataResponse { data }))
}
