//! Handlers for user growth and demographics KPIs.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;

use altar_core::demographics::{GeographyPoint, ProviderPoint};
use altar_core::timeline::{Granularity, GrowthPoint, RegistrationPoint};
use altar_core::types::DateRange;
use altar_db::repositories::UserAnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Combined user analytics payload.
#[derive(Debug, Serialize)]
pub struct UsersOverview {
    pub total_users: i64,
    pub new_users: i64,
    pub countries: i64,
    pub registrations: Vec<RegistrationPoint>,
    pub growth: Vec<GrowthPoint>,
    pub geography: Vec<GeographyPoint>,
    pub by_provider: Vec<ProviderPoint>,
}

/// Assemble the users overview; the five queries are independent and
/// run concurrently.
pub async fn users_overview(
    pool: &PgPool,
    range: &DateRange,
    granularity: Granularity,
) -> Result<UsersOverview, crate::error::AppError> {
    let (total_users, registrations, growth, geography, by_provider) = tokio::try_join!(
        UserAnalyticsRepo::total_users(pool),
        UserAnalyticsRepo::registrations(pool, range, granularity),
        UserAnalyticsRepo::growth(pool, range),
        UserAnalyticsRepo::geography(pool, range),
        UserAnalyticsRepo::by_provider(pool, range),
    )?;

    let new_users = registrations.iter().map(|r| r.count).sum();
    let countries = geography.len() as i64;

    Ok(UsersOverview {
        total_users,
        new_users,
        countries,
        registrations,
        growth,
        geography,
        by_provider,
    })
}

/// GET /api/v1/kpi/users
pub async fn get_users(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.resolve(chrono::Utc::now());
    let data = users_overview(&state.pool, &range, params.granularity()).await?;
    Ok(Json(DataResponse { data }))
}
