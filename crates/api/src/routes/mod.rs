pub mod health;
pub mod kpi;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /kpi/definitions                     full KPI catalog
/// /kpi/definitions/{category}          KPIs of one category
/// /kpi/definitions/{category}/{slug}   single KPI definition
///
/// /kpi/users                           user growth & demographics
/// /kpi/onboarding                      funnel, timing, drop-offs
/// /kpi/weddings                        overview & engagement
/// /kpi/churn                           churn split & activity snapshot
/// /kpi/journey                         cohort funnel, milestones, timeline
/// /kpi/dashboard                       all five domains, merged
///
/// /kpi/entry-points                    vendor booking analysis
/// /kpi/entry-points/combination        custom all-of combination count
/// ```
///
/// Every route requires a Bearer JWT via the `AuthUser` extractor.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/kpi", kpi::router())
}
