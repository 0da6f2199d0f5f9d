//! Route definitions for the KPI dashboard endpoints.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::{
    kpi_churn, kpi_dashboard, kpi_definitions, kpi_entry_points, kpi_journey, kpi_onboarding,
    kpi_users, kpi_weddings,
};
use crate::state::AppState;

/// KPI routes mounted at `/kpi`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/definitions", get(kpi_definitions::list_definitions))
        .route(
            "/definitions/{category}",
            get(kpi_definitions::list_by_category),
        )
        .route(
            "/definitions/{category}/{slug}",
            get(kpi_definitions::get_definition),
        )
        .route("/users", get(kpi_users::get_users))
        .route("/onboarding", get(kpi_onboarding::get_onboarding))
        .route("/weddings", get(kpi_weddings::get_weddings))
        .route("/churn", get(kpi_churn::get_churn))
        .route("/journey", get(kpi_journey::get_journey))
        .route("/dashboard", get(kpi_dashboard::get_dashboard))
        .route("/entry-points", get(kpi_entry_points::get_entry_points))
        .route(
            "/entry-points/combination",
            get(kpi_entry_points::get_custom_combination),
        )
}
