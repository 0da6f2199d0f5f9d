//! KPI request handlers.
//!
//! Each submodule owns one dashboard domain: its response DTOs, an
//! `*_overview` assembly function the combined dashboard reuses, and the
//! thin axum handler. Handlers delegate queries to the repositories in
//! `altar_db` and map errors via [`crate::error::AppError`].

pub mod kpi_churn;
pub mod kpi_dashboard;
pub mod kpi_definitions;
pub mod kpi_entry_points;
pub mod kpi_journey;
pub mod kpi_onboarding;
pub mod kpi_users;
pub mod kpi_weddings;
