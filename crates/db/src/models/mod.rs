//! Entity models for the analytics tables.
//!
//! Each submodule holds a `FromRow` struct matching the database row.
//! The aggregation repositories mostly select narrow projections, so the
//! full entities exist primarily for clarity of the schema and for the
//! few places that return whole rows.

pub mod engagement;
pub mod mission;
pub mod onboarding_session;
pub mod question_answer;
pub mod user;
pub mod wedding;
