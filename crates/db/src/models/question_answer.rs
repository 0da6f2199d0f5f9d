//! Onboarding question answer entity.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `question_answers` table.
///
/// An answer can select multiple response codes. Rows with a non-null
/// `deleted_at` are soft-deleted and must be excluded from every
/// aggregation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionAnswer {
    pub id: DbId,
    pub wedding_id: DbId,
    pub question_id: String,
    /// Onboarding phase code this question belongs to.
    pub phase: String,
    pub selected_responses: Vec<String>,
    pub answered_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
