//! Onboarding session entity.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `onboarding_sessions` table, one per wedding.
///
/// `completed_phases` accumulates phase codes as the couple progresses;
/// `completed_at` stays null while the session is in progress or
/// abandoned. The funnel math assumes phases complete in their fixed
/// order (the writers enforce that, not this subsystem).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub id: DbId,
    pub wedding_id: DbId,
    pub completed_phases: Vec<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
