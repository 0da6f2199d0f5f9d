//! Mission entity and status codes.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Status a mission must reach to count as done anywhere in the
/// analytics.
pub const MISSION_STATUS_COMPLETED: &str = "COMPLETED";

/// A row from the `missions` table.
///
/// Time-to-complete is `updated_at - created_at` once the status is
/// COMPLETED; the status row is never updated again after that.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mission {
    pub id: DbId,
    pub wedding_id: DbId,
    /// One of the fixed template ids, see
    /// [`altar_core::funnel::MissionTemplate`].
    pub template_id: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
