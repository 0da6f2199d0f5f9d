//! Task and vendor engagement entities.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Vendor pipeline statuses, in funnel order.
pub const VENDOR_STATUS_SAVED: &str = "SAVED";
pub const VENDOR_STATUS_CONTACTED: &str = "CONTACTED";
pub const VENDOR_STATUS_HIRED: &str = "HIRED";

/// A row from the `tasks` table -- a checklist item on a wedding.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub wedding_id: DbId,
    pub title: String,
    pub completed: bool,
    pub created_at: Timestamp,
}

/// A row from the `wedding_vendors` table -- a vendor a couple saved,
/// contacted, or hired. Soft-deleted rows are excluded from all counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeddingVendor {
    pub id: DbId,
    pub wedding_id: DbId,
    pub vendor_name: String,
    pub status: String,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}
