//! Wedding entity.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `weddings` table -- one planning workspace per couple.
///
/// A non-null `partner_user_id` signals the second partner joined;
/// `wedding_date` stays null until the couple picks a date.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wedding {
    pub id: DbId,
    pub primary_user_id: DbId,
    pub partner_user_id: Option<DbId>,
    pub wedding_date: Option<chrono::NaiveDate>,
    pub archived: bool,
    pub created_at: Timestamp,
}
