//! Registered user entity.

use altar_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table. Created at registration by the product
/// flows; this subsystem only ever reads it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    /// ISO 3166-1 alpha-2 code when known.
    pub country_code: Option<String>,
    /// Sign-up provider code; absent means email.
    pub provider: Option<String>,
    pub last_sign_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
