//! Identity directory abstraction for the activity snapshot.
//!
//! The activity metrics (active / inactive / dormant / never signed in)
//! scan the *entire* user base, and the backing identity store only
//! serves bounded pages. The trait keeps the churn repository testable
//! and leaves room for a hosted identity provider behind the same
//! boundary.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use altar_core::types::{DbId, Timestamp};

/// Page size used when scanning the full user base.
pub const IDENTITY_PAGE_SIZE: u32 = 100;

/// The slice of a user the activity snapshot needs.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityUser {
    pub id: DbId,
    pub last_sign_in_at: Option<Timestamp>,
}

/// Paginated read access to every user and their last sign-in.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Fetch one page (1-based). A page shorter than `per_page` is the
    /// last one; an empty page means the scan is already past the end.
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<IdentityUser>, sqlx::Error>;
}

/// Directory backed by the local `users` table.
#[derive(Debug, Clone)]
pub struct PgIdentityDirectory {
    pool: PgPool,
}

impl PgIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn list_users(&self, page: u32, per_page: u32) -> Result<Vec<IdentityUser>, sqlx::Error> {
        let offset = (page.saturating_sub(1) as i64) * per_page as i64;
        sqlx::query_as::<_, IdentityUser>(
            "SELECT id, last_sign_in_at FROM users ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }
}
