//! Churn aggregation: completed/abandoned/never-started split, per-stage
//! churn, and the whole-base activity snapshot.

use std::time::Duration;

use sqlx::PgPool;

use altar_core::activity::ActivitySummary;
use altar_core::funnel::{build_churn_overview, build_stage_churn, ChurnByStage, ChurnOverview};
use altar_core::types::{DateRange, Timestamp};

use crate::identity::{IdentityDirectory, IDENTITY_PAGE_SIZE};
use crate::repositories::onboarding_analytics_repo::{count_sessions, phase_completion_counts};

/// Attempts per identity page before the error propagates.
const PAGE_MAX_ATTEMPTS: u32 = 3;
/// Backoff before the first retry; doubles per attempt.
const PAGE_RETRY_INITIAL: Duration = Duration::from_millis(500);

async fn count_users_in_range(pool: &PgPool, range: &DateRange) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE created_at >= $1 AND created_at <= $2",
    )
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await
}

async fn count_sessions_by_completion(
    pool: &PgPool,
    range: &DateRange,
    completed: bool,
) -> Result<i64, sqlx::Error> {
    let query = if completed {
        "SELECT COUNT(*) FROM onboarding_sessions \
         WHERE completed_at IS NOT NULL AND created_at >= $1 AND created_at <= $2"
    } else {
        "SELECT COUNT(*) FROM onboarding_sessions \
         WHERE completed_at IS NULL AND created_at >= $1 AND created_at <= $2"
    };
    sqlx::query_scalar::<_, i64>(query)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await
}

/// Provides churn overview, by-stage churn, and activity metrics.
pub struct ChurnAnalyticsRepo;

impl ChurnAnalyticsRepo {
    /// Completed / abandoned / never-started split for the range.
    pub async fn overview(pool: &PgPool, range: &DateRange) -> Result<ChurnOverview, sqlx::Error> {
        let (total_users, completed, abandoned) = tokio::try_join!(
            count_users_in_range(pool, range),
            count_sessions_by_completion(pool, range, true),
            count_sessions_by_completion(pool, range, false),
        )?;
        Ok(build_churn_overview(total_users, completed, abandoned))
    }

    /// Stage-by-stage churn across the five onboarding phases.
    pub async fn by_stage(pool: &PgPool, range: &DateRange) -> Result<ChurnByStage, sqlx::Error> {
        let (total_sessions, phase_counts) = tokio::try_join!(
            count_sessions(pool, range),
            phase_completion_counts(pool, range),
        )?;
        Ok(build_stage_churn(total_sessions, phase_counts))
    }

    /// Activity snapshot over the whole user base, classified against
    /// `now` (the request's wall clock, not the dashboard range).
    ///
    /// The identity store serves bounded pages, so this paginates until
    /// a short page; transient page failures are retried with doubling
    /// backoff before the error propagates.
    pub async fn activity_metrics(
        directory: &dyn IdentityDirectory,
        now: Timestamp,
    ) -> Result<ActivitySummary, sqlx::Error> {
        let mut last_sign_ins: Vec<Option<Timestamp>> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let users = fetch_page_with_retry(directory, page).await?;
            if users.is_empty() {
                break;
            }
            let page_len = users.len();
            last_sign_ins.extend(users.into_iter().map(|u| u.last_sign_in_at));

            if page_len < IDENTITY_PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(ActivitySummary::tally(last_sign_ins, now))
    }
}

/// Fetch one identity page, retrying transient failures.
async fn fetch_page_with_retry(
    directory: &dyn IdentityDirectory,
    page: u32,
) -> Result<Vec<crate::identity::IdentityUser>, sqlx::Error> {
    let mut delay = PAGE_RETRY_INITIAL;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match directory.list_users(page, IDENTITY_PAGE_SIZE).await {
            Ok(users) => return Ok(users),
            Err(err) => {
                if attempt >= PAGE_MAX_ATTEMPTS {
                    return Err(err);
                }
                tracing::warn!(
                    page,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Identity page fetch failed, retrying",
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}
