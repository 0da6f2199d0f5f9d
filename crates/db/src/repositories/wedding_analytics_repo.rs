//! Wedding overview and engagement aggregation.

use serde::Serialize;
use sqlx::PgPool;

use altar_core::stats::{rate, round2};
use altar_core::types::DateRange;

use crate::models::engagement::{VENDOR_STATUS_CONTACTED, VENDOR_STATUS_HIRED, VENDOR_STATUS_SAVED};

/// Wedding population split for a date range.
#[derive(Debug, Clone, Serialize)]
pub struct WeddingOverview {
    pub total_weddings: i64,
    pub active_weddings: i64,
    pub archived_weddings: i64,
    pub with_partner: i64,
    pub solo_planning: i64,
    pub partner_join_rate: f64,
    pub with_date_set: i64,
    pub without_date: i64,
    pub date_set_rate: f64,
}

/// Checklist task metrics.
#[derive(Debug, Clone, Serialize)]
pub struct TaskMetrics {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub task_completion_rate: f64,
}

/// Vendor pipeline metrics.
#[derive(Debug, Clone, Serialize)]
pub struct VendorMetrics {
    pub total_vendors: i64,
    pub saved_vendors: i64,
    pub contacted_vendors: i64,
    pub hired_vendors: i64,
    pub conversion_rate: f64,
}

/// Engagement metrics across tasks and vendors.
#[derive(Debug, Clone, Serialize)]
pub struct WeddingEngagement {
    pub tasks: TaskMetrics,
    pub vendors: VendorMetrics,
    pub avg_tasks_per_wedding: f64,
    pub avg_vendors_per_wedding: f64,
}

async fn count_weddings(pool: &PgPool, range: &DateRange, extra: &str) -> Result<i64, sqlx::Error> {
    let query = format!(
        "SELECT COUNT(*) FROM weddings \
         WHERE created_at >= $1 AND created_at <= $2{extra}"
    );
    sqlx::query_scalar::<_, i64>(&query)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await
}

async fn count_vendors(
    pool: &PgPool,
    range: &DateRange,
    status: Option<&str>,
) -> Result<i64, sqlx::Error> {
    match status {
        Some(status) => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM wedding_vendors \
                 WHERE deleted_at IS NULL AND status = $3 \
                   AND created_at >= $1 AND created_at <= $2",
            )
            .bind(range.start)
            .bind(range.end)
            .bind(status)
            .fetch_one(pool)
            .await
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM wedding_vendors \
                 WHERE deleted_at IS NULL \
                   AND created_at >= $1 AND created_at <= $2",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await
        }
    }
}

/// Provides wedding overview and engagement aggregation.
pub struct WeddingAnalyticsRepo;

impl WeddingAnalyticsRepo {
    /// Population split of weddings created in range.
    pub async fn overview(pool: &PgPool, range: &DateRange) -> Result<WeddingOverview, sqlx::Error> {
        let (total, active, with_partner, with_date) = tokio::try_join!(
            count_weddings(pool, range, ""),
            count_weddings(pool, range, " AND archived = FALSE"),
            count_weddings(pool, range, " AND partner_user_id IS NOT NULL"),
            count_weddings(pool, range, " AND wedding_date IS NOT NULL"),
        )?;

        Ok(WeddingOverview {
            total_weddings: total,
            active_weddings: active,
            archived_weddings: total - active,
            with_partner,
            solo_planning: total - with_partner,
            partner_join_rate: rate(with_partner, total),
            with_date_set: with_date,
            without_date: total - with_date,
            date_set_rate: rate(with_date, total),
        })
    }

    /// Task and vendor engagement for records created in range.
    pub async fn engagement(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<WeddingEngagement, sqlx::Error> {
        let (weddings, total_tasks, completed_tasks) = tokio::try_join!(
            count_weddings(pool, range, ""),
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM tasks WHERE created_at >= $1 AND created_at <= $2",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool),
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM tasks \
                 WHERE completed = TRUE AND created_at >= $1 AND created_at <= $2",
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool),
        )?;

        let (total_vendors, saved, contacted, hired) = tokio::try_join!(
            count_vendors(pool, range, None),
            count_vendors(pool, range, Some(VENDOR_STATUS_SAVED)),
            count_vendors(pool, range, Some(VENDOR_STATUS_CONTACTED)),
            count_vendors(pool, range, Some(VENDOR_STATUS_HIRED)),
        )?;

        Ok(WeddingEngagement {
            tasks: TaskMetrics {
                total_tasks,
                completed_tasks,
                task_completion_rate: rate(completed_tasks, total_tasks),
            },
            vendors: VendorMetrics {
                total_vendors,
                saved_vendors: saved,
                contacted_vendors: contacted,
                hired_vendors: hired,
                conversion_rate: rate(hired, total_vendors),
            },
            avg_tasks_per_wedding: if weddings > 0 {
                round2(total_tasks as f64 / weddings as f64)
            } else {
                0.0
            },
            avg_vendors_per_wedding: if weddings > 0 {
                round2(total_vendors as f64 / weddings as f64)
            } else {
                0.0
            },
        })
    }
}
