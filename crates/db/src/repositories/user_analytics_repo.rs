//! User growth and demographics aggregation.

use sqlx::PgPool;

use altar_core::demographics::{tally_geography, tally_providers, GeographyPoint, ProviderPoint};
use altar_core::timeline::{build_growth, build_registrations, Granularity, GrowthPoint, RegistrationPoint};
use altar_core::types::{DateRange, Timestamp};

/// Provides registration, growth, geography, and provider aggregation.
pub struct UserAnalyticsRepo;

impl UserAnalyticsRepo {
    /// All registered users, all time.
    pub async fn total_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Registrations in range bucketed at the requested granularity.
    pub async fn registrations(
        pool: &PgPool,
        range: &DateRange,
        granularity: Granularity,
    ) -> Result<Vec<RegistrationPoint>, sqlx::Error> {
        let created = sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM users WHERE created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        Ok(build_registrations(&created, granularity))
    }

    /// Cumulative daily growth across the range, with users registered
    /// before the range start as the baseline.
    pub async fn growth(pool: &PgPool, range: &DateRange) -> Result<Vec<GrowthPoint>, sqlx::Error> {
        let created = sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM users WHERE created_at <= $1 ORDER BY created_at",
        )
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        Ok(build_growth(&created, range))
    }

    /// Registration share per country, largest first. Users without a
    /// recorded country are not represented.
    pub async fn geography(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<GeographyPoint>, sqlx::Error> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT country_code FROM users \
             WHERE country_code IS NOT NULL \
               AND created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        Ok(tally_geography(&codes))
    }

    /// Registration share per auth provider; rows with no provider
    /// count as email sign-ups.
    pub async fn by_provider(
        pool: &PgPool,
        range: &DateRange,
    ) -> Result<Vec<ProviderPoint>, sqlx::Error> {
        let providers = sqlx::query_scalar::<_, Option<String>>(
            "SELECT provider FROM users WHERE created_at >= $1 AND created_at <= $2",
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await?;

        Ok(tally_providers(&providers))
    }
}
