//! Analytics repositories.
//!
//! One repository per business domain, each a zero-sized struct whose
//! async methods take `&PgPool` as the first argument. Repositories
//! issue the filtered COUNT/SELECT queries and delegate every piece of
//! arithmetic to `altar_core`, so each method is a pure function of
//! (date range, record store contents).

pub mod churn_analytics_repo;
pub mod entry_points_repo;
pub mod journey_analytics_repo;
pub mod onboarding_analytics_repo;
pub mod user_analytics_repo;
pub mod wedding_analytics_repo;

pub use churn_analytics_repo::ChurnAnalyticsRepo;
pub use entry_points_repo::EntryPointsRepo;
pub use journey_analytics_repo::JourneyAnalyticsRepo;
pub use onboarding_analytics_repo::OnboardingAnalyticsRepo;
pub use user_analytics_repo::UserAnalyticsRepo;
pub use wedding_analytics_repo::WeddingAnalyticsRepo;
