//! User activity recency classification.
//!
//! Activity is a point-in-time snapshot against the wall clock of the
//! request, not a date-range aggregate: the scan covers the entire user
//! base regardless of the dashboard's selected window.

use chrono::Duration;
use serde::Serialize;

use crate::stats::rate;
use crate::types::Timestamp;

/// Signed in within this many days counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;
/// Signed in within this many days (but outside the active window)
/// counts as inactive; beyond it, dormant.
pub const INACTIVE_WINDOW_DAYS: i64 = 30;

/// Recency bucket for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityBucket {
    Active,
    Inactive,
    Dormant,
    NeverSignedIn,
}

/// Classify a user by their last sign-in relative to `now`.
///
/// Exactly 7 days ago is still active and exactly 30 days ago still
/// inactive (both windows are closed at the old end).
pub fn classify_last_sign_in(last_sign_in: Option<Timestamp>, now: Timestamp) -> ActivityBucket {
    let Some(last) = last_sign_in else {
        return ActivityBucket::NeverSignedIn;
    };
    if last >= now - Duration::days(ACTIVE_WINDOW_DAYS) {
        ActivityBucket::Active
    } else if last >= now - Duration::days(INACTIVE_WINDOW_DAYS) {
        ActivityBucket::Inactive
    } else {
        ActivityBucket::Dormant
    }
}

/// Activity counts over the full user base.
#[derive(Debug, Clone, Serialize)]
pub struct ActivitySummary {
    pub total_users: i64,
    pub active_users: i64,
    pub inactive_users: i64,
    pub dormant_users: i64,
    pub never_signed_in: i64,
    pub active_rate: f64,
    pub dormant_rate: f64,
}

impl ActivitySummary {
    /// Tally every user's last sign-in into recency buckets.
    pub fn tally(last_sign_ins: impl IntoIterator<Item = Option<Timestamp>>, now: Timestamp) -> Self {
        let mut active = 0i64;
        let mut inactive = 0i64;
        let mut dormant = 0i64;
        let mut never = 0i64;

        for last in last_sign_ins {
            match classify_last_sign_in(last, now) {
                ActivityBucket::Active => active += 1,
                ActivityBucket::Inactive => inactive += 1,
                ActivityBucket::Dormant => dormant += 1,
                ActivityBucket::NeverSignedIn => never += 1,
            }
        }

        let total = active + inactive + dormant + never;
        Self {
            total_users: total,
            active_users: active,
            inactive_users: inactive,
            dormant_users: dormant,
            never_signed_in: never,
            active_rate: rate(active, total),
            dormant_rate: rate(dormant, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn classify_buckets() {
        let n = now();
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(1)), n),
            ActivityBucket::Active
        );
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(14)), n),
            ActivityBucket::Inactive
        );
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(90)), n),
            ActivityBucket::Dormant
        );
        assert_eq!(classify_last_sign_in(None, n), ActivityBucket::NeverSignedIn);
    }

    #[test]
    fn classify_window_boundaries() {
        let n = now();
        // Exactly 7 days ago: active. One second older: inactive.
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(7)), n),
            ActivityBucket::Active
        );
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(7) - Duration::seconds(1)), n),
            ActivityBucket::Inactive
        );
        // Exactly 30 days ago: inactive. One second older: dormant.
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(30)), n),
            ActivityBucket::Inactive
        );
        assert_eq!(
            classify_last_sign_in(Some(n - Duration::days(30) - Duration::seconds(1)), n),
            ActivityBucket::Dormant
        );
    }

    #[test]
    fn tally_counts_and_rates() {
        let n = now();
        let users = vec![
            Some(n - Duration::days(1)),
            Some(n - Duration::days(2)),
            Some(n - Duration::days(10)),
            Some(n - Duration::days(60)),
            None,
        ];
        let summary = ActivitySummary::tally(users, n);
        assert_eq!(summary.total_users, 5);
        assert_eq!(summary.active_users, 2);
        assert_eq!(summary.inactive_users, 1);
        assert_eq!(summary.dormant_users, 1);
        assert_eq!(summary.never_signed_in, 1);
        assert_eq!(summary.active_rate, 40.0);
        assert_eq!(summary.dormant_rate, 20.0);
    }

    #[test]
    fn tally_empty_is_zero() {
        let summary = ActivitySummary::tally(Vec::new(), now());
        assert_eq!(summary.total_users, 0);
        assert_eq!(summary.active_rate, 0.0);
        assert_eq!(summary.dormant_rate, 0.0);
    }
}
