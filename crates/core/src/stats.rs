//! Shared KPI arithmetic: two-decimal rounding, rate calculation, and
//! nearest-rank duration statistics.
//!
//! Every percentage on the dashboard goes through [`rate`], and every
//! duration panel through [`DurationSummary`], so the tie-break rules
//! live in exactly one place.

use serde::Serialize;

use crate::phases::OnboardingPhase;
use crate::types::Timestamp;

/// Seconds per day, used for mission day-count arithmetic.
pub const SECS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

/// Round to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage rounded to two decimals.
///
/// A non-positive `whole` yields 0.0 -- division by zero is defined as
/// rate 0 everywhere in this subsystem, never NaN or infinity.
pub fn rate(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Whole days between two timestamps, rounded up.
///
/// A mission completed 25 hours after creation counts as 2 days.
pub fn days_to_complete(created_at: Timestamp, updated_at: Timestamp) -> i64 {
    let secs = (updated_at - created_at).num_seconds();
    // Equivalent to `secs.div_ceil(SECS_PER_DAY)`; signed `div_ceil` is still
    // an unstable library feature (`int_roundings`) on stable Rust. Durations
    // here are non-negative, where this idiom matches `div_ceil` exactly.
    (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
}

// ---------------------------------------------------------------------------
// Duration statistics
// ---------------------------------------------------------------------------

/// Mean / median / p90 over a sample of durations in seconds.
///
/// Median and p90 are nearest-rank (index-based), not interpolated:
/// median is the element at `floor(n / 2)` of the ascending sort (the
/// upper-middle for even `n`), p90 the element at `floor(n * 0.9)`
/// clamped to the last index. Historical dashboards were built on these
/// exact tie-breaks, so they must not be "improved".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationSummary {
    pub avg_duration: i64,
    pub median_duration: i64,
    pub p90_duration: i64,
    pub sample_size: i64,
}

impl DurationSummary {
    /// The all-zero summary reported for an empty sample.
    pub fn zero() -> Self {
        Self {
            avg_duration: 0,
            median_duration: 0,
            p90_duration: 0,
            sample_size: 0,
        }
    }

    /// Summarize a sample of durations in seconds.
    ///
    /// Non-positive durations are data artifacts (clock skew, imports)
    /// and are discarded before any statistic is computed.
    pub fn from_secs(durations: &[i64]) -> Self {
        let mut valid: Vec<i64> = durations.iter().copied().filter(|d| *d > 0).collect();
        if valid.is_empty() {
            return Self::zero();
        }
        valid.sort_unstable();

        let n = valid.len();
        let sum: i64 = valid.iter().sum();
        let avg = (sum as f64 / n as f64).round() as i64;
        let median = valid[n / 2];
        let p90_index = ((n as f64) * 0.9).floor() as usize;
        let p90 = valid[p90_index.min(n - 1)];

        Self {
            avg_duration: avg,
            median_duration: median,
            p90_duration: p90,
            sample_size: n as i64,
        }
    }
}

/// Duration statistics for a single onboarding phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseTimeAnalysis {
    pub phase: &'static str,
    pub phase_name: &'static str,
    pub avg_duration: i64,
    pub median_duration: i64,
    pub p90_duration: i64,
    pub sample_size: i64,
}

impl PhaseTimeAnalysis {
    pub fn from_summary(phase: OnboardingPhase, summary: DurationSummary) -> Self {
        Self {
            phase: phase.code(),
            phase_name: phase.display_name(),
            avg_duration: summary.avg_duration,
            median_duration: summary.median_duration,
            p90_duration: summary.p90_duration,
            sample_size: summary.sample_size,
        }
    }
}

/// Overall onboarding completion-time statistics plus the per-phase
/// breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct TimeAnalysis {
    pub avg_duration: i64,
    pub median_duration: i64,
    pub p90_duration: i64,
    pub unit: &'static str,
    pub sample_size: i64,
    pub by_phase: Vec<PhaseTimeAnalysis>,
}

impl TimeAnalysis {
    pub fn new(overall: DurationSummary, by_phase: Vec<PhaseTimeAnalysis>) -> Self {
        Self {
            avg_duration: overall.avg_duration,
            median_duration: overall.median_duration,
            p90_duration: overall.p90_duration,
            unit: "seconds",
            sample_size: overall.sample_size,
            by_phase,
        }
    }

    /// The well-formed zero result for a range with no completed sessions.
    pub fn zero() -> Self {
        Self::new(DurationSummary::zero(), Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // -- round2 / rate --

    #[test]
    fn round2_two_decimals() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn rate_basic() {
        assert_eq!(rate(40, 100), 40.0);
        assert_eq!(rate(1, 3), 33.33);
        assert_eq!(rate(2, 3), 66.67);
    }

    #[test]
    fn rate_zero_whole_is_zero() {
        assert_eq!(rate(5, 0), 0.0);
        assert_eq!(rate(0, 0), 0.0);
    }

    #[test]
    fn rate_is_bounded() {
        for part in 0..=50 {
            for whole in 1..=50 {
                if part <= whole {
                    let r = rate(part, whole);
                    assert!((0.0..=100.0).contains(&r), "rate({part},{whole}) = {r}");
                }
            }
        }
    }

    // -- days_to_complete --

    #[test]
    fn days_round_up() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let one_hour = Utc.with_ymd_and_hms(2025, 1, 1, 1, 0, 0).unwrap();
        let one_day = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let day_and_hour = Utc.with_ymd_and_hms(2025, 1, 2, 1, 0, 0).unwrap();

        assert_eq!(days_to_complete(created, one_hour), 1);
        assert_eq!(days_to_complete(created, one_day), 1);
        assert_eq!(days_to_complete(created, day_and_hour), 2);
    }

    // -- DurationSummary --

    #[test]
    fn summary_of_five_durations() {
        // durations [10,20,30,40,50]: mean 30, median at index 2 = 30,
        // p90 at index floor(5*0.9)=4 = 50.
        let s = DurationSummary::from_secs(&[10, 20, 30, 40, 50]);
        assert_eq!(s.avg_duration, 30);
        assert_eq!(s.median_duration, 30);
        assert_eq!(s.p90_duration, 50);
        assert_eq!(s.sample_size, 5);
    }

    #[test]
    fn summary_even_length_takes_upper_middle() {
        // [10,20,30,40]: median index floor(4/2)=2 -> 30, not 25.
        let s = DurationSummary::from_secs(&[40, 10, 30, 20]);
        assert_eq!(s.median_duration, 30);
    }

    #[test]
    fn summary_p90_clamped_to_last_index() {
        let s = DurationSummary::from_secs(&[7]);
        assert_eq!(s.p90_duration, 7);
        assert_eq!(s.median_duration, 7);
        assert_eq!(s.sample_size, 1);
    }

    #[test]
    fn summary_discards_non_positive() {
        let s = DurationSummary::from_secs(&[-5, 0, 10, 20]);
        assert_eq!(s.sample_size, 2);
        assert_eq!(s.avg_duration, 15);
    }

    #[test]
    fn summary_empty_is_zero() {
        let s = DurationSummary::from_secs(&[]);
        assert_eq!(s, DurationSummary::zero());
        let s = DurationSummary::from_secs(&[-1, 0]);
        assert_eq!(s, DurationSummary::zero());
    }

    #[test]
    fn summary_mean_rounds_to_nearest() {
        // mean of [1, 2] = 1.5 -> rounds to 2
        let s = DurationSummary::from_secs(&[1, 2]);
        assert_eq!(s.avg_duration, 2);
    }
}
