//! Time-series construction: registration buckets, cumulative growth,
//! and the customer-journey daily timeline.
//!
//! All bucket keys are UTC calendar dates formatted `YYYY-MM-DD` (week
//! and month buckets use the date of the period's first day). Series are
//! sparse: dates with no events simply do not appear.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::stats::round2;
use crate::types::{DateRange, Timestamp};

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// Bucket size for the registrations series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

/// Bucket key for a timestamp at the given granularity.
///
/// Weeks start on Monday; months are keyed by their first day.
pub fn bucket_key(ts: Timestamp, granularity: Granularity) -> String {
    let date = ts.date_naive();
    match granularity {
        Granularity::Day => date.to_string(),
        Granularity::Week => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            monday.to_string()
        }
        Granularity::Month => format!("{:04}-{:02}-01", date.year(), date.month()),
    }
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// One bucket of the registrations series.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPoint {
    pub date: String,
    pub count: i64,
}

/// Bucket registration timestamps at the given granularity, sorted by key.
pub fn build_registrations(created: &[Timestamp], granularity: Granularity) -> Vec<RegistrationPoint> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for ts in created {
        *buckets.entry(bucket_key(*ts, granularity)).or_insert(0) += 1;
    }
    buckets
        .into_iter()
        .map(|(date, count)| RegistrationPoint { date, count })
        .collect()
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// One day of the cumulative user-growth series.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthPoint {
    pub date: String,
    pub total_users: i64,
    pub new_users: i64,
    pub growth_rate: f64,
}

/// Build the cumulative growth series for the range.
///
/// `created` holds the creation timestamps of every user up to the range
/// end; users before the range start form the baseline. The growth rate
/// of a day is its new users over the previous cumulative total (100
/// when growing from zero).
pub fn build_growth(created: &[Timestamp], range: &DateRange) -> Vec<GrowthPoint> {
    let baseline = created.iter().filter(|ts| **ts < range.start).count() as i64;

    let mut daily: BTreeMap<String, i64> = BTreeMap::new();
    for ts in created.iter().filter(|ts| range.contains(**ts)) {
        *daily.entry(bucket_key(*ts, Granularity::Day)).or_insert(0) += 1;
    }

    let mut cumulative = baseline;
    let mut series = Vec::with_capacity(daily.len());

    for (date, new_users) in daily {
        let previous = cumulative;
        cumulative += new_users;

        let growth_rate = if previous > 0 {
            round2(new_users as f64 / previous as f64 * 100.0)
        } else if new_users > 0 {
            100.0
        } else {
            0.0
        };

        series.push(GrowthPoint {
            date,
            total_users: cumulative,
            new_users,
            growth_rate,
        });
    }

    series
}

// ---------------------------------------------------------------------------
// Journey timeline
// ---------------------------------------------------------------------------

/// One calendar day of the journey timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub date: String,
    pub registrations: i64,
    pub weddings_created: i64,
    pub onboarding_completed: i64,
    pub tutorial_completed: i64,
}

/// Totals of each event stream over the range.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineTotals {
    pub registrations: i64,
    pub weddings_created: i64,
    pub onboarding_completed: i64,
    pub tutorial_completed: i64,
}

/// The merged daily journey timeline.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyTimeline {
    pub data: Vec<TimelinePoint>,
    pub totals: TimelineTotals,
}

/// Merge the four independent event streams into one sparse row per day.
pub fn build_timeline(
    registrations: &[Timestamp],
    weddings_created: &[Timestamp],
    onboarding_completed: &[Timestamp],
    tutorial_completed: &[Timestamp],
) -> JourneyTimeline {
    let mut days: BTreeMap<String, TimelinePoint> = BTreeMap::new();

    let mut add = |ts: &Timestamp, pick: fn(&mut TimelinePoint) -> &mut i64| {
        let date = bucket_key(*ts, Granularity::Day);
        let point = days.entry(date.clone()).or_insert_with(|| TimelinePoint {
            date,
            registrations: 0,
            weddings_created: 0,
            onboarding_completed: 0,
            tutorial_completed: 0,
        });
        *pick(point) += 1;
    };

    for ts in registrations {
        add(ts, |p| &mut p.registrations);
    }
    for ts in weddings_created {
        add(ts, |p| &mut p.weddings_created);
    }
    for ts in onboarding_completed {
        add(ts, |p| &mut p.onboarding_completed);
    }
    for ts in tutorial_completed {
        add(ts, |p| &mut p.tutorial_completed);
    }

    JourneyTimeline {
        data: days.into_values().collect(),
        totals: TimelineTotals {
            registrations: registrations.len() as i64,
            weddings_created: weddings_created.len() as i64,
            onboarding_completed: onboarding_completed.len() as i64,
            tutorial_completed: tutorial_completed.len() as i64,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // -- bucket_key --

    #[test]
    fn day_bucket_is_utc_date() {
        assert_eq!(bucket_key(ts(2025, 3, 5, 23), Granularity::Day), "2025-03-05");
    }

    #[test]
    fn week_bucket_starts_monday() {
        // 2025-03-05 is a Wednesday; its week starts Monday 2025-03-03.
        assert_eq!(bucket_key(ts(2025, 3, 5, 9), Granularity::Week), "2025-03-03");
        // A Monday maps to itself, a Sunday to the previous Monday.
        assert_eq!(bucket_key(ts(2025, 3, 3, 0), Granularity::Week), "2025-03-03");
        assert_eq!(bucket_key(ts(2025, 3, 9, 0), Granularity::Week), "2025-03-03");
    }

    #[test]
    fn month_bucket_is_first_of_month() {
        assert_eq!(bucket_key(ts(2025, 12, 31, 0), Granularity::Month), "2025-12-01");
    }

    // -- registrations --

    #[test]
    fn registrations_grouped_and_sorted() {
        let created = vec![ts(2025, 3, 2, 10), ts(2025, 3, 1, 9), ts(2025, 3, 2, 11)];
        let series = build_registrations(&created, Granularity::Day);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2025-03-01");
        assert_eq!(series[0].count, 1);
        assert_eq!(series[1].date, "2025-03-02");
        assert_eq!(series[1].count, 2);
    }

    // -- growth --

    #[test]
    fn growth_accumulates_over_baseline() {
        let range = DateRange::new(ts(2025, 3, 1, 0), ts(2025, 3, 31, 0));
        let created = vec![
            ts(2025, 2, 10, 0), // baseline
            ts(2025, 2, 20, 0), // baseline
            ts(2025, 3, 1, 8),
            ts(2025, 3, 1, 9),
            ts(2025, 3, 3, 10),
        ];
        let series = build_growth(&created, &range);
        assert_eq!(series.len(), 2);

        assert_eq!(series[0].date, "2025-03-01");
        assert_eq!(series[0].new_users, 2);
        assert_eq!(series[0].total_users, 4);
        assert_eq!(series[0].growth_rate, 100.0); // 2 over baseline 2

        assert_eq!(series[1].new_users, 1);
        assert_eq!(series[1].total_users, 5);
        assert_eq!(series[1].growth_rate, 25.0);
    }

    #[test]
    fn growth_from_zero_baseline_is_hundred() {
        let range = DateRange::new(ts(2025, 3, 1, 0), ts(2025, 3, 31, 0));
        let created = vec![ts(2025, 3, 2, 0)];
        let series = build_growth(&created, &range);
        assert_eq!(series[0].growth_rate, 100.0);
    }

    #[test]
    fn growth_empty_input() {
        let range = DateRange::new(ts(2025, 3, 1, 0), ts(2025, 3, 31, 0));
        assert!(build_growth(&[], &range).is_empty());
    }

    // -- journey timeline --

    #[test]
    fn timeline_merges_streams_per_day() {
        let timeline = build_timeline(
            &[ts(2025, 3, 1, 9), ts(2025, 3, 1, 10), ts(2025, 3, 2, 9)],
            &[ts(2025, 3, 1, 12)],
            &[ts(2025, 3, 3, 8)],
            &[],
        );

        assert_eq!(timeline.data.len(), 3);
        let day1 = &timeline.data[0];
        assert_eq!(day1.date, "2025-03-01");
        assert_eq!(day1.registrations, 2);
        assert_eq!(day1.weddings_created, 1);
        assert_eq!(day1.onboarding_completed, 0);

        let day3 = &timeline.data[2];
        assert_eq!(day3.onboarding_completed, 1);

        assert_eq!(timeline.totals.registrations, 3);
        assert_eq!(timeline.totals.weddings_created, 1);
        assert_eq!(timeline.totals.onboarding_completed, 1);
        assert_eq!(timeline.totals.tutorial_completed, 0);
    }

    #[test]
    fn timeline_empty_streams() {
        let timeline = build_timeline(&[], &[], &[], &[]);
        assert!(timeline.data.is_empty());
        assert_eq!(timeline.totals.registrations, 0);
    }
}
