use chrono::Duration;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Inclusive `[start, end]` aggregation window.
///
/// Every aggregator takes one of these; records are matched on their own
/// timestamp column (`created_at`, `answered_at`, or `completed_at`
/// depending on the funnel stage being measured).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// The default dashboard window: the 30 days ending at `now`.
    pub fn last_30_days(now: Timestamp) -> Self {
        Self {
            start: now - Duration::days(30),
            end: now,
        }
    }

    /// Whether `ts` falls inside the window (both ends inclusive).
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn last_30_days_spans_thirty_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let range = DateRange::last_30_days(now);
        assert_eq!(range.end, now);
        assert_eq!((range.end - range.start).num_days(), 30);
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let range = DateRange::new(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(start - Duration::seconds(1)));
        assert!(!range.contains(end + Duration::seconds(1)));
    }
}
