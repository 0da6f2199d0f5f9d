//! Shared query parameter types for the KPI handlers.
//!
//! Every KPI endpoint accepts an optional date range (RFC 3339
//! timestamps, defaulting to the last 30 days) and, where relevant, a
//! comma-separated question-id list.

use serde::Deserialize;

use altar_core::timeline::Granularity;
use altar_core::types::{DateRange, Timestamp};

/// Date-range query parameters (`?start_date=&end_date=&granularity=`).
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub granularity: Option<Granularity>,
}

impl DateRangeParams {
    /// Resolve to a concrete range against `now`.
    ///
    /// Missing edges fall back to the default window's edges, so a
    /// caller may pin just one end of the range.
    pub fn resolve(&self, now: Timestamp) -> DateRange {
        let defaults = DateRange::last_30_days(now);
        DateRange::new(
            self.start_date.unwrap_or(defaults.start),
            self.end_date.unwrap_or(defaults.end),
        )
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity.unwrap_or_default()
    }
}

/// Optional comma-separated question-id list (`?question_ids=a,b,c`).
#[derive(Debug, Default, Deserialize)]
pub struct QuestionIdsParams {
    pub question_ids: Option<String>,
}

impl QuestionIdsParams {
    /// Parse the list, trimming whitespace and dropping empty entries.
    /// `None` when the parameter is absent or contains nothing usable.
    pub fn parse(&self) -> Option<Vec<String>> {
        let raw = self.question_ids.as_deref()?;
        let ids: Vec<String> = raw
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 5, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn missing_range_defaults_to_last_30_days() {
        let params = DateRangeParams::default();
        let range = params.resolve(now());
        assert_eq!(range.end, now());
        assert_eq!((range.end - range.start).num_days(), 30);
    }

    #[test]
    fn explicit_range_is_used() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let params = DateRangeParams {
            start_date: Some(start),
            end_date: Some(end),
            granularity: None,
        };
        let range = params.resolve(now());
        assert_eq!(range.start, start);
        assert_eq!(range.end, end);
    }

    #[test]
    fn single_edge_keeps_default_for_the_other() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let params = DateRangeParams {
            start_date: Some(start),
            end_date: None,
            granularity: None,
        };
        let range = params.resolve(now());
        assert_eq!(range.start, start);
        assert_eq!(range.end, now());
    }

    #[test]
    fn granularity_defaults_to_day() {
        let params = DateRangeParams::default();
        assert_eq!(params.granularity(), Granularity::Day);
    }

    #[test]
    fn question_ids_parsed_and_trimmed() {
        let params = QuestionIdsParams {
            question_ids: Some(" a, b ,c,,".to_string()),
        };
        assert_eq!(
            params.parse(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn empty_question_ids_is_none() {
        assert_eq!(QuestionIdsParams::default().parse(), None);
        let params = QuestionIdsParams {
            question_ids: Some(" , ".to_string()),
        };
        assert_eq!(params.parse(), None);
    }
}
