//! Usage engagement
//!
//! Derives how a participant used the app over time from the `date` of each
//! daily entry: how many distinct days, the overall span, the longest pause
//! and the longest run of consecutive days.

use crate::schema::SessionDocument;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Engagement statistics for one document
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementStats {
    pub total_days_used: usize,
    pub first_use_date: Option<String>,
    pub last_use_date: Option<String>,
    pub total_duration_days: Option<i64>,
    /// `total_days_used / total_landmarks`, `None` without landmarks
    pub engagement_ratio: Option<f64>,
    /// Largest day delta between consecutive used days
    pub longest_gap_days: Option<i64>,
    /// Longest run of consecutive calendar days; starts at 1
    pub longest_streak_days: i64,
}

impl EngagementStats {
    pub fn from_document(doc: &SessionDocument) -> Self {
        let dates = doc
            .daily_results
            .iter()
            .filter_map(|entry| entry.date.as_deref());
        Self::compute(unique_days(dates), doc.landmarks.len())
    }

    /// Compute from sorted unique days
    pub fn compute(days: BTreeSet<NaiveDate>, total_landmarks: usize) -> Self {
        let days: Vec<NaiveDate> = days.into_iter().collect();
        let first = days.first().copied();
        let last = days.last().copied();

        let total_days_used = days.len();
        let engagement_ratio =
            (total_landmarks > 0).then(|| total_days_used as f64 / total_landmarks as f64);

        let deltas: Vec<i64> = days
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days())
            .collect();

        let mut streak = 1;
        let mut longest_streak_days = 1;
        for delta in &deltas {
            if *delta == 1 {
                streak += 1;
                longest_streak_days = longest_streak_days.max(streak);
            } else {
                streak = 1;
            }
        }

        EngagementStats {
            total_days_used,
            first_use_date: first.map(|d| d.format(DATE_FORMAT).to_string()),
            last_use_date: last.map(|d| d.format(DATE_FORMAT).to_string()),
            total_duration_days: first.zip(last).map(|(f, l)| (l - f).num_days()),
            engagement_ratio,
            longest_gap_days: deltas.iter().copied().max(),
            longest_streak_days,
        }
    }
}

/// Parse dates and collapse them to a sorted set of calendar days
///
/// Unparseable dates are logged and skipped.
pub fn unique_days<'a, I>(dates: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = &'a str>,
{
    dates
        .into_iter()
        .filter_map(|raw| {
            let parsed = parse_calendar_day(raw);
            if parsed.is_none() {
                tracing::warn!(date = raw, "skipping unparseable daily entry date");
            }
            parsed
        })
        .collect()
}

/// Calendar day of a date or timestamp string
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stats(dates: &[&str], landmarks: usize) -> EngagementStats {
        EngagementStats::compute(unique_days(dates.iter().copied()), landmarks)
    }

    #[test]
    fn test_streak_and_gap() {
        let s = stats(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-10"], 8);
        assert_eq!(s.longest_streak_days, 3);
        assert_eq!(s.longest_gap_days, Some(7));
        assert_eq!(s.total_days_used, 4);
        assert_eq!(s.first_use_date.as_deref(), Some("2024-01-01"));
        assert_eq!(s.last_use_date.as_deref(), Some("2024-01-10"));
        assert_eq!(s.total_duration_days, Some(9));
        assert_eq!(s.engagement_ratio, Some(0.5));
    }

    #[test]
    fn test_duplicates_and_order_are_irrelevant() {
        let s = stats(
            &["2024-01-03", "2024-01-01", "2024-01-03T18:30:00Z", "2024-01-02 07:00:00"],
            0,
        );
        assert_eq!(s.total_days_used, 3);
        assert_eq!(s.longest_streak_days, 3);
        assert_eq!(s.longest_gap_days, Some(1));
        assert_eq!(s.engagement_ratio, None);
    }

    #[test]
    fn test_no_dates() {
        let s = stats(&[], 5);
        assert_eq!(
            s,
            EngagementStats {
                total_days_used: 0,
                first_use_date: None,
                last_use_date: None,
                total_duration_days: None,
                engagement_ratio: Some(0.0),
                longest_gap_days: None,
                longest_streak_days: 1,
            }
        );
    }

    #[test]
    fn test_single_day() {
        let s = stats(&["2024-03-05"], 1);
        assert_eq!(s.total_duration_days, Some(0));
        assert_eq!(s.longest_gap_days, None);
        assert_eq!(s.longest_streak_days, 1);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let s = stats(
            &["2024-01-01", "2024-01-02", "2024-01-05", "2024-01-06", "2024-01-07", "2024-01-08"],
            1,
        );
        assert_eq!(s.longest_streak_days, 4);
        assert_eq!(s.longest_gap_days, Some(3));
    }

    #[test]
    fn test_unparseable_dates_are_skipped() {
        let s = stats(&["yesterday", "2024-01-01"], 1);
        assert_eq!(s.total_days_used, 1);
    }

    #[test]
    fn test_from_document_ignores_missing_dates() {
        let doc = SessionDocument::parse(
            r#"{"landmarks": [{}, {}],
                "dailyResults": [{"date": "2024-05-01"}, {}, {"date": "2024-05-02"}]}"#,
        )
        .unwrap();
        let s = EngagementStats::from_document(&doc);
        assert_eq!(s.total_days_used, 2);
        assert_eq!(s.engagement_ratio, Some(1.0));
        assert_eq!(s.longest_streak_days, 2);
    }
}
