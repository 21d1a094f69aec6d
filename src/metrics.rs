//! Task metric pools
//!
//! Collects the per-trial values of the four tracked quantities for a single
//! task source, bucketed by day ordinal, by week and for the whole document.
//! Days are numbered by their position in `dailyResults`, never by date.

use crate::schema::SessionDocument;
use crate::types::{distance_accuracy, MetricKind, TaskSource, TaskType};
use std::collections::BTreeMap;

pub const DAYS_PER_WEEK: usize = 7;

/// Week number (1-based) of a 1-based day ordinal
pub fn week_of(day_ordinal: usize) -> usize {
    (day_ordinal.saturating_sub(1)) / DAYS_PER_WEEK + 1
}

/// Arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Present values of each tracked quantity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricValues {
    values: [Vec<f64>; 4],
}

impl MetricValues {
    pub fn push(&mut self, kind: MetricKind, value: f64) {
        self.values[kind.index()].push(value);
    }

    pub fn get(&self, kind: MetricKind) -> &[f64] {
        &self.values[kind.index()]
    }

    pub fn mean(&self, kind: MetricKind) -> Option<f64> {
        mean(self.get(kind))
    }

    pub fn extend(&mut self, other: &MetricValues) {
        for (pool, values) in self.values.iter_mut().zip(&other.values) {
            pool.extend_from_slice(values);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Vec::is_empty)
    }
}

/// Metric pools for one document and one task source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub overall: MetricValues,
    /// `(day ordinal, values)` for every daily entry, in document order
    pub days: Vec<(usize, MetricValues)>,
    /// Per-trial values pooled by week number
    pub weeks: BTreeMap<usize, MetricValues>,
}

impl DocumentMetrics {
    /// Collect values of trials whose `taskSource` is `source`
    ///
    /// Distance accuracy is clamped to [0, 100] in these pools. Trials without
    /// their defining metric contribute nothing.
    pub fn collect(doc: &SessionDocument, source: TaskSource) -> Self {
        let mut metrics = DocumentMetrics::default();

        for (index, entry) in doc.daily_results.iter().enumerate() {
            let ordinal = index + 1;
            let mut day = MetricValues::default();

            for result in &entry.results_by_source {
                for task_type in TaskType::ALL {
                    for trial in result.trials(task_type) {
                        if !trial.is_from(source.as_str()) {
                            continue;
                        }
                        match task_type {
                            TaskType::Pointing => {
                                if let Some(error) = trial.error {
                                    day.push(MetricKind::PointingError, error);
                                }
                            }
                            TaskType::Distance => {
                                if let Some(tau) = trial.kendall_tau {
                                    let accuracy = distance_accuracy(tau).clamp(0.0, 100.0);
                                    day.push(MetricKind::DistanceAccuracy, accuracy);
                                    day.push(MetricKind::KendallTau, tau);
                                }
                            }
                            TaskType::Mapping => {
                                if let Some(r2) = trial.r2 {
                                    day.push(MetricKind::MappingR2, r2);
                                }
                            }
                        }
                    }
                }
            }

            metrics.overall.extend(&day);
            if !day.is_empty() {
                metrics.weeks.entry(week_of(ordinal)).or_default().extend(&day);
            }
            metrics.days.push((ordinal, day));
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_days(days: &[&str]) -> SessionDocument {
        let json = format!("{{\"dailyResults\": [{}]}}", days.join(","));
        SessionDocument::parse(&json).unwrap()
    }

    fn pointing_day(error: f64, source: &str) -> String {
        format!(
            r#"{{"resultsBySource": [{{"taskSource": "{source}",
                "pointing": [{{"error": {error}, "taskSource": "{source}"}}]}}]}}"#
        )
    }

    #[test]
    fn test_week_of() {
        assert_eq!(week_of(1), 1);
        assert_eq!(week_of(7), 1);
        assert_eq!(week_of(8), 2);
        assert_eq!(week_of(14), 2);
        assert_eq!(week_of(15), 3);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_day_eight_lands_in_week_two() {
        let days: Vec<String> = (1..=10).map(|d| pointing_day(d as f64, "manual")).collect();
        let day_refs: Vec<&str> = days.iter().map(String::as_str).collect();
        let metrics = DocumentMetrics::collect(&doc_with_days(&day_refs), TaskSource::Manual);

        assert_eq!(metrics.days.len(), 10);
        assert_eq!(metrics.weeks.len(), 2);
        // Week 1 pools days 1..=7, week 2 days 8..=10
        assert_eq!(metrics.weeks[&1].mean(MetricKind::PointingError), Some(4.0));
        assert_eq!(metrics.weeks[&2].get(MetricKind::PointingError), &[8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_week_pools_trials_not_day_means() {
        let day1 = r#"{"resultsBySource": [{"pointing": [
            {"error": 1.0, "taskSource": "manual"},
            {"error": 2.0, "taskSource": "manual"},
            {"error": 3.0, "taskSource": "manual"}
        ]}]}"#;
        let day2 = r#"{"resultsBySource": [{"pointing": [{"error": 10.0, "taskSource": "manual"}]}]}"#;
        let metrics = DocumentMetrics::collect(&doc_with_days(&[day1, day2]), TaskSource::Manual);

        // (1 + 2 + 3 + 10) / 4, not (2 + 10) / 2
        assert_eq!(metrics.weeks[&1].mean(MetricKind::PointingError), Some(4.0));
        assert_eq!(metrics.days[0].1.mean(MetricKind::PointingError), Some(2.0));
    }

    #[test]
    fn test_distance_accuracy_clamped_in_pools() {
        let day = r#"{"resultsBySource": [{"distance": [
            {"kendallTau": 1.2, "taskSource": "assessment"},
            {"kendallTau": -1.5, "taskSource": "assessment"}
        ]}]}"#;
        let metrics = DocumentMetrics::collect(&doc_with_days(&[day]), TaskSource::Assessment);

        assert_eq!(metrics.overall.get(MetricKind::DistanceAccuracy), &[100.0, 0.0]);
        assert_eq!(metrics.overall.get(MetricKind::KendallTau), &[1.2, -1.5]);
    }

    #[test]
    fn test_missing_metric_never_contributes() {
        let day = r#"{"resultsBySource": [{
            "pointing": [{"taskSource": "manual"}, {"error": 4.0, "taskSource": "manual"}],
            "distance": [{"taskSource": "manual"}],
            "mapping": [{"taskSource": "manual"}, {"rSquared": 0.5, "taskSource": "manual"}]
        }]}"#;
        let metrics = DocumentMetrics::collect(&doc_with_days(&[day]), TaskSource::Manual);

        assert_eq!(metrics.overall.get(MetricKind::PointingError), &[4.0]);
        assert!(metrics.overall.get(MetricKind::DistanceAccuracy).is_empty());
        assert!(metrics.overall.get(MetricKind::KendallTau).is_empty());
        assert_eq!(metrics.overall.get(MetricKind::MappingR2), &[0.5]);
    }

    #[test]
    fn test_other_sources_are_ignored() {
        let days = [pointing_day(3.0, "reminder"), pointing_day(5.0, "manual")];
        let day_refs: Vec<&str> = days.iter().map(String::as_str).collect();
        let metrics = DocumentMetrics::collect(&doc_with_days(&day_refs), TaskSource::Manual);

        assert!(metrics.days[0].1.is_empty());
        assert_eq!(metrics.days[1].0, 2);
        assert_eq!(metrics.overall.get(MetricKind::PointingError), &[5.0]);
    }
}
