//! Record extraction
//!
//! Flattens one session document into the overview, landmark and trial rows
//! shown by the explorer. Filters are applied while flattening, so a filtered
//! extraction never materializes rows it would drop.

use crate::schema::SessionDocument;
use crate::types::{
    distance_accuracy, LandmarkRow, SessionOverviewRow, TaskSource, TaskType, TrialRow,
};

/// Optional trial filters; `None` matches everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialFilter {
    pub source: Option<TaskSource>,
    pub task: Option<TaskType>,
}

impl TrialFilter {
    pub fn new(source: Option<TaskSource>, task: Option<TaskType>) -> Self {
        Self { source, task }
    }

    fn accepts_task(&self, task_type: TaskType) -> bool {
        self.task.map_or(true, |t| t == task_type)
    }

    fn accepts_source(&self, task_source: Option<&str>) -> bool {
        self.source.map_or(true, |s| task_source == Some(s.as_str()))
    }
}

/// Participant and session identity with landmark counts
pub fn extract_overview(doc: &SessionDocument) -> SessionOverviewRow {
    SessionOverviewRow {
        user_id: doc.participant.user_id.clone(),
        gender: doc.participant.gender.clone(),
        age: doc.participant.age.clone(),
        session_id: doc.session_id.clone(),
        total_landmarks: doc.landmarks.len(),
        deleted_landmarks: doc.deleted_landmarks.clone(),
    }
}

/// One row per landmark entry, nulls retained
pub fn extract_landmarks(doc: &SessionDocument) -> Vec<LandmarkRow> {
    doc.landmarks
        .iter()
        .map(|lm| LandmarkRow {
            user_id: doc.participant.user_id.clone(),
            latitude: lm.latitude,
            longitude: lm.longitude,
            timestamp: lm.timestamp.clone(),
        })
        .collect()
}

/// Flatten daily / source / task trials into rows
///
/// The source filter is matched against each trial's own `taskSource`.
/// `distance_accuracy` is `50 + 50 * kendallTau` and is not clamped here.
pub fn extract_trials(doc: &SessionDocument, filter: TrialFilter) -> Vec<TrialRow> {
    let mut rows = Vec::new();

    for entry in &doc.daily_results {
        for source in &entry.results_by_source {
            for task_type in TaskType::ALL {
                if !filter.accepts_task(task_type) {
                    continue;
                }
                for trial in source.trials(task_type) {
                    if !filter.accepts_source(trial.task_source.as_deref()) {
                        continue;
                    }
                    rows.push(TrialRow {
                        user_id: doc.participant.user_id.clone(),
                        session_id: doc.session_id.clone(),
                        task_source: trial.task_source.clone(),
                        task_type,
                        error: trial.error,
                        kendall_tau: trial.kendall_tau,
                        distance_accuracy: trial.kendall_tau.map(distance_accuracy),
                        r2: trial.r2,
                        timestamp: trial.timestamp.clone(),
                    });
                }
            }
        }
    }

    tracing::trace!(
        user_id = doc.user_id(),
        rows = rows.len(),
        "extracted trial rows"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;

    fn sample_doc() -> SessionDocument {
        SessionDocument::parse(
            r#"{
                "participantInfo": {"userID": "P07", "gender": "male", "age": "31"},
                "sessionID": "S-7",
                "landmarks": [
                    {"latitude": 40.0, "longitude": -75.0, "timestamp": "2024-02-01T10:00:00Z"},
                    {"longitude": -75.1}
                ],
                "dailyResults": [
                    {"date": "2024-02-01", "resultsBySource": [
                        {"taskSource": "manual",
                         "pointing": [
                            {"error": 10.0, "taskSource": "manual", "timestamp": "a"},
                            {"error": 20.0, "taskSource": "assessment", "timestamp": "b"}
                         ],
                         "distance": [
                            {"kendallTau": 1.2, "taskSource": "manual"},
                            {"taskSource": "manual"}
                         ]},
                        {"taskSource": "reminder",
                         "mapping": [{"r2": 0.6, "taskSource": "reminder"}]}
                    ]},
                    {"date": "2024-02-02", "resultsBySource": [
                        {"pointing": [{"error": 5.0, "taskSource": "manual"}]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_overview() {
        let row = extract_overview(&sample_doc());
        assert_eq!(row.user_id.as_deref(), Some("P07"));
        assert_eq!(row.age, Cell::Text("31".into()));
        assert_eq!(row.total_landmarks, 2);
        assert_eq!(row.deleted_landmarks, Cell::Int(0));
    }

    #[test]
    fn test_landmarks_keep_null_coordinates() {
        let doc = sample_doc();
        let rows = extract_landmarks(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].latitude, None);
        assert_eq!(rows[1].longitude, Some(-75.1));
        assert!(rows.iter().all(|r| r.user_id.as_deref() == Some("P07")));
    }

    #[test]
    fn test_landmark_extraction_is_deterministic() {
        let doc = sample_doc();
        assert_eq!(extract_landmarks(&doc), extract_landmarks(&doc));
    }

    #[test]
    fn test_unfiltered_trials_in_document_order() {
        let rows = extract_trials(&sample_doc(), TrialFilter::default());
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.task_type, r.task_source.as_deref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (TaskType::Pointing, Some("manual")),
                (TaskType::Pointing, Some("assessment")),
                (TaskType::Distance, Some("manual")),
                (TaskType::Distance, Some("manual")),
                (TaskType::Mapping, Some("reminder")),
                (TaskType::Pointing, Some("manual")),
            ]
        );
    }

    #[test]
    fn test_distance_accuracy_unclamped_in_rows() {
        let rows = extract_trials(
            &sample_doc(),
            TrialFilter::new(None, Some(TaskType::Distance)),
        );
        assert_eq!(rows.len(), 2);
        assert!((rows[0].distance_accuracy.unwrap() - 110.0).abs() < 1e-9);
        assert_eq!(rows[1].kendall_tau, None);
        assert_eq!(rows[1].distance_accuracy, None);
    }

    #[test]
    fn test_source_and_task_filter() {
        let rows = extract_trials(
            &sample_doc(),
            TrialFilter::new(Some(TaskSource::Manual), Some(TaskType::Pointing)),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| {
            r.task_source.as_deref() == Some("manual") && r.task_type == TaskType::Pointing
        }));
        assert_eq!(rows[0].error, Some(10.0));
        assert_eq!(rows[1].error, Some(5.0));
    }

    #[test]
    fn test_unmatched_filter_yields_no_rows() {
        let rows = extract_trials(
            &sample_doc(),
            TrialFilter::new(Some(TaskSource::Reminder), Some(TaskType::Pointing)),
        );
        assert!(rows.is_empty());
    }
}
