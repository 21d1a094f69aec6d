//! Per-document summary
//!
//! Builds the wide summary row of the converter: identity and engagement
//! fields, footprint, then `Overall_*`, `Day{n}_*` and `Week{n}_*` metric
//! columns for one task source. Day and week columns exist only where data
//! exists, so the column set differs between documents.

use crate::engagement::EngagementStats;
use crate::footprint::document_hull_area_km2;
use crate::metrics::DocumentMetrics;
use crate::schema::SessionDocument;
use crate::table::{Cell, Row};
use crate::types::{MetricKind, TaskSource};

/// Fixed leading columns of every summary row
pub const BASE_COLUMNS: &[&str] = &[
    "userID",
    "gender",
    "age",
    "sessionID",
    "total_landmarks",
    "deleted_landmarks",
    "convex_hull_area",
    "total_days_used",
    "first_use_date",
    "last_use_date",
    "total_duration_days",
    "engagement_ratio",
    "longest_gap_days",
    "longest_streak_days",
];

pub fn overall_column(source: TaskSource, kind: MetricKind) -> String {
    format!("Overall_{}_{}", source, kind.label())
}

pub fn day_column(day: usize, source: TaskSource, kind: MetricKind) -> String {
    format!("Day{}_{}_{}", day, source, kind.label())
}

pub fn week_column(week: usize, source: TaskSource, kind: MetricKind) -> String {
    format!("Week{}_{}_{}", week, source, kind.label())
}

/// Summarize one document for `source`
pub fn summarize_document(doc: &SessionDocument, source: TaskSource) -> Row {
    let engagement = EngagementStats::from_document(doc);
    let metrics = DocumentMetrics::collect(doc, source);

    let mut row = Row::new();
    row.insert("userID", doc.participant.user_id.clone());
    row.insert("gender", doc.participant.gender.clone());
    row.insert("age", doc.participant.age.clone());
    row.insert("sessionID", doc.session_id.clone());
    row.insert("total_landmarks", doc.landmarks.len());
    row.insert("deleted_landmarks", doc.deleted_landmarks.clone());
    row.insert("convex_hull_area", document_hull_area_km2(doc));
    row.insert("total_days_used", engagement.total_days_used);
    row.insert("first_use_date", engagement.first_use_date);
    row.insert("last_use_date", engagement.last_use_date);
    row.insert("total_duration_days", Cell::from(engagement.total_duration_days));
    row.insert("engagement_ratio", engagement.engagement_ratio);
    row.insert("longest_gap_days", Cell::from(engagement.longest_gap_days));
    row.insert("longest_streak_days", Cell::Int(engagement.longest_streak_days));

    for kind in MetricKind::ALL {
        row.insert(overall_column(source, kind), metrics.overall.mean(kind));
    }

    for (day, values) in &metrics.days {
        for kind in MetricKind::ALL {
            if let Some(mean) = values.mean(kind) {
                row.insert(day_column(*day, source, kind), mean);
            }
        }
    }

    // Week keys are ordered as text, so Week10 precedes Week2
    let mut weeks: Vec<_> = metrics.weeks.iter().collect();
    weeks.sort_by_key(|(week, _)| week.to_string());
    for kind in MetricKind::ALL {
        for (week, values) in &weeks {
            if let Some(mean) = values.mean(kind) {
                row.insert(week_column(**week, source, kind), mean);
            }
        }
    }

    tracing::debug!(
        user_id = doc.user_id(),
        source = source.as_str(),
        columns = row.len(),
        "summarized document"
    );
    row
}
