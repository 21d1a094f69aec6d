//! Batch orchestration
//!
//! This module provides the public API for Landmark Hunt processing. A batch is
//! the set of documents uploaded together; every view (overview, landmarks,
//! trials, footprints, summaries) is computed from the same parsed batch.
//!
//! A document that is not valid JSON is skipped with a warning. It never
//! aborts the rest of the batch.

use crate::extractor::{extract_landmarks, extract_overview, extract_trials, TrialFilter};
use crate::footprint::{hull_polygons, hull_table_rows};
use crate::schema::SessionDocument;
use crate::summary::{overall_column, summarize_document, BASE_COLUMNS};
use crate::table::Table;
use crate::types::{
    HullPolygon, HullRow, LandmarkRow, MetricKind, SessionOverviewRow, TaskSource, TrialRow,
};

/// Parsed documents of one upload batch
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    documents: Vec<SessionDocument>,
    skipped: usize,
}

impl DocumentBatch {
    /// Parse decoded document texts, skipping (and logging) invalid ones
    pub fn parse<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = DocumentBatch::default();
        for (index, text) in texts.into_iter().enumerate() {
            match SessionDocument::parse(text.as_ref()) {
                Ok(doc) => batch.documents.push(doc),
                Err(e) => {
                    tracing::warn!(document = index, error = %e, "skipped a document due to invalid JSON");
                    batch.skipped += 1;
                }
            }
        }
        tracing::debug!(
            parsed = batch.documents.len(),
            skipped = batch.skipped,
            "parsed document batch"
        );
        batch
    }

    pub fn from_documents(documents: Vec<SessionDocument>) -> Self {
        Self {
            documents,
            skipped: 0,
        }
    }

    pub fn documents(&self) -> &[SessionDocument] {
        &self.documents
    }

    /// Number of documents dropped for invalid JSON
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Participant & session overview, one row per document
    pub fn overview_table(&self) -> Table {
        let rows: Vec<SessionOverviewRow> = self.documents.iter().map(extract_overview).collect();
        Table::from_records(&rows)
    }

    /// Every landmark of every document
    pub fn landmark_table(&self) -> Table {
        let rows: Vec<LandmarkRow> = self.documents.iter().flat_map(extract_landmarks).collect();
        Table::from_records(&rows)
    }

    /// Flattened trials, filtered by source and task type across all documents
    pub fn trial_table(&self, filter: TrialFilter) -> Table {
        let rows: Vec<TrialRow> = self
            .documents
            .iter()
            .flat_map(|doc| extract_trials(doc, filter))
            .collect();
        Table::from_records(&rows)
    }

    /// Convex hull footprint per user
    pub fn hull_table(&self) -> Table {
        let rows: Vec<HullRow> = hull_table_rows(&self.documents);
        Table::from_records(&rows)
    }

    /// Geographic hull rings per user, for map layers
    pub fn hull_polygons(&self) -> Vec<HullPolygon> {
        hull_polygons(&self.documents)
    }

    /// One summary row per document for `source`, aligned by column name
    pub fn summary_table(&self, source: TaskSource) -> Table {
        let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(MetricKind::ALL.iter().map(|&kind| overall_column(source, kind)));

        let mut table = Table::with_columns(&columns);
        for doc in &self.documents {
            table.push_row(summarize_document(doc, source));
        }
        table
    }
}

/// Trial table straight from decoded document texts
pub fn trial_table<I, S>(texts: I, filter: TrialFilter) -> Table
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DocumentBatch::parse(texts).trial_table(filter)
}

/// Summary table straight from decoded document texts
pub fn summarize_documents<I, S>(texts: I, source: TaskSource) -> Table
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DocumentBatch::parse(texts).summary_table(source)
}

/// Default export file stem for a summary table
pub fn summary_export_name(source: TaskSource) -> String {
    format!("{}_Details", source)
}
