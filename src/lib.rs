//! Landmark Hunt - session-log processing for the Landmark Hunt study app
//!
//! Turns the JSON session documents exported by the app into flat tables:
//! document parsing → record extraction → spatial footprint → engagement and
//! metric summaries → CSV / JSON export.
//!
//! ## Views
//!
//! - **Explorer**: participant overview, landmarks, filtered trials and
//!   per-user convex-hull footprints
//! - **Converter**: one wide summary row per document for a single task source

pub mod engagement;
pub mod error;
pub mod extractor;
pub mod footprint;
pub mod metrics;
pub mod pipeline;
pub mod projection;
pub mod schema;
pub mod summary;
pub mod table;
pub mod types;

pub use error::ComputeError;
pub use extractor::TrialFilter;
pub use pipeline::{summarize_documents, trial_table, DocumentBatch};
pub use schema::{decode_document, SessionDocument};
pub use table::{Cell, Row, Table};
pub use types::{MetricKind, TaskSource, TaskType};

/// Crate version, reported by the CLI
pub const LH_VERSION: &str = env!("CARGO_PKG_VERSION");
