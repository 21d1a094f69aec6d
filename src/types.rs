//! Core types for Landmark Hunt processing
//!
//! This module defines the closed vocabularies of the study app (task sources,
//! task types, tracked metrics) and the typed rows produced by the extractor
//! and the spatial footprint calculator.

use crate::error::ComputeError;
use crate::table::{Cell, Row, TabularRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trigger context of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TaskSource {
    Assessment,
    Manual,
    Reminder,
}

impl TaskSource {
    pub const ALL: [TaskSource; 3] = [
        TaskSource::Assessment,
        TaskSource::Manual,
        TaskSource::Reminder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSource::Assessment => "assessment",
            TaskSource::Manual => "manual",
            TaskSource::Reminder => "reminder",
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskSource {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| ComputeError::InvalidFilter(format!("unknown task source '{s}'")))
    }
}

/// Task type, keyed by the trial list name inside a source result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Pointing,
    Distance,
    Mapping,
}

impl TaskType {
    /// Document order of the trial lists
    pub const ALL: [TaskType; 3] = [TaskType::Pointing, TaskType::Distance, TaskType::Mapping];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Pointing => "pointing",
            TaskType::Distance => "distance",
            TaskType::Mapping => "mapping",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| ComputeError::InvalidFilter(format!("unknown task type '{s}'")))
    }
}

/// Quantities tracked by the summarizer, in output column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    PointingError,
    DistanceAccuracy,
    KendallTau,
    MappingR2,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::PointingError,
        MetricKind::DistanceAccuracy,
        MetricKind::KendallTau,
        MetricKind::MappingR2,
    ];

    /// Column label suffix
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::PointingError => "Pointing_Error",
            MetricKind::DistanceAccuracy => "Distance_Accuracy",
            MetricKind::KendallTau => "Kendall_Tau",
            MetricKind::MappingR2 => "Mapping_R2",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MetricKind::PointingError => 0,
            MetricKind::DistanceAccuracy => 1,
            MetricKind::KendallTau => 2,
            MetricKind::MappingR2 => 3,
        }
    }
}

/// Convert a Kendall tau into a 0-100 style accuracy score (unclamped)
pub fn distance_accuracy(kendall_tau: f64) -> f64 {
    50.0 + 50.0 * kendall_tau
}

/// One row of the participant & session overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOverviewRow {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub gender: Option<String>,
    pub age: Cell,
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    pub total_landmarks: usize,
    pub deleted_landmarks: Cell,
}

impl TabularRecord for SessionOverviewRow {
    const COLUMNS: &'static [&'static str] = &[
        "userID",
        "gender",
        "age",
        "sessionID",
        "total_landmarks",
        "deleted_landmarks",
    ];

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("userID", self.user_id.clone());
        row.insert("gender", self.gender.clone());
        row.insert("age", self.age.clone());
        row.insert("sessionID", self.session_id.clone());
        row.insert("total_landmarks", self.total_landmarks);
        row.insert("deleted_landmarks", self.deleted_landmarks.clone());
        row
    }
}

/// One landmark, tagged with its owner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandmarkRow {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<String>,
}

impl TabularRecord for LandmarkRow {
    const COLUMNS: &'static [&'static str] = &["userID", "latitude", "longitude", "timestamp"];

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("userID", self.user_id.clone());
        row.insert("latitude", self.latitude);
        row.insert("longitude", self.longitude);
        row.insert("timestamp", self.timestamp.clone());
        row
    }
}

/// One flattened trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRow {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
    #[serde(rename = "taskSource")]
    pub task_source: Option<String>,
    #[serde(rename = "taskType")]
    pub task_type: TaskType,
    pub error: Option<f64>,
    #[serde(rename = "kendallTau")]
    pub kendall_tau: Option<f64>,
    pub distance_accuracy: Option<f64>,
    pub r2: Option<f64>,
    pub timestamp: Option<String>,
}

impl TabularRecord for TrialRow {
    const COLUMNS: &'static [&'static str] = &[
        "userID",
        "sessionID",
        "taskSource",
        "taskType",
        "error",
        "kendallTau",
        "distance_accuracy",
        "r2",
        "timestamp",
    ];

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("userID", self.user_id.clone());
        row.insert("sessionID", self.session_id.clone());
        row.insert("taskSource", self.task_source.clone());
        row.insert("taskType", self.task_type.as_str());
        row.insert("error", self.error);
        row.insert("kendallTau", self.kendall_tau);
        row.insert("distance_accuracy", self.distance_accuracy);
        row.insert("r2", self.r2);
        row.insert("timestamp", self.timestamp.clone());
        row
    }
}

/// Spatial footprint of one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HullRow {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    /// Convex hull area in km², `None` with fewer than 3 valid points
    pub convex_hull_area_km2: Option<f64>,
    /// Number of landmarks with both coordinates present
    pub num_landmarks: usize,
}

impl TabularRecord for HullRow {
    const COLUMNS: &'static [&'static str] = &["userID", "convex_hull_area_km2", "num_landmarks"];

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("userID", self.user_id.clone());
        row.insert("convex_hull_area_km2", self.convex_hull_area_km2);
        row.insert("num_landmarks", self.num_landmarks);
        row
    }
}

/// Closed hull ring in geographic coordinates, for map overlays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HullPolygon {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    /// `(longitude, latitude)` pairs, first point repeated at the end
    pub polygon: Vec<(f64, f64)>,
}
