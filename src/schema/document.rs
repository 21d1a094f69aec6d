//! Landmark Hunt session document
//!
//! Session logs are exported by the mobile app as one JSON object per
//! participant session. The exporter has changed over time, so every field is
//! read null-safely: a missing field, or one with the wrong JSON shape, becomes
//! `None` (or an empty list) instead of failing the whole document. Only JSON
//! syntax errors are fatal, and only for the document that contains them.

use crate::error::ComputeError;
use crate::table::Cell;
use crate::types::TaskType;
use serde_json::{Map, Value};

/// One parsed session document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDocument {
    pub participant: ParticipantInfo,
    pub session_id: Option<String>,
    /// Every entry of the `landmarks` array, malformed entries included
    pub landmarks: Vec<Landmark>,
    /// `deletedLandmarks` as recorded, `0` when absent
    pub deleted_landmarks: Cell,
    /// Daily entries in document order
    pub daily_results: Vec<DailyEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantInfo {
    pub user_id: Option<String>,
    pub gender: Option<String>,
    pub age: Cell,
}

/// A recorded landmark in WGS84 coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Landmark {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<String>,
}

impl Landmark {
    /// `(longitude, latitude)` when both coordinates are present
    pub fn lon_lat(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some((lon, lat)),
            _ => None,
        }
    }
}

/// One day's results; its position in `dailyResults` is its ordinal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyEntry {
    pub date: Option<String>,
    /// Source results that were JSON objects; other entries are dropped
    pub results_by_source: Vec<SourceResult>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceResult {
    pub task_source: Option<String>,
    pub pointing: Vec<Trial>,
    pub distance: Vec<Trial>,
    pub mapping: Vec<Trial>,
}

impl SourceResult {
    pub fn trials(&self, task_type: TaskType) -> &[Trial] {
        match task_type {
            TaskType::Pointing => &self.pointing,
            TaskType::Distance => &self.distance,
            TaskType::Mapping => &self.mapping,
        }
    }
}

/// A single task attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trial {
    pub task_source: Option<String>,
    pub timestamp: Option<String>,
    /// Pointing error (lower is better)
    pub error: Option<f64>,
    /// Distance-ranking rank correlation in [-1, 1]
    pub kendall_tau: Option<f64>,
    /// Mapping fit, `r2` with `rSquared` as fallback
    pub r2: Option<f64>,
}

impl Trial {
    pub fn is_from(&self, source: &str) -> bool {
        self.task_source.as_deref() == Some(source)
    }
}

impl SessionDocument {
    /// Parse a decoded JSON document
    pub fn parse(text: &str) -> Result<Self, ComputeError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Build a document from an already-parsed JSON value
    pub fn from_value(value: &Value) -> Self {
        let participant = field(Some(value), "participantInfo");

        SessionDocument {
            participant: ParticipantInfo {
                user_id: text(field(participant, "userID")),
                gender: text(field(participant, "gender")),
                age: Cell::from_json(field(participant, "age")),
            },
            session_id: text(field(Some(value), "sessionID")),
            landmarks: array(field(Some(value), "landmarks"))
                .iter()
                .map(parse_landmark)
                .collect(),
            deleted_landmarks: match field(Some(value), "deletedLandmarks") {
                None => Cell::Int(0),
                present => Cell::from_json(present),
            },
            daily_results: array(field(Some(value), "dailyResults"))
                .iter()
                .map(parse_daily_entry)
                .collect(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.participant.user_id.as_deref()
    }

    /// Landmarks with both coordinates present, as `(longitude, latitude)`
    pub fn valid_coordinates(&self) -> Vec<(f64, f64)> {
        self.landmarks.iter().filter_map(Landmark::lon_lat).collect()
    }
}

fn parse_landmark(value: &Value) -> Landmark {
    Landmark {
        latitude: number(field(Some(value), "latitude")),
        longitude: number(field(Some(value), "longitude")),
        timestamp: text(field(Some(value), "timestamp")),
    }
}

fn parse_daily_entry(value: &Value) -> DailyEntry {
    DailyEntry {
        date: text(field(Some(value), "date")),
        results_by_source: array(field(Some(value), "resultsBySource"))
            .iter()
            .filter_map(Value::as_object)
            .map(parse_source_result)
            .collect(),
    }
}

fn parse_source_result(object: &Map<String, Value>) -> SourceResult {
    let trials = |task_type: TaskType| -> Vec<Trial> {
        array(object.get(task_type.as_str()))
            .iter()
            .map(parse_trial)
            .collect()
    };

    SourceResult {
        task_source: text(object.get("taskSource")),
        pointing: trials(TaskType::Pointing),
        distance: trials(TaskType::Distance),
        mapping: trials(TaskType::Mapping),
    }
}

fn parse_trial(value: &Value) -> Trial {
    let value = Some(value);
    Trial {
        task_source: text(field(value, "taskSource")),
        timestamp: text(field(value, "timestamp")),
        error: number(field(value, "error")),
        kendall_tau: number(field(value, "kendallTau")),
        r2: number(field(value, "r2")).or_else(|| number(field(value, "rSquared"))),
    }
}

/// Null-safe member access: `None` unless `value` is an object holding `key`
fn field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    value.and_then(Value::as_object).and_then(|o| o.get(key))
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// Scalar as text; identifiers are sometimes exported as numbers
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
