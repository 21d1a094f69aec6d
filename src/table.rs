//! Tabular output
//!
//! Every derived view in this crate ends up as a [`Table`]: an ordered column
//! list plus rows keyed by column name. Rows may carry different column sets
//! (summary rows grow `Day{n}_*` / `Week{n}_*` columns per document), so tables
//! are assembled by column-name union and absent cells read as [`Cell::Null`].

use crate::error::ComputeError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// A single scalar cell value
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Convert a JSON scalar into a cell. Arrays and objects become null.
    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) => Cell::Text(s.clone()),
            Some(serde_json::Value::Bool(b)) => Cell::Text(b.to_string()),
            Some(serde_json::Value::Number(n)) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            _ => Cell::Null,
        }
    }

    /// Numeric view of the cell, if it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) if !v.is_finite() => Ok(()),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Float).unwrap_or(Cell::Null)
    }
}

impl From<Option<i64>> for Cell {
    fn from(value: Option<i64>) -> Self {
        value.map(Cell::Int).unwrap_or(Cell::Null)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// One output row: column names in insertion order with their cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any earlier value under the same name
    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        let column = column.into();
        let cell = cell.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = cell,
            None => self.cells.push((column, cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A record type with a fixed column schema
pub trait TabularRecord {
    /// Column names in output order
    const COLUMNS: &'static [&'static str];

    fn to_row(&self) -> Row;
}

/// Rows aligned by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, Cell>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table that still reports a column schema
    pub fn with_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from typed records, keeping the record schema when empty
    pub fn from_records<'a, R, I>(records: I) -> Self
    where
        R: TabularRecord + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let mut table = Self::with_columns(R::COLUMNS);
        for record in records {
            table.push_row(record.to_row());
        }
        table
    }

    /// Append a row. Columns not seen before are appended to the schema.
    pub fn push_row(&mut self, row: Row) {
        let mut cells = HashMap::with_capacity(row.len());
        for (name, cell) in row.cells {
            if !self.columns.iter().any(|c| *c == name) {
                self.columns.push(name.clone());
            }
            cells.insert(name, cell);
        }
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` / `column`; absent columns read as null
    pub fn cell(&self, row: usize, column: &str) -> &Cell {
        static NULL: Cell = Cell::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// All cells of one column, nulls included
    pub fn column(&self, column: &str) -> Vec<&Cell> {
        (0..self.rows.len()).map(|i| self.cell(i, column)).collect()
    }

    /// Write the table as CSV: header row, nulls as empty fields
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ComputeError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for i in 0..self.rows.len() {
            writer.write_record(self.columns.iter().map(|c| self.cell(i, c).to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, ComputeError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ComputeError::ExportError(e.to_string()))
    }

    /// One JSON object per row, every column present
    pub fn to_ndjson(&self) -> Result<String, ComputeError> {
        let mut out = String::new();
        for i in 0..self.rows.len() {
            out.push_str(&serde_json::to_string(&RowView { table: self, index: i })?);
            out.push('\n');
        }
        Ok(out)
    }
}

struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for column in &self.table.columns {
            let cell = self.table.cell(self.index, column);
            // NaN is not representable in JSON
            match cell {
                Cell::Float(v) if !v.is_finite() => map.serialize_entry(column, &Cell::Null)?,
                _ => map.serialize_entry(column, cell)?,
            }
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for index in 0..self.rows.len() {
            seq.serialize_element(&RowView { table: self, index })?;
        }
        seq.end()
    }
}
