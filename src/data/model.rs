use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            CellValue::Null => write!(f, ""),
        }
    }
}

/// ISO-8601 calendar date, the format date cells are rendered and parsed in.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

impl CellValue {
    /// Try to interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Canonical text of the cell, used for exact identifier matching.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Parse an ISO date, accepting a trailing time part (`2024-01-01T00:00:00.000`,
/// `2024-01-01 08:30:00`) as written by pandas and most spreadsheet exports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10)?;
    let date = NaiveDate::parse_from_str(head, DATE_FORMAT).ok()?;
    match s.as_bytes().get(10) {
        None | Some(b'T') | Some(b' ') => Some(date),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Row / Dataset
// ---------------------------------------------------------------------------

/// One row of the uploaded table: column name → value.
/// A row may lack some columns of the dataset schema.
pub type Row = BTreeMap<String, CellValue>;

/// The full parsed table with its schema and pre-computed column indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    /// Column names in header order. Kept even when every row is filtered out.
    pub columns: Vec<String>,
    /// All rows, in file order.
    pub rows: Vec<Row>,
    /// For each column the sorted set of unique values.
    #[serde(skip)]
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build column indices from the loaded rows.
    ///
    /// Columns named in `columns` keep their order; columns only seen in rows
    /// are appended in sorted order.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let mut columns = columns;
        let mut extra: BTreeSet<String> = BTreeSet::new();
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for row in &rows {
            for (col, val) in row {
                if !columns.contains(col) {
                    extra.insert(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        columns.extend(extra);

        Dataset {
            columns,
            rows,
            unique_values,
        }
    }

    /// Rows under an already known schema, without the unique-value index.
    /// Used for derived tables that are only displayed.
    pub fn with_schema(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset {
            columns,
            rows,
            unique_values: BTreeMap::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether `column` is part of the schema.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Non-null unique values of a column, in sorted order.
    pub fn distinct(&self, column: &str) -> Vec<&CellValue> {
        self.unique_values
            .get(column)
            .map(|vals| vals.iter().filter(|v| !v.is_null()).collect())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// BmsColumns – the expected column names
// ---------------------------------------------------------------------------

/// Names of the BMS columns the dashboard looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmsColumns {
    pub battery_id: String,
    pub date: String,
    pub time: String,
    pub soc: String,
    pub voltage: String,
    pub current: String,
}

impl Default for BmsColumns {
    fn default() -> Self {
        Self {
            battery_id: "Battery ID".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            soc: "SoC".to_string(),
            voltage: "Voltage".to_string(),
            current: "Current".to_string(),
        }
    }
}
