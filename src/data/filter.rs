use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{Result, ViewError};
use super::model::{parse_date, BmsColumns, CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Filter criteria: what the user typed / picked in the filter controls
// ---------------------------------------------------------------------------

/// Optional battery identifier and date bounds.
/// An absent or empty field disables its filter stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub battery_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FilterCriteria {
    pub fn battery(id: impl Into<String>) -> Self {
        Self {
            battery_id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn date_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }

    /// The battery id, if the battery filter is active.
    pub fn active_battery(&self) -> Option<&str> {
        non_empty(self.battery_id.as_deref())
    }

    /// The date range, if both bounds are given. One bound alone is ignored.
    pub fn active_range(&self) -> Option<DateRange> {
        let start = non_empty(self.start_date.as_deref())?;
        let end = non_empty(self.end_date.as_deref())?;
        Some(DateRange {
            start: DateBound::new(start),
            end: DateBound::new(end),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.active_battery().is_none() && self.active_range().is_none()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Date range predicate
// ---------------------------------------------------------------------------

/// A bound as typed, plus its calendar date when it parses as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBound {
    pub raw: String,
    pub date: Option<NaiveDate>,
}

impl DateBound {
    fn new(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        let date = parse_date(&raw);
        Self { raw, date }
    }

    fn require_date(&self) -> Result<NaiveDate> {
        self.date
            .ok_or_else(|| ViewError::InvalidDateBound(self.raw.clone()))
    }
}

/// Inclusive `[start, end]` range on the date column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateBound,
    pub end: DateBound,
}

impl DateRange {
    /// Whether a date cell falls inside the range.
    ///
    /// * missing / null → outside
    /// * date → temporal comparison
    /// * text that parses as a date → temporal comparison, otherwise lexical
    ///   against the raw bounds
    /// * numbers and booleans → [`ViewError::IncomparableDate`]
    pub fn contains(&self, cell: Option<&CellValue>, row: usize, column: &str) -> Result<bool> {
        match cell {
            None | Some(CellValue::Null) => Ok(false),
            Some(CellValue::Date(d)) => {
                let (start, end) = (self.start.require_date()?, self.end.require_date()?);
                Ok(start <= *d && *d <= end)
            }
            Some(CellValue::Text(s)) => match (parse_date(s), self.start.date, self.end.date) {
                (Some(d), Some(start), Some(end)) => Ok(start <= d && d <= end),
                _ => {
                    let s = s.trim();
                    Ok(self.start.raw.as_str() <= s && s <= self.end.raw.as_str())
                }
            },
            Some(other) => Err(ViewError::IncomparableDate {
                row,
                column: column.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Whether a row passes the battery filter. Rows lacking the column never match.
pub fn battery_matches(row: &Row, column: &str, battery_id: &str) -> bool {
    row.get(column)
        .map(|v| v.as_text() == battery_id)
        .unwrap_or(false)
}

/// Return indices of rows that pass all active filters, in row order.
///
/// The battery and date predicates are independent and combined with AND.
pub fn filtered_indices(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    columns: &BmsColumns,
) -> Result<Vec<usize>> {
    let battery = criteria.active_battery();
    let range = criteria.active_range();

    let mut keep = Vec::with_capacity(dataset.len());
    for (i, row) in dataset.rows.iter().enumerate() {
        if let Some(id) = battery {
            if !battery_matches(row, &columns.battery_id, id) {
                continue;
            }
        }
        if let Some(range) = &range {
            if !range.contains(row.get(&columns.date), i, &columns.date)? {
                continue;
            }
        }
        keep.push(i);
    }
    Ok(keep)
}
