use log::debug;
use serde::Serialize;

use super::error::Result;
use super::filter::{filtered_indices, FilterCriteria};
use super::model::{BmsColumns, CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// View result: what the table and the two charts consume
// ---------------------------------------------------------------------------

/// An `(x, y)` projection of two columns, in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(CellValue, CellValue)>,
}

impl Series {
    /// Project `x_column`/`y_column` out of `dataset`, or `None` when either
    /// column is not part of its schema. Missing cells become `Null`.
    pub fn project(dataset: &Dataset, x_column: &str, y_column: &str) -> Option<Self> {
        if !dataset.has_column(x_column) || !dataset.has_column(y_column) {
            return None;
        }
        let cell = |row: &Row, col: &str| {
            row.get(col).cloned().unwrap_or(CellValue::Null)
        };
        let points = dataset
            .rows
            .iter()
            .map(|row| (cell(row, x_column), cell(row, y_column)))
            .collect();
        Some(Series {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Filtered rows plus the two chart projections.
///
/// `None` for a series means "no chart": its columns are absent.
/// `Some` with no points means the columns exist but no row survived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewResult {
    pub table: Dataset,
    pub soc_vs_time: Option<Series>,
    pub voltage_vs_current: Option<Series>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Filter-and-shape engine bound to a set of column names.
#[derive(Debug, Clone, Default)]
pub struct ViewEngine {
    columns: BmsColumns,
}

impl ViewEngine {
    pub fn new(columns: BmsColumns) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &BmsColumns {
        &self.columns
    }

    /// Compute the view of `dataset` under `criteria`.
    ///
    /// No dataset yet → empty view, filters are not evaluated.
    /// The input is never modified; surviving rows keep their order.
    pub fn compute(&self, dataset: Option<&Dataset>, criteria: &FilterCriteria) -> Result<ViewResult> {
        let Some(dataset) = dataset else {
            return Ok(ViewResult::default());
        };

        let keep = filtered_indices(dataset, criteria, &self.columns)?;
        let rows = keep.iter().map(|&i| dataset.rows[i].clone()).collect();
        let table = Dataset::with_schema(dataset.columns.clone(), rows);

        let cols = &self.columns;
        let soc_vs_time = Series::project(&table, &cols.time, &cols.soc);
        let voltage_vs_current = Series::project(&table, &cols.voltage, &cols.current);

        debug!(
            "view: {}/{} rows, soc chart: {}, voltage chart: {}",
            table.len(),
            dataset.len(),
            soc_vs_time.is_some(),
            voltage_vs_current.is_some()
        );

        Ok(ViewResult {
            table,
            soc_vs_time,
            voltage_vs_current,
        })
    }
}

/// [`ViewEngine::compute`] with the default BMS column names.
pub fn compute_view(dataset: Option<&Dataset>, criteria: &FilterCriteria) -> Result<ViewResult> {
    ViewEngine::default().compute(dataset, criteria)
}
