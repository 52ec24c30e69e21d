// Error types for the filter-and-shape engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Row {row}: '{column}' value {value} cannot be compared with a date range")]
    IncomparableDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Date bound '{0}' is not a YYYY-MM-DD date")]
    InvalidDateBound(String),
}
