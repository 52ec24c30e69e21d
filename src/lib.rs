//! Battery-management-system log dashboard: loading, filtering and shaping.
//!
//! The egui front end lives in the `bms-dash` binary; `bms_view` exposes the
//! same engine as a JSON request/response tool.

pub mod config;
pub mod data;

pub use data::error::ViewError;
pub use data::filter::FilterCriteria;
pub use data::model::{BmsColumns, CellValue, Dataset, Row};
pub use data::view::{compute_view, Series, ViewEngine, ViewResult};
