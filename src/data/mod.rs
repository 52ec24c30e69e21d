/// Data layer: core types, loading, filtering and shaping.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, column schema, unique values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  battery id / date range → kept row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  table rows + SoC/Time + Voltage/Current series
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
