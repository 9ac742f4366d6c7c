/// Data layer: core types, loading, filtering and cleaning.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Workbook (named sheets of Tables)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality predicates → row subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  drop columns, drop empty columns, coerce numerics
///   └──────────┘
/// ```

pub mod clean;
pub mod filter;
pub mod loader;
pub mod model;

pub use model::{CellValue, Row, Sheet, Table, Workbook};
