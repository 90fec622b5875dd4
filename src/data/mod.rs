/// Data layer: ingestion, normalization, filtering, aggregation.
///
/// Architecture:
/// ```text
///  workbook JSON / uploaded CSV
///        │
///        ▼
///   ┌──────────┐
///   │  ingest   │  raw grids → RawTable partitions (headers deduped)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ normalize   │  typed TripTable, derived totals, date-sorted
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range ∧ boat set ∧ panel set → indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  per-panel sums, species breakdown, daily series
///   └────────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod normalize;
