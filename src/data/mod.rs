/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate rows → SalesDataset (+ rejected rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, unique values per dimension
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐      ┌────────────┐
///   │  filter   │ ──▶ │ aggregate   │  sums, means, group-by, series
///   └──────────┘      └────────────┘
///                           │
///                           ▼
///                     ┌──────────┐
///                     │  views    │  per-tab derived tables
///                     └──────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
pub mod writer;
