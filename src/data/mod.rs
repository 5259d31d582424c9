/// Data layer: core types, loading, indexing and aggregation.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawObservation>
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetIndex  │  validate, group by country → language
///   └──────────────┘
///        │  lookup(country, language)
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-band five-number summaries
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod index;
pub mod loader;
pub mod model;
