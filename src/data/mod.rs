/// Data layer: core types, loading, classification and scene views.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → drop bad years, mark absent values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Observation>, country index (immutable)
///   └──────────┘
///        │            ┌──────────┐
///        ├───────────▶│  region   │  aggregate vs. real country
///        ▼            └──────────┘
///   ┌──────────┐
///   │  views    │  ViewRequest → global mean / leaders / explorer
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod region;
pub mod views;
