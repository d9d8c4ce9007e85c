/// Data layer: core types, file loading, ROI selection and result export.
///
/// Architecture:
/// ```text
///  samples.csv / .json        spectrum .txt files
///        │                          │
///        ▼                          ▼
///   ┌──────────┐               ┌──────────┐
///   │  loader   │ SampleRecord  │  loader   │ Spectrum
///   └──────────┘               └──────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///               ┌──────────┐
///               │  filter   │  ROI / range → sample indices
///               └──────────┘
///                     │
///                     ▼
///               ┌──────────┐
///               │  export   │  .parquet / .json / .csv
///               └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
