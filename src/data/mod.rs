/// Data layer: stored spectra and loading.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → unit-tagged SpectrumRecord per row
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ DataCollection  │  Rc<SpectrumRecord>, shared with plotted series
///   └────────────────┘
/// ```

pub mod loader;
pub mod model;
