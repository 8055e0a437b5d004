/// Region selection and statistics.
///
/// ```text
///   RawSelection (plot units)        DisplaySeries
///          │                               │ projected_spectrum()
///          ▼                               ▼
///   ┌──────────────────┐   PixelMapper ┌──────────┐
///   │ resolve_selection │ ────────────▶ │ indices   │
///   └──────────────────┘               └──────────┘
///          │ sub-spectrum
///          ▼
///   compute_stats ──▶ StatusSink (StatisticsPanel)
/// ```

pub mod panel;
pub mod region;
pub mod stats;
