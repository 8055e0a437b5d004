/// Quantity & unit compatibility layer.
///
/// ```text
///   free text ──parse──▶ Unit ──humanize──▶ "Nanometer"
///                         │
///                         ▼
///   Quantity (values + Unit) ──to(unit, Equivalency, context)──▶ Quantity
///                         │
///                         ▼
///   find_equivalent_units ──▶ CandidateList (title ↔ unit)
/// ```
///
/// `Spectral` relates wavelength, frequency, energy and wavenumber.
/// `SpectralDensity` relates the flux density forms and needs the spectral
/// axis the flux was sampled on, since those conversions vary per sample.
pub mod candidates;
pub mod equivalency;
pub mod quantity;
pub mod unit;

pub use candidates::{CandidateList, CUSTOM_ENTRY};
pub use equivalency::{convert, find_equivalent_units, is_equivalent, Equivalency};
pub use quantity::Quantity;
pub use unit::Unit;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Free text that does not parse. `suggestion` holds near-miss spellings.
    #[error("'{text}' did not parse as unit: {reason}.{}", .suggestion.as_ref().map(|s| format!(" Did you mean {s}?")).unwrap_or_default())]
    InvalidUnit {
        text: String,
        reason: String,
        suggestion: Option<String>,
    },

    #[error("'{from}' and '{to}' are not convertible")]
    Incompatible { from: String, to: String },

    #[error("spectral density conversion requires a spectral axis in wavelength, frequency, energy or wavenumber units, got '{0}'")]
    InvalidContext(String),

    #[error("spectral axis has {context} values but {values} values were given")]
    ContextLength { context: usize, values: usize },
}
