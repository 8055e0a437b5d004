use thiserror::Error;

use crate::data::model::SpectrumData;
use crate::units::{convert, is_equivalent, Equivalency, Unit};

/// Why a selection could not become a region. The `Display` text is the
/// status line shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("Region units are not compatible with selected data's spectral axis units.")]
    IncompatibleUnit,

    #[error("Region out of bound.")]
    OutOfBounds,

    #[error("Region over single value.")]
    SingleSample,

    /// Carries the mapper's reason for the log; the user sees a fixed text.
    #[error("Region could not be extracted from target data.")]
    Extraction(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("spectrum has no samples")]
    Empty,

    #[error("spectral axis is not monotonic at sample {0}")]
    NotMonotonic(usize),

    #[error("region unit {region} does not match axis unit {axis}")]
    UnitMismatch { region: String, axis: String },
}

/// Two bounds as reported by the interactive selection, in whatever order
/// the user dragged them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSelection {
    pub bounds: [f64; 2],
    pub unit: Unit,
}

impl RawSelection {
    pub fn new(first: f64, second: f64, unit: Unit) -> Self {
        RawSelection {
            bounds: [first, second],
            unit,
        }
    }
}

/// Ordered bounds sharing one unit; `lower <= upper` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralRegion {
    lower: f64,
    upper: f64,
    unit: Unit,
}

impl SpectralRegion {
    /// Orders the bounds.
    pub fn new(a: f64, b: f64, unit: Unit) -> Self {
        SpectralRegion {
            lower: a.min(b),
            upper: a.max(b),
            unit,
        }
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }
}

// ---------------------------------------------------------------------------
// Region → sample index mapping
// ---------------------------------------------------------------------------

/// Maps a region onto a spectrum's sample grid.
pub trait PixelMapper {
    /// Inclusive `(first, last)` sample indices covered by `region`, with
    /// `first <= last`. The region is expressed in the axis unit.
    fn to_indices(&self, region: &SpectralRegion, spectrum: &SpectrumData) -> Result<(usize, usize), MappingError>;
}

/// Picks the samples whose axis value lies inside the region. Works on
/// ascending and descending axes (a wavelength axis shown as frequency
/// runs backwards).
///
/// When no sample falls inside, both indices land on the sample nearest
/// the region start.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleGridMapper;

impl PixelMapper for SampleGridMapper {
    fn to_indices(&self, region: &SpectralRegion, spectrum: &SpectrumData) -> Result<(usize, usize), MappingError> {
        let axis = spectrum.spectral_axis();
        if !is_equivalent(region.unit(), axis.unit(), Equivalency::Identity, None) {
            return Err(MappingError::UnitMismatch {
                region: region.unit().to_string(),
                axis: axis.unit().to_string(),
            });
        }
        let values = axis.values();
        if values.is_empty() {
            return Err(MappingError::Empty);
        }

        let ascending = values.windows(2).all(|w| w[0] <= w[1]);
        let descending = values.windows(2).all(|w| w[0] >= w[1]);
        if !ascending && !descending {
            let at = values
                .windows(2)
                .position(|w| w[1] < w[0])
                .map_or(0, |i| i + 1);
            return Err(MappingError::NotMonotonic(at));
        }

        let inside = |v: f64| v >= region.lower() && v <= region.upper();
        let first = values.iter().position(|&v| inside(v));
        let last = values.iter().rposition(|&v| inside(v));
        match (first, last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => {
                let start = if ascending { region.lower() } else { region.upper() };
                let nearest = if ascending {
                    values.partition_point(|&v| v < start)
                } else {
                    values.partition_point(|&v| v > start)
                };
                let nearest = nearest.min(values.len() - 1);
                Ok((nearest, nearest))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Selection → region state machine
// ---------------------------------------------------------------------------

/// Selections rejected before they reach the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInput {
    Unitless,
    ZeroWidth,
    NonFinite,
}

impl DegenerateInput {
    pub fn message(self) -> &'static str {
        match self {
            DegenerateInput::Unitless => "Region has no units.",
            DegenerateInput::ZeroWidth => "Region has zero width.",
            DegenerateInput::NonFinite => "Region bounds are not finite.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRegion {
    /// Clipped to the data, in the spectral axis unit.
    pub region: SpectralRegion,
    /// Inclusive sample range.
    pub indices: (usize, usize),
    pub spectrum: SpectrumData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionState {
    /// No active selection.
    NoRegion,
    Degenerate(DegenerateInput),
    Valid(ResolvedRegion),
}

/// Turn the current selection into a region of `spectrum`.
///
/// Absent or degenerate selections are states, not errors; every other
/// failure is a [`RegionError`] and never yields a partial region.
pub fn resolve_selection(
    selection: Option<&RawSelection>,
    spectrum: &SpectrumData,
    mapper: &dyn PixelMapper,
) -> Result<RegionState, RegionError> {
    let Some(selection) = selection else {
        return Ok(RegionState::NoRegion);
    };
    let [a, b] = selection.bounds;
    if selection.unit.is_dimensionless() {
        return Ok(RegionState::Degenerate(DegenerateInput::Unitless));
    }
    if !a.is_finite() || !b.is_finite() {
        return Ok(RegionState::Degenerate(DegenerateInput::NonFinite));
    }
    if a == b {
        return Ok(RegionState::Degenerate(DegenerateInput::ZeroWidth));
    }

    let axis = spectrum.spectral_axis();
    if !is_equivalent(&selection.unit, axis.unit(), Equivalency::Identity, None) {
        return Err(RegionError::IncompatibleUnit);
    }
    let bounds = convert(&selection.bounds, &selection.unit, axis.unit(), Equivalency::Identity, None)
        .map_err(|_| RegionError::IncompatibleUnit)?;
    let mut region = SpectralRegion::new(bounds[0], bounds[1], axis.unit().clone());

    let (Some(min), Some(max)) = (axis.min(), axis.max()) else {
        return Err(RegionError::Extraction("spectrum has no samples".to_string()));
    };
    if region.lower > max || region.upper < min {
        return Err(RegionError::OutOfBounds);
    }
    region.lower = region.lower.max(min);
    region.upper = region.upper.min(max);

    let (first, last) = mapper
        .to_indices(&region, spectrum)
        .map_err(|e| RegionError::Extraction(e.to_string()))?;
    if first == last {
        return Err(RegionError::SingleSample);
    }
    if first > last || last >= spectrum.len() {
        return Err(RegionError::Extraction(format!(
            "indices {first}..={last} outside {} samples",
            spectrum.len()
        )));
    }

    Ok(RegionState::Valid(ResolvedRegion {
        spectrum: spectrum.extract(first, last),
        region,
        indices: (first, last),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::spectrum;

    fn unit(text: &str) -> Unit {
        Unit::parse(text).unwrap()
    }

    fn optical() -> SpectrumData {
        spectrum(
            vec![400.0, 500.0, 600.0, 700.0, 800.0, 900.0],
            "nm",
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            "Jy",
        )
    }

    fn resolve(selection: Option<RawSelection>) -> Result<RegionState, RegionError> {
        resolve_selection(selection.as_ref(), &optical(), &SampleGridMapper)
    }

    fn valid(state: RegionState) -> ResolvedRegion {
        match state {
            RegionState::Valid(resolved) => resolved,
            other => panic!("expected a region, got {other:?}"),
        }
    }

    #[test]
    fn test_no_selection() {
        assert_eq!(resolve(None), Ok(RegionState::NoRegion));
    }

    #[test]
    fn test_reversed_bounds_are_reordered() {
        let resolved = valid(resolve(Some(RawSelection::new(700.0, 400.0, unit("nm")))).unwrap());
        assert_eq!(resolved.region.lower(), 400.0);
        assert_eq!(resolved.region.upper(), 700.0);
        assert_eq!(resolved.indices, (0, 3));
        assert_eq!(resolved.spectrum.flux().values(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_region_is_clipped_to_data() {
        let resolved = valid(resolve(Some(RawSelection::new(750.0, 2000.0, unit("nm")))).unwrap());
        assert_eq!(resolved.region.upper(), 900.0);
        assert_eq!(resolved.indices, (4, 5));
    }

    #[test]
    fn test_selection_in_other_length_unit() {
        let resolved = valid(resolve(Some(RawSelection::new(4500.0, 6500.0, unit("AA")))).unwrap());
        assert_eq!(resolved.region.unit(), &unit("nm"));
        assert_eq!(resolved.indices, (1, 2));
    }

    #[test]
    fn test_equal_bounds_are_degenerate_before_mapping() {
        assert_eq!(
            resolve(Some(RawSelection::new(500.0, 500.0, unit("nm")))),
            Ok(RegionState::Degenerate(DegenerateInput::ZeroWidth))
        );
    }

    #[test]
    fn test_single_sample_after_mapping() {
        assert_eq!(
            resolve(Some(RawSelection::new(480.0, 520.0, unit("nm")))),
            Err(RegionError::SingleSample)
        );
        // between two samples: nothing inside
        assert_eq!(
            resolve(Some(RawSelection::new(510.0, 520.0, unit("nm")))),
            Err(RegionError::SingleSample)
        );
    }

    #[test]
    fn test_unitless_selection() {
        assert_eq!(
            resolve(Some(RawSelection::new(1.0, 2.0, Unit::dimensionless()))),
            Ok(RegionState::Degenerate(DegenerateInput::Unitless))
        );
    }

    #[test]
    fn test_incompatible_and_out_of_bounds() {
        assert_eq!(
            resolve(Some(RawSelection::new(1.0, 2.0, unit("THz")))),
            Err(RegionError::IncompatibleUnit)
        );
        assert_eq!(
            resolve(Some(RawSelection::new(1000.0, 1200.0, unit("nm")))),
            Err(RegionError::OutOfBounds)
        );
        assert_eq!(
            resolve(Some(RawSelection::new(100.0, 300.0, unit("nm")))),
            Err(RegionError::OutOfBounds)
        );
    }

    #[test]
    fn test_descending_axis() {
        let data = spectrum(vec![600.0, 500.0, 400.0, 300.0], "THz", vec![1.0, 2.0, 3.0, 4.0], "Jy");
        let selection = RawSelection::new(350.0, 550.0, unit("THz"));
        let resolved = valid(resolve_selection(Some(&selection), &data, &SampleGridMapper).unwrap());
        assert_eq!(resolved.indices, (1, 2));
        assert_eq!(resolved.spectrum.flux().values(), &[2.0, 3.0]);
    }

    #[test]
    fn test_non_monotonic_axis_fails_extraction() {
        let data = spectrum(vec![1.0, 3.0, 2.0, 4.0], "nm", vec![1.0; 4], "Jy");
        let selection = RawSelection::new(1.0, 4.0, unit("nm"));
        assert!(matches!(
            resolve_selection(Some(&selection), &data, &SampleGridMapper),
            Err(RegionError::Extraction(_))
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let selection = RawSelection::new(650.0, 420.0, unit("nm"));
        let data = optical();
        let first = resolve_selection(Some(&selection), &data, &SampleGridMapper).unwrap();
        let second = resolve_selection(Some(&selection), &data, &SampleGridMapper).unwrap();
        let (a, b) = (valid(first), valid(second));
        assert_eq!(a.region.lower().to_bits(), b.region.lower().to_bits());
        assert_eq!(a.region.upper().to_bits(), b.region.upper().to_bits());
        assert_eq!(a.indices, b.indices);
    }
}
