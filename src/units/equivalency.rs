use super::unit::{Dimensions, Unit};
use super::{Quantity, UnitError};

/// Speed of light in vacuum, m / s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Planck constant, J s.
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Named rule-set that widens which units count as convertible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equivalency {
    /// Same physical type only (`nm` ↔ `Angstrom`).
    Identity,
    /// Wavelength ↔ frequency ↔ energy ↔ wavenumber.
    Spectral,
    /// F_ν ↔ F_λ ↔ νF_ν ↔ photon fluxes, given the spectral axis.
    SpectralDensity,
}

// ---------------------------------------------------------------------------
// Spectral: everything goes through frequency in Hz
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpectralKind {
    Wavelength,
    Frequency,
    Energy,
    Wavenumber,
}

fn spectral_kind(dims: Dimensions) -> Option<SpectralKind> {
    match (dims.length, dims.mass, dims.time, dims.photon) {
        (1, 0, 0, 0) => Some(SpectralKind::Wavelength),
        (0, 0, -1, 0) => Some(SpectralKind::Frequency),
        (2, 1, -2, 0) => Some(SpectralKind::Energy),
        (-1, 0, 0, 0) => Some(SpectralKind::Wavenumber),
        _ => None,
    }
}

fn to_hertz(kind: SpectralKind, si: f64) -> f64 {
    match kind {
        SpectralKind::Wavelength => SPEED_OF_LIGHT / si,
        SpectralKind::Frequency => si,
        SpectralKind::Energy => si / PLANCK,
        SpectralKind::Wavenumber => SPEED_OF_LIGHT * si,
    }
}

fn from_hertz(kind: SpectralKind, hz: f64) -> f64 {
    match kind {
        SpectralKind::Wavelength => SPEED_OF_LIGHT / hz,
        SpectralKind::Frequency => hz,
        SpectralKind::Energy => hz * PLANCK,
        SpectralKind::Wavenumber => hz / SPEED_OF_LIGHT,
    }
}

// ---------------------------------------------------------------------------
// Spectral density: flux forms go through F_ν, luminosity forms through L_ν
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DensityFamily {
    Flux,
    Luminosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DensityKind {
    /// W m-2 Hz-1
    PerFrequency(DensityFamily),
    /// W m-2 m-1
    PerWavelength(DensityFamily),
    /// W m-2 (νF_ν = λF_λ)
    Integrated(DensityFamily),
    /// photon s-1 m-2 m-1
    PhotonPerWavelength,
    /// photon s-1 m-2 Hz-1
    PhotonPerFrequency,
}

impl DensityKind {
    fn family(self) -> DensityFamily {
        match self {
            DensityKind::PerFrequency(f) | DensityKind::PerWavelength(f) | DensityKind::Integrated(f) => f,
            DensityKind::PhotonPerWavelength | DensityKind::PhotonPerFrequency => DensityFamily::Flux,
        }
    }
}

fn density_kind(dims: Dimensions) -> Option<DensityKind> {
    use DensityFamily::{Flux, Luminosity};
    match (dims.length, dims.mass, dims.time, dims.photon) {
        (0, 1, -2, 0) => Some(DensityKind::PerFrequency(Flux)),
        (-1, 1, -3, 0) => Some(DensityKind::PerWavelength(Flux)),
        (0, 1, -3, 0) => Some(DensityKind::Integrated(Flux)),
        (-3, 0, -1, 1) => Some(DensityKind::PhotonPerWavelength),
        (-2, 0, 0, 1) => Some(DensityKind::PhotonPerFrequency),
        (2, 1, -2, 0) => Some(DensityKind::PerFrequency(Luminosity)),
        (1, 1, -3, 0) => Some(DensityKind::PerWavelength(Luminosity)),
        (2, 1, -3, 0) => Some(DensityKind::Integrated(Luminosity)),
        _ => None,
    }
}

/// SI value of `kind` at wavelength `lambda` (m) → SI value per unit frequency.
fn to_per_frequency(kind: DensityKind, si: f64, lambda: f64) -> f64 {
    let nu = SPEED_OF_LIGHT / lambda;
    match kind {
        DensityKind::PerFrequency(_) => si,
        DensityKind::PerWavelength(_) => si * lambda * lambda / SPEED_OF_LIGHT,
        DensityKind::Integrated(_) => si / nu,
        DensityKind::PhotonPerWavelength => si * PLANCK * lambda,
        DensityKind::PhotonPerFrequency => si * PLANCK * nu,
    }
}

fn from_per_frequency(kind: DensityKind, f_nu: f64, lambda: f64) -> f64 {
    let nu = SPEED_OF_LIGHT / lambda;
    match kind {
        DensityKind::PerFrequency(_) => f_nu,
        DensityKind::PerWavelength(_) => f_nu * SPEED_OF_LIGHT / (lambda * lambda),
        DensityKind::Integrated(_) => f_nu * nu,
        DensityKind::PhotonPerWavelength => f_nu / (PLANCK * lambda),
        DensityKind::PhotonPerFrequency => f_nu / (PLANCK * nu),
    }
}

fn density_pair(a: &Unit, b: &Unit) -> Option<(DensityKind, DensityKind)> {
    let from = density_kind(a.dimensions())?;
    let to = density_kind(b.dimensions())?;
    (from.family() == to.family()).then_some((from, to))
}

/// Wavelengths in metres for every sample of a spectral-axis quantity.
fn wavelengths(context: &Quantity) -> Result<Vec<f64>, UnitError> {
    let unit = context.unit();
    let kind = spectral_kind(unit.dimensions())
        .ok_or_else(|| UnitError::InvalidContext(unit.to_string()))?;
    Ok(context
        .values()
        .iter()
        .map(|v| from_hertz(SpectralKind::Wavelength, to_hertz(kind, v * unit.scale())))
        .collect())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Whether a value in `a` can be re-expressed in `b` under `equivalency`.
///
/// The empty unit on either side is always compatible. `SpectralDensity`
/// only widens the check when a spectral-axis `context` is supplied.
pub fn is_equivalent(a: &Unit, b: &Unit, equivalency: Equivalency, context: Option<&Quantity>) -> bool {
    if a.is_dimensionless() || b.is_dimensionless() {
        return true;
    }
    if a.dimensions() == b.dimensions() {
        return true;
    }
    match equivalency {
        Equivalency::Identity => false,
        Equivalency::Spectral => {
            spectral_kind(a.dimensions()).is_some() && spectral_kind(b.dimensions()).is_some()
        }
        Equivalency::SpectralDensity => {
            context.is_some_and(|ctx| spectral_kind(ctx.unit().dimensions()).is_some())
                && density_pair(a, b).is_some()
        }
    }
}

/// Convert `values` from `from` to `to`.
///
/// For `SpectralDensity` the context must hold one value per element of
/// `values`, or a single value applied to all of them.
pub fn convert(
    values: &[f64],
    from: &Unit,
    to: &Unit,
    equivalency: Equivalency,
    context: Option<&Quantity>,
) -> Result<Vec<f64>, UnitError> {
    if from.is_dimensionless() || to.is_dimensionless() {
        return Ok(values.to_vec());
    }
    let incompatible = || UnitError::Incompatible {
        from: from.to_string(),
        to: to.to_string(),
    };

    if from.dimensions() == to.dimensions() {
        let ratio = from.scale() / to.scale();
        return Ok(values.iter().map(|v| v * ratio).collect());
    }

    match equivalency {
        Equivalency::Identity => Err(incompatible()),
        Equivalency::Spectral => {
            let (Some(src), Some(dst)) = (spectral_kind(from.dimensions()), spectral_kind(to.dimensions()))
            else {
                return Err(incompatible());
            };
            Ok(values
                .iter()
                .map(|v| from_hertz(dst, to_hertz(src, v * from.scale())) / to.scale())
                .collect())
        }
        Equivalency::SpectralDensity => {
            let (src, dst) = density_pair(from, to).ok_or_else(incompatible)?;
            let context = context.ok_or_else(incompatible)?;
            let lambdas = wavelengths(context)?;
            let lambda_at = |i: usize| -> f64 {
                if lambdas.len() == 1 {
                    lambdas[0]
                } else {
                    lambdas[i]
                }
            };
            if lambdas.len() != 1 && lambdas.len() != values.len() {
                return Err(UnitError::ContextLength {
                    context: lambdas.len(),
                    values: values.len(),
                });
            }
            Ok(values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let lambda = lambda_at(i);
                    let f_nu = to_per_frequency(src, v * from.scale(), lambda);
                    from_per_frequency(dst, f_nu, lambda) / to.scale()
                })
                .collect())
        }
    }
}

const SPECTRAL_CATALOG: &[&str] = &[
    "Angstrom", "nm", "micron", "mm", "cm", "m", "Hz", "kHz", "MHz", "GHz", "THz", "eV", "keV",
    "J", "erg", "1 / cm", "1 / m",
];

const DENSITY_CATALOG: &[&str] = &[
    "Jy",
    "mJy",
    "uJy",
    "W / (Hz m2)",
    "erg / (Hz cm2 s)",
    "W / m3",
    "W / (m2 nm)",
    "W / (m2 micron)",
    "erg / (Angstrom cm2 s)",
    "W / m2",
    "erg / (cm2 s)",
    "photon / (Angstrom cm2 s)",
    "photon / (Hz cm2 s)",
    "W / Hz",
    "erg / (Hz s)",
    "W / m",
    "erg / (Angstrom s)",
    "W",
    "erg / s",
];

/// Every catalog unit reachable from `unit`, in catalog order, with `unit`
/// itself appended when the catalog does not already contain it.
pub fn find_equivalent_units(unit: &Unit, equivalency: Equivalency, context: Option<&Quantity>) -> Vec<Unit> {
    if unit.is_dimensionless() {
        return vec![unit.clone()];
    }
    let catalog: Vec<&str> = match equivalency {
        Equivalency::Spectral => SPECTRAL_CATALOG.to_vec(),
        Equivalency::SpectralDensity => DENSITY_CATALOG.to_vec(),
        Equivalency::Identity => SPECTRAL_CATALOG.iter().chain(DENSITY_CATALOG).copied().collect(),
    };
    let mut found: Vec<Unit> = catalog
        .into_iter()
        .filter_map(|text| Unit::parse(text).ok())
        .filter(|candidate| is_equivalent(unit, candidate, equivalency, context))
        .collect();
    if !found.contains(unit) {
        found.push(unit.clone());
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(text: &str) -> Unit {
        Unit::parse(text).unwrap()
    }

    fn axis_nm() -> Quantity {
        Quantity::new(vec![500.0, 600.0], unit("nm"))
    }

    #[test]
    fn test_same_type_scales() {
        let out = convert(&[5000.0], &unit("AA"), &unit("nm"), Equivalency::Identity, None).unwrap();
        assert_relative_eq!(out[0], 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_spectral_wavelength_to_frequency_and_energy() {
        let hz = convert(&[500.0], &unit("nm"), &unit("THz"), Equivalency::Spectral, None).unwrap();
        assert_relative_eq!(hz[0], 599.584_916, max_relative = 1e-8);

        let ev = convert(&[1.0], &unit("micron"), &unit("eV"), Equivalency::Spectral, None).unwrap();
        assert_relative_eq!(ev[0], 1.239_841_98, max_relative = 1e-8);

        let wn = convert(&[1.0], &unit("micron"), &unit("1 / cm"), Equivalency::Spectral, None).unwrap();
        assert_relative_eq!(wn[0], 10_000.0, max_relative = 1e-10);
    }

    #[test]
    fn test_spectral_requires_equivalency() {
        assert!(!is_equivalent(&unit("nm"), &unit("Hz"), Equivalency::Identity, None));
        assert!(is_equivalent(&unit("nm"), &unit("Hz"), Equivalency::Spectral, None));
        assert!(convert(&[1.0], &unit("nm"), &unit("Hz"), Equivalency::Identity, None).is_err());
    }

    #[test]
    fn test_spectral_density_needs_context() {
        let fnu = unit("Jy");
        let flam = unit("erg / (s cm2 AA)");
        assert!(!is_equivalent(&fnu, &flam, Equivalency::SpectralDensity, None));
        assert!(is_equivalent(&fnu, &flam, Equivalency::SpectralDensity, Some(&axis_nm())));
        assert!(convert(&[1.0], &fnu, &flam, Equivalency::SpectralDensity, None).is_err());
    }

    #[test]
    fn test_jansky_to_flambda() {
        // 1 Jy at 5000 Angstrom is 1.19917e-12 erg / (s cm2 Angstrom)
        let axis = Quantity::new(vec![5000.0], unit("AA"));
        let out = convert(
            &[1.0],
            &unit("Jy"),
            &unit("erg / (s cm2 AA)"),
            Equivalency::SpectralDensity,
            Some(&axis),
        )
        .unwrap();
        assert_relative_eq!(out[0], 1.199_169_8e-12, max_relative = 1e-6);

        let back = convert(
            &out,
            &unit("erg / (s cm2 AA)"),
            &unit("Jy"),
            Equivalency::SpectralDensity,
            Some(&axis),
        )
        .unwrap();
        assert_relative_eq!(back[0], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_density_uses_each_sample_wavelength() {
        let axis = Quantity::new(vec![1.0, 2.0], unit("micron"));
        let out = convert(
            &[1.0, 1.0],
            &unit("W / (m2 micron)"),
            &unit("W / m2"),
            Equivalency::SpectralDensity,
            Some(&axis),
        )
        .unwrap();
        // λF_λ
        assert_relative_eq!(out[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(out[1], 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_photon_flux_round_trip() {
        let axis = axis_nm();
        let photlam = unit("photon / (s cm2 AA)");
        let flam = unit("erg / (s cm2 AA)");
        let energy = convert(&[1.0, 1.0], &photlam, &flam, Equivalency::SpectralDensity, Some(&axis)).unwrap();
        // hc/λ in erg at 500 nm
        assert_relative_eq!(energy[0], 3.972_891e-12, max_relative = 1e-6);
        let photons = convert(&energy, &flam, &photlam, Equivalency::SpectralDensity, Some(&axis)).unwrap();
        assert_relative_eq!(photons[1], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_context_length_mismatch() {
        let axis = Quantity::new(vec![1.0, 2.0, 3.0], unit("micron"));
        let err = convert(&[1.0, 2.0], &unit("Jy"), &unit("W / m2"), Equivalency::SpectralDensity, Some(&axis));
        assert_eq!(err, Err(UnitError::ContextLength { context: 3, values: 2 }));
    }

    #[test]
    fn test_flux_and_luminosity_do_not_mix() {
        assert!(!is_equivalent(&unit("Jy"), &unit("W / Hz"), Equivalency::SpectralDensity, Some(&axis_nm())));
        assert!(is_equivalent(&unit("W / Hz"), &unit("erg / (s AA)"), Equivalency::SpectralDensity, Some(&axis_nm())));
    }

    #[test]
    fn test_empty_unit_is_compatible_with_anything() {
        let empty = Unit::dimensionless();
        assert!(is_equivalent(&empty, &unit("Jy"), Equivalency::Identity, None));
        assert!(is_equivalent(&unit("nm"), &empty, Equivalency::Spectral, None));
        assert_eq!(convert(&[3.0], &empty, &unit("Jy"), Equivalency::Identity, None).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_is_equivalent_is_symmetric() {
        let axis = axis_nm();
        let units: Vec<Unit> = SPECTRAL_CATALOG.iter().chain(DENSITY_CATALOG).map(|t| unit(t)).collect();
        for eq in [Equivalency::Identity, Equivalency::Spectral, Equivalency::SpectralDensity] {
            for ctx in [None, Some(&axis)] {
                for a in &units {
                    for b in &units {
                        assert_eq!(is_equivalent(a, b, eq, ctx), is_equivalent(b, a, eq, ctx), "{a} vs {b} ({eq:?})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_find_equivalent_units() {
        let spectral = find_equivalent_units(&unit("nm"), Equivalency::Spectral, None);
        assert_eq!(spectral.len(), SPECTRAL_CATALOG.len());
        assert_eq!(spectral[0], unit("Angstrom"));

        let lengths = find_equivalent_units(&unit("nm"), Equivalency::Identity, None);
        assert!(lengths.iter().all(|u| u.dimensions() == unit("m").dimensions()));

        let fluxes = find_equivalent_units(&unit("Jy"), Equivalency::SpectralDensity, Some(&axis_nm()));
        assert!(fluxes.contains(&unit("photon / (s cm2 AA)")));
        assert!(!fluxes.contains(&unit("W / Hz")));

        let custom = unit("1e-17 erg / (s cm2 AA)");
        let with_self = find_equivalent_units(&custom, Equivalency::SpectralDensity, Some(&axis_nm()));
        assert_eq!(with_self.last(), Some(&custom));
    }
}
