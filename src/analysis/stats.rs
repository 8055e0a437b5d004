use serde::{Deserialize, Serialize};

/// What `total` integrates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// Trapezoidal rule with unit spacing between samples.
    #[default]
    SampleIndex,
    /// Trapezoidal rule over the spectral axis values.
    SpectralAxis,
}

/// Summary of a run of flux values. Always complete; a failed computation
/// yields no `Statistics` at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub stddev: f64,
    pub rms: f64,
    /// `mean / rms`. A placeholder, not a real noise estimate.
    pub snr: f64,
    pub total: f64,
    pub maxval: f64,
    pub minval: f64,
}

impl Statistics {
    /// `(key, value)` pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("mean", self.mean),
            ("median", self.median),
            ("stddev", self.stddev),
            ("rms", self.rms),
            ("snr", self.snr),
            ("total", self.total),
            ("maxval", self.maxval),
            ("minval", self.minval),
        ]
    }
}

/// Statistics over `flux` with `total` taken over sample index.
pub fn compute_stats(flux: &[f64]) -> Option<Statistics> {
    compute_stats_with(flux, None, Integration::SampleIndex)
}

/// `axis` is only read for [`Integration::SpectralAxis`] and must match
/// `flux` in length; without it the sample index is used.
pub fn compute_stats_with(flux: &[f64], axis: Option<&[f64]>, integration: Integration) -> Option<Statistics> {
    if flux.is_empty() {
        return None;
    }
    let n = flux.len() as f64;
    let mean = flux.iter().sum::<f64>() / n;
    let variance = flux.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let rms = (flux.iter().map(|v| v * v).sum::<f64>() / n).sqrt();

    let mut sorted = flux.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let total = match (integration, axis) {
        (Integration::SpectralAxis, Some(axis)) if axis.len() == flux.len() => trapezoid(flux, axis),
        (Integration::SpectralAxis, _) => {
            log::debug!("no matching spectral axis, integrating over sample index");
            trapezoid_unit(flux)
        }
        (Integration::SampleIndex, _) => trapezoid_unit(flux),
    };

    Some(Statistics {
        mean,
        median,
        stddev: variance.sqrt(),
        rms,
        snr: mean / rms,
        total,
        maxval: sorted[sorted.len() - 1],
        minval: sorted[0],
    })
}

fn trapezoid_unit(y: &[f64]) -> f64 {
    y.windows(2).map(|w| (w[0] + w[1]) / 2.0).sum()
}

fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_to_five() {
        let stats = compute_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.minval, 1.0);
        assert_eq!(stats.maxval, 5.0);
        assert_eq!(stats.total, 12.0);
        assert_relative_eq!(stats.stddev, 2f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(stats.rms, 11f64.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(stats.snr, 0.904_534, max_relative = 1e-5);
    }

    #[test]
    fn test_empty_is_absent() {
        assert!(compute_stats(&[]).is_none());
    }

    #[test]
    fn test_even_length_median_and_order_independence() {
        let stats = compute_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.minval, 1.0);
        assert_eq!(stats.maxval, 4.0);
    }

    #[test]
    fn test_single_value() {
        let stats = compute_stats(&[7.0]).unwrap();
        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.snr, 1.0);
    }

    #[test]
    fn test_spectral_axis_integration() {
        let flux = [1.0, 2.0, 3.0, 4.0, 5.0];
        let axis = [0.0, 2.0, 4.0, 6.0, 8.0];
        let stats = compute_stats_with(&flux, Some(&axis), Integration::SpectralAxis).unwrap();
        assert_relative_eq!(stats.total, 24.0, max_relative = 1e-12);

        let fallback = compute_stats_with(&flux, Some(&axis[..2]), Integration::SpectralAxis).unwrap();
        assert_eq!(fallback.total, 12.0);
    }

    #[test]
    fn test_integration_config_names() {
        let parsed: Integration = serde_json::from_str("\"spectral_axis\"").unwrap();
        assert_eq!(parsed, Integration::SpectralAxis);
        assert_eq!(Integration::default(), Integration::SampleIndex);
    }
}
