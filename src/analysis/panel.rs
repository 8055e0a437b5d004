use super::region::{resolve_selection, PixelMapper, RawSelection, RegionError, RegionState};
use super::stats::{compute_stats_with, Integration, Statistics};
use crate::data::model::SpectrumData;
use crate::plot::series::DisplaySeries;

/// Where statistics results and status lines go.
pub trait StatusSink {
    /// An empty message clears the status.
    fn set_status(&mut self, message: &str);
    /// `None` clears every statistic.
    fn set_statistics(&mut self, stats: Option<Statistics>);
}

/// Backing state of the statistics side panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsPanel {
    status: String,
    stats: Option<Statistics>,
}

impl StatisticsPanel {
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn stats(&self) -> Option<&Statistics> {
        self.stats.as_ref()
    }

    /// One row per statistic; values are blank while nothing is computed.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match &self.stats {
            Some(stats) => stats
                .entries()
                .iter()
                .map(|&(key, value)| (key, format_g(value, 6)))
                .collect(),
            None => STAT_KEYS.iter().map(|&key| (key, String::new())).collect(),
        }
    }
}

const STAT_KEYS: [&str; 8] = ["mean", "median", "stddev", "rms", "snr", "total", "maxval", "minval"];

impl StatusSink for StatisticsPanel {
    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
    }

    fn set_statistics(&mut self, stats: Option<Statistics>) {
        self.stats = stats;
    }
}

fn stats_of(spectrum: &SpectrumData, integration: Integration) -> Option<Statistics> {
    compute_stats_with(
        spectrum.flux().values(),
        Some(spectrum.spectral_axis().values()),
        integration,
    )
}

/// Recompute statistics of `target` over the current selection and report
/// them to `sink` together with one status line.
///
/// Statistics are taken from the series' projected spectrum, so the
/// selection is read in the plot's display units. After a unit change the
/// reported values (mean, total and the rest) are in the display units,
/// not the units the record stores. Every failure clears the statistics;
/// nothing stale is left behind.
pub fn update_statistics(
    sink: &mut dyn StatusSink,
    target: Option<&DisplaySeries>,
    selection: Option<&RawSelection>,
    mapper: &dyn PixelMapper,
    integration: Integration,
) -> Option<Statistics> {
    let Some(target) = target else {
        sink.set_status("No data selected.");
        sink.set_statistics(None);
        return None;
    };
    if !target.visible() {
        sink.set_status("");
        sink.set_statistics(None);
        return None;
    }

    let spectrum = match target.projected_spectrum() {
        Ok(spectrum) => spectrum,
        Err(e) => {
            log::warn!("cannot project '{}': {e}", target.name());
            sink.set_status(&RegionError::Extraction(e.to_string()).to_string());
            sink.set_statistics(None);
            return None;
        }
    };

    let (stats, status) = match resolve_selection(selection, &spectrum, mapper) {
        Ok(RegionState::NoRegion) => (stats_of(&spectrum, integration), format!("Data: {}", target.name())),
        Ok(RegionState::Valid(resolved)) => {
            let status = match selection {
                Some(raw) => region_status(&target.name(), raw),
                None => format!("Data: {}", target.name()),
            };
            (stats_of(&resolved.spectrum, integration), status)
        }
        Ok(RegionState::Degenerate(input)) => (None, input.message().to_string()),
        Err(e) => {
            if let RegionError::Extraction(reason) = &e {
                log::warn!("region extraction failed: {reason}");
            }
            (None, e.to_string())
        }
    };
    sink.set_status(&status);
    sink.set_statistics(stats);
    stats
}

/// Bounds are reported as drawn, before clipping to the data.
fn region_status(name: &str, raw: &RawSelection) -> String {
    let [a, b] = raw.bounds;
    format!(
        "Data: {name}\nRegion Max: {} {unit}\nRegion Min: {} {unit}",
        format_g(a.max(b), 5),
        format_g(a.min(b), 5),
        unit = raw.unit,
    )
}

/// `printf`-style `%g` with `significant` digits: fixed notation for
/// moderate exponents, scientific otherwise, trailing zeros dropped.
pub fn format_g(value: f64, significant: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let significant = significant.max(1);
    let scientific = format!("{:.*e}", significant - 1, value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= significant as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::region::SampleGridMapper;
    use crate::data::model::tests::spectrum;
    use crate::data::model::{RecordId, SpectrumRecord};
    use crate::units::Unit;
    use std::rc::Rc;

    fn visible_series() -> DisplaySeries {
        let record = SpectrumRecord::new(
            RecordId(0),
            "vega",
            spectrum(
                vec![400.0, 500.0, 600.0, 700.0, 800.0, 900.0],
                "nm",
                vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
                "Jy",
            ),
        )
        .unwrap();
        let mut series = DisplaySeries::new(Rc::new(record), "k");
        series.set_visible(true);
        series
    }

    fn nm(a: f64, b: f64) -> RawSelection {
        RawSelection::new(a, b, Unit::parse("nm").unwrap())
    }

    fn run(panel: &mut StatisticsPanel, series: Option<&DisplaySeries>, selection: Option<RawSelection>) {
        update_statistics(panel, series, selection.as_ref(), &SampleGridMapper, Integration::SampleIndex);
    }

    #[test]
    fn test_no_target() {
        let mut panel = StatisticsPanel::default();
        run(&mut panel, None, None);
        assert_eq!(panel.status(), "No data selected.");
        assert!(panel.stats().is_none());
        assert!(panel.rows().iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn test_whole_spectrum_without_selection() {
        let mut panel = StatisticsPanel::default();
        let series = visible_series();
        run(&mut panel, Some(&series), None);
        assert_eq!(panel.status(), "Data: vega");
        assert_eq!(panel.stats().map(|s| s.mean), Some(3.5));
    }

    #[test]
    fn test_region_statistics_and_status() {
        let mut panel = StatisticsPanel::default();
        let series = visible_series();
        run(&mut panel, Some(&series), Some(nm(700.0, 350.0)));
        assert_eq!(panel.status(), "Data: vega\nRegion Max: 700 nm\nRegion Min: 350 nm");
        let stats = panel.stats().unwrap();
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.total, 7.5);
    }

    #[test]
    fn test_failures_clear_previous_statistics() {
        let mut panel = StatisticsPanel::default();
        let series = visible_series();
        run(&mut panel, Some(&series), None);
        assert!(panel.stats().is_some());

        run(&mut panel, Some(&series), Some(nm(1000.0, 2000.0)));
        assert_eq!(panel.status(), "Region out of bound.");
        assert!(panel.stats().is_none());

        run(&mut panel, Some(&series), Some(nm(480.0, 520.0)));
        assert_eq!(panel.status(), "Region over single value.");

        run(&mut panel, Some(&series), Some(nm(500.0, 500.0)));
        assert_eq!(panel.status(), "Region has zero width.");

        let ghz = RawSelection::new(1.0, 2.0, Unit::parse("GHz").unwrap());
        run(&mut panel, Some(&series), Some(ghz));
        assert_eq!(
            panel.status(),
            "Region units are not compatible with selected data's spectral axis units."
        );
        assert!(panel.stats().is_none());
    }

    #[test]
    fn test_selection_in_display_units() {
        let mut panel = StatisticsPanel::default();
        let mut series = visible_series();
        series.set_spectral_axis_unit(Unit::parse("THz").unwrap()).unwrap();
        // 400 nm ≈ 749.5 THz, 600 nm ≈ 499.7 THz
        let selection = RawSelection::new(450.0, 800.0, Unit::parse("THz").unwrap());
        run(&mut panel, Some(&series), Some(selection));
        let stats = panel.stats().unwrap();
        assert_eq!(stats.minval, 1.0);
        assert_eq!(stats.maxval, 3.0);
    }

    #[test]
    fn test_hidden_series_clears_without_status() {
        let mut panel = StatisticsPanel::default();
        let mut series = visible_series();
        run(&mut panel, Some(&series), None);
        series.set_visible(false);
        run(&mut panel, Some(&series), None);
        assert_eq!(panel.status(), "");
        assert!(panel.stats().is_none());
    }

    #[test]
    fn test_format_g() {
        assert_eq!(format_g(700.0, 5), "700");
        assert_eq!(format_g(1234.5678, 5), "1234.6");
        assert_eq!(format_g(123456.0, 5), "1.2346e+05");
        assert_eq!(format_g(0.000025, 5), "2.5e-05");
        assert_eq!(format_g(0.5, 6), "0.5");
        assert_eq!(format_g(-2.0, 6), "-2");
        assert_eq!(format_g(0.0, 6), "0");
    }
}
