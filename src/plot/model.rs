use thiserror::Error;

use super::series::DisplaySeries;
use crate::analysis::region::RawSelection;
use crate::data::model::RecordId;
use crate::units::{convert, Equivalency, Unit};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("{unit} is not compatible with '{series}'")]
    IncompatibleUnit { unit: String, series: String },

    #[error("'{series}' cannot be shown in {spectral_axis_unit} vs {data_unit}")]
    IncompatibleSeries {
        series: String,
        spectral_axis_unit: String,
        data_unit: String,
    },
}

/// One plot: its series and the display units they all share.
///
/// Units are plot-scoped. Setting one checks every series first and only
/// then pushes the unit to all of them, so a refused unit changes nothing.
#[derive(Debug, Default)]
pub struct PlotModel {
    series: Vec<DisplaySeries>,
    data_unit: Option<Unit>,
    spectral_axis_unit: Option<Unit>,
    selection: Option<RawSelection>,
}

impl PlotModel {
    pub fn series(&self) -> &[DisplaySeries] {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut [DisplaySeries] {
        &mut self.series
    }

    /// First series showing record `id`.
    pub fn find(&self, id: RecordId) -> Option<&DisplaySeries> {
        self.series.iter().find(|s| s.record().identifier() == id)
    }

    pub fn find_mut(&mut self, id: RecordId) -> Option<&mut DisplaySeries> {
        self.series.iter_mut().find(|s| s.record().identifier() == id)
    }

    pub fn data_unit(&self) -> Option<&Unit> {
        self.data_unit.as_ref()
    }

    pub fn spectral_axis_unit(&self) -> Option<&Unit> {
        self.spectral_axis_unit.as_ref()
    }

    /// The first series sets the plot units; later ones are switched to
    /// them, or refused when they cannot be shown in them.
    pub fn add_series(&mut self, mut series: DisplaySeries) -> Result<usize, PlotError> {
        if let (Some(spectral), Some(data)) = (self.spectral_axis_unit.clone(), self.data_unit.clone()) {
            let refused = PlotError::IncompatibleSeries {
                series: series.name(),
                spectral_axis_unit: spectral.to_string(),
                data_unit: data.to_string(),
            };
            if !series.are_units_compatible(&spectral, &data) {
                return Err(refused);
            }
            series
                .set_spectral_axis_unit(spectral)
                .map_err(|_| refused.clone())?;
            series.set_data_unit(data).map_err(|_| refused)?;
        } else {
            self.spectral_axis_unit = Some(series.spectral_axis_unit().clone());
            self.data_unit = Some(series.data_unit().clone());
        }
        log::debug!("added '{}' to plot", series.name());
        self.series.push(series);
        Ok(self.series.len() - 1)
    }

    /// Remove every series showing record `id`.
    pub fn remove_series(&mut self, id: RecordId) -> Vec<DisplaySeries> {
        let (removed, kept): (Vec<DisplaySeries>, Vec<DisplaySeries>) = std::mem::take(&mut self.series)
            .into_iter()
            .partition(|s| s.record().identifier() == id);
        self.series = kept;
        if self.series.is_empty() {
            self.data_unit = None;
            self.spectral_axis_unit = None;
            self.selection = None;
        }
        removed
    }

    pub fn set_data_unit(&mut self, unit: Unit) -> Result<(), PlotError> {
        if let Some(series) = self.series.iter().find(|s| !s.is_data_unit_compatible(&unit)) {
            log::warn!("{unit} not compatible with '{}'", series.name());
            return Err(PlotError::IncompatibleUnit {
                unit: unit.to_string(),
                series: series.name(),
            });
        }
        for series in &mut self.series {
            series
                .set_data_unit(unit.clone())
                .map_err(|_| PlotError::IncompatibleUnit {
                    unit: unit.to_string(),
                    series: series.name(),
                })?;
        }
        self.data_unit = Some(unit);
        Ok(())
    }

    /// Also carries an active selection over to the new unit.
    pub fn set_spectral_axis_unit(&mut self, unit: Unit) -> Result<(), PlotError> {
        if let Some(series) = self
            .series
            .iter()
            .find(|s| !s.is_spectral_axis_unit_compatible(&unit))
        {
            log::warn!("{unit} not compatible with '{}'", series.name());
            return Err(PlotError::IncompatibleUnit {
                unit: unit.to_string(),
                series: series.name(),
            });
        }
        for series in &mut self.series {
            series
                .set_spectral_axis_unit(unit.clone())
                .map_err(|_| PlotError::IncompatibleUnit {
                    unit: unit.to_string(),
                    series: series.name(),
                })?;
        }
        self.selection = self.selection.take().and_then(|sel| {
            match convert(&sel.bounds, &sel.unit, &unit, Equivalency::Spectral, None) {
                Ok(bounds) => Some(RawSelection::new(bounds[0], bounds[1], unit.clone())),
                Err(e) => {
                    log::debug!("dropping selection: {e}");
                    None
                }
            }
        });
        self.spectral_axis_unit = Some(unit);
        Ok(())
    }

    /// Push the record-native units back to every series and the plot.
    /// Only possible when all series share the same native units.
    pub fn reset_units(&mut self) -> Result<(), PlotError> {
        let Some(first) = self.series.first() else {
            return Ok(());
        };
        let data = first.record().data();
        let spectral = data.spectral_axis().unit().clone();
        let flux = data.flux().unit().clone();
        self.set_spectral_axis_unit(spectral)?;
        self.set_data_unit(flux)
    }

    pub fn selection(&self) -> Option<&RawSelection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<RawSelection>) {
        self.selection = selection;
    }
}
