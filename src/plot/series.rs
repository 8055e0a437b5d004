use std::rc::Rc;

use thiserror::Error;

use crate::data::model::{DataError, SpectrumData, SpectrumRecord};
use crate::observe::{Observers, Subscription};
use crate::units::{is_equivalent, Equivalency, Quantity, Unit, UnitError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Data(#[from] DataError),
}

// ---------------------------------------------------------------------------
// Render directives
// ---------------------------------------------------------------------------

/// Color of a pen as the renderer should read it.
#[derive(Debug, Clone, PartialEq)]
pub enum PenColor {
    /// Grayscale level, 0.0 black to 1.0 white.
    Gray(f64),
    /// Named color or `#rrggbb` hex.
    Named(String),
}

impl PenColor {
    /// Strings that parse as a float are grayscale levels.
    pub fn parse(color: &str) -> PenColor {
        match color.trim().parse::<f64>() {
            Ok(level) => PenColor::Gray(level),
            Err(_) => PenColor::Named(color.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pen {
    /// Draw nothing.
    None,
    Solid { color: PenColor, width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectMode {
    /// Break the line at NaN or infinite samples.
    SkipNonFinite,
}

/// Projected values handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub connect: ConnectMode,
}

impl RenderData {
    /// Runs of consecutive finite points, each drawn as one polyline.
    pub fn segments(&self) -> Vec<Vec<[f64; 2]>> {
        let mut segments = Vec::new();
        let mut current: Vec<[f64; 2]> = Vec::new();
        for (&x, &y) in self.x.iter().zip(&self.y) {
            if x.is_finite() && y.is_finite() {
                current.push([x, y]);
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

// ---------------------------------------------------------------------------
// DisplaySeries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesChange {
    DataUnit(Unit),
    SpectralAxisUnit(Unit),
    Color(String),
    Width(f32),
    ZOrder(i32),
    Visibility(bool),
}

/// One plotted view of a [`SpectrumRecord`] with its own display units.
///
/// Projection is recomputed from the record's current data on every call,
/// so a `set_data` on the record is seen by all of its series at once.
#[derive(Debug)]
pub struct DisplaySeries {
    record: Rc<SpectrumRecord>,
    data_unit: Unit,
    spectral_axis_unit: Unit,
    color: String,
    width: f32,
    zorder: i32,
    visible: bool,
    observers: Observers<SeriesChange>,
}

impl DisplaySeries {
    /// Starts hidden, in the record's native units.
    pub fn new(record: Rc<SpectrumRecord>, color: impl Into<String>) -> Self {
        let data = record.data();
        DisplaySeries {
            data_unit: data.flux().unit().clone(),
            spectral_axis_unit: data.spectral_axis().unit().clone(),
            record,
            color: color.into(),
            width: 1.0,
            zorder: 0,
            visible: false,
            observers: Observers::default(),
        }
    }

    pub fn record(&self) -> &Rc<SpectrumRecord> {
        &self.record
    }

    pub fn name(&self) -> String {
        self.record.name()
    }

    pub fn data_unit(&self) -> &Unit {
        &self.data_unit
    }

    pub fn spectral_axis_unit(&self) -> &Unit {
        &self.spectral_axis_unit
    }

    pub fn is_data_unit_compatible(&self, unit: &Unit) -> bool {
        let data = self.record.data();
        is_equivalent(
            data.flux().unit(),
            unit,
            Equivalency::SpectralDensity,
            Some(data.spectral_axis()),
        )
    }

    pub fn is_spectral_axis_unit_compatible(&self, unit: &Unit) -> bool {
        let data = self.record.data();
        is_equivalent(data.spectral_axis().unit(), unit, Equivalency::Spectral, None)
    }

    pub fn are_units_compatible(&self, spectral_axis_unit: &Unit, data_unit: &Unit) -> bool {
        self.is_data_unit_compatible(data_unit) && self.is_spectral_axis_unit_compatible(spectral_axis_unit)
    }

    /// Units unreachable from the native flux unit are refused and the
    /// current display unit is kept.
    pub fn set_data_unit(&mut self, unit: Unit) -> Result<(), UnitError> {
        if !self.is_data_unit_compatible(&unit) {
            return Err(UnitError::Incompatible {
                from: self.record.data().flux().unit().to_string(),
                to: unit.to_string(),
            });
        }
        self.data_unit = unit;
        self.observers.emit(&SeriesChange::DataUnit(self.data_unit.clone()));
        Ok(())
    }

    pub fn set_spectral_axis_unit(&mut self, unit: Unit) -> Result<(), UnitError> {
        if !self.is_spectral_axis_unit_compatible(&unit) {
            return Err(UnitError::Incompatible {
                from: self.record.data().spectral_axis().unit().to_string(),
                to: unit.to_string(),
            });
        }
        self.spectral_axis_unit = unit;
        self.observers
            .emit(&SeriesChange::SpectralAxisUnit(self.spectral_axis_unit.clone()));
        Ok(())
    }

    pub fn reset_units(&mut self) {
        let data = self.record.data();
        self.data_unit = data.flux().unit().clone();
        self.observers.emit(&SeriesChange::DataUnit(self.data_unit.clone()));
        self.spectral_axis_unit = data.spectral_axis().unit().clone();
        self.observers
            .emit(&SeriesChange::SpectralAxisUnit(self.spectral_axis_unit.clone()));
    }

    /// Native flux in the display data unit, converted per sample against
    /// the native spectral axis.
    pub fn projected_flux(&self) -> Result<Quantity, UnitError> {
        let data = self.record.data();
        data.flux()
            .to(&self.data_unit, Equivalency::SpectralDensity, Some(data.spectral_axis()))
    }

    pub fn projected_spectral_axis(&self) -> Result<Quantity, UnitError> {
        self.record
            .data()
            .spectral_axis()
            .to(&self.spectral_axis_unit, Equivalency::Spectral, None)
    }

    /// Both projections as one spectrum. The axis may be descending when
    /// the display unit inverts it (wavelength shown as frequency).
    pub fn projected_spectrum(&self) -> Result<SpectrumData, SeriesError> {
        Ok(SpectrumData::new(self.projected_spectral_axis()?, self.projected_flux()?)?)
    }

    pub fn render_data(&self) -> Result<RenderData, UnitError> {
        Ok(RenderData {
            x: self.projected_spectral_axis()?.values().to_vec(),
            y: self.projected_flux()?.values().to_vec(),
            connect: ConnectMode::SkipNonFinite,
        })
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
        self.observers.emit(&SeriesChange::Color(self.color.clone()));
        self.record.emit_appearance_changed();
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        self.observers.emit(&SeriesChange::Width(width));
        self.record.emit_appearance_changed();
    }

    pub fn zorder(&self) -> i32 {
        self.zorder
    }

    pub fn set_zorder(&mut self, zorder: i32) {
        self.zorder = zorder;
        self.observers.emit(&SeriesChange::ZOrder(zorder));
        self.record.emit_appearance_changed();
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Only this series is notified; the record is not.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.observers.emit(&SeriesChange::Visibility(visible));
    }

    pub fn pen(&self) -> Pen {
        if self.visible {
            Pen::Solid {
                color: PenColor::parse(&self.color),
                width: self.width,
            }
        } else {
            Pen::None
        }
    }

    pub fn on_change(&self, callback: impl Fn(&SeriesChange) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn remove_observer(&self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }
}
