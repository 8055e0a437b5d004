use thiserror::Error;

use super::model::{PlotError, PlotModel};
use super::series::DisplaySeries;
use crate::units::{CandidateList, Equivalency, Unit, UnitError, CUSTOM_ENTRY};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitChangeError {
    #[error("No custom units entered, units did not change")]
    EmptyCustom,

    #[error("Did not change units. {0}")]
    InvalidUnit(#[source] UnitError),

    #[error("'{0}' is not one of the offered units")]
    UnknownCandidate(String),

    #[error("Did not change units. {0}")]
    Incompatible(#[from] PlotError),

    #[error("The plot has no units to change")]
    NoUnits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Spectral,
    Data,
}

/// What the user picked for one axis: a listed title, or free text after
/// choosing [`CUSTOM_ENTRY`].
#[derive(Debug, Clone, PartialEq)]
pub enum UnitChoice {
    Listed(String),
    Custom(String),
}

impl UnitChoice {
    pub fn from_selection(title: &str, custom_text: &str) -> Self {
        if title == CUSTOM_ENTRY {
            UnitChoice::Custom(custom_text.to_string())
        } else {
            UnitChoice::Listed(title.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Live validation of the custom unit text box
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum CustomUnitStatus {
    Empty,
    Valid(String),
    Invalid { suggestion: Option<String> },
}

impl CustomUnitStatus {
    pub fn message(&self) -> String {
        match self {
            CustomUnitStatus::Empty => "Enter custom units".to_string(),
            CustomUnitStatus::Valid(text) => format!("{text} is Valid"),
            CustomUnitStatus::Invalid { suggestion: Some(s) } => format!("Invalid, try: {s}"),
            CustomUnitStatus::Invalid { suggestion: None } => "Invalid".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CustomUnitStatus::Invalid { .. })
    }
}

pub fn validate_custom(text: &str) -> CustomUnitStatus {
    if text.trim().is_empty() {
        return CustomUnitStatus::Empty;
    }
    match Unit::parse(text) {
        Ok(_) => CustomUnitStatus::Valid(text.to_string()),
        Err(e) => {
            log::debug!("{e}");
            match e {
                UnitError::InvalidUnit { suggestion, .. } => CustomUnitStatus::Invalid { suggestion },
                _ => CustomUnitStatus::Invalid { suggestion: None },
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dialog orchestration
// ---------------------------------------------------------------------------

/// Result of pressing OK: each axis either took its new unit or kept the
/// old one with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitChangeOutcome {
    pub data: Result<Unit, UnitChangeError>,
    pub spectral: Result<Unit, UnitChangeError>,
}

impl UnitChangeOutcome {
    pub fn succeeded(&self) -> bool {
        self.data.is_ok() && self.spectral.is_ok()
    }

    /// First failure, for the status line.
    pub fn failure(&self) -> Option<&UnitChangeError> {
        self.data.as_ref().err().or(self.spectral.as_ref().err())
    }
}

/// Unit candidates for both axes, captured when the dialog opens.
#[derive(Debug, Clone)]
pub struct UnitChangeDialog {
    spectral: CandidateList,
    data: CandidateList,
    current_spectral: String,
    current_data: String,
    accept_enabled: bool,
}

impl UnitChangeDialog {
    /// `reference` supplies the spectral axis that flux candidates are
    /// computed against. Without plot units or a reference series the
    /// dialog opens with OK disabled.
    pub fn open(plot: &PlotModel, reference: Option<&DisplaySeries>) -> Self {
        let (Some(spectral_unit), Some(data_unit), Some(reference)) =
            (plot.spectral_axis_unit(), plot.data_unit(), reference)
        else {
            return UnitChangeDialog {
                spectral: CandidateList::default(),
                data: CandidateList::default(),
                current_spectral: CUSTOM_ENTRY.to_string(),
                current_data: CUSTOM_ENTRY.to_string(),
                accept_enabled: false,
            };
        };

        let axis = reference.record().spectral_axis();
        let spectral = CandidateList::build(spectral_unit, Equivalency::Spectral, None);
        let data = CandidateList::build(data_unit, Equivalency::SpectralDensity, Some(&axis));
        let current_spectral = spectral
            .title_of(spectral_unit)
            .map(str::to_string)
            .unwrap_or_else(|| spectral_unit.humanize());
        let current_data = data
            .title_of(data_unit)
            .map(str::to_string)
            .unwrap_or_else(|| data_unit.humanize());

        UnitChangeDialog {
            spectral,
            data,
            current_spectral,
            current_data,
            accept_enabled: true,
        }
    }

    pub fn accept_enabled(&self) -> bool {
        self.accept_enabled
    }

    fn candidates(&self, axis: Axis) -> &CandidateList {
        match axis {
            Axis::Spectral => &self.spectral,
            Axis::Data => &self.data,
        }
    }

    /// Titles for the combo box, ending with [`CUSTOM_ENTRY`].
    pub fn titles(&self, axis: Axis) -> Vec<String> {
        self.candidates(axis).titles()
    }

    /// Title of the unit the plot currently shows on `axis`.
    pub fn current_title(&self, axis: Axis) -> &str {
        match axis {
            Axis::Spectral => &self.current_spectral,
            Axis::Data => &self.current_data,
        }
    }

    pub fn resolve(&self, axis: Axis, choice: &UnitChoice) -> Result<Unit, UnitChangeError> {
        match choice {
            UnitChoice::Custom(text) => {
                if text.trim().is_empty() {
                    return Err(UnitChangeError::EmptyCustom);
                }
                let unit = Unit::parse(text).map_err(UnitChangeError::InvalidUnit)?;
                if unit.is_dimensionless() {
                    return Err(UnitChangeError::EmptyCustom);
                }
                Ok(unit)
            }
            UnitChoice::Listed(title) => self
                .candidates(axis)
                .lookup(title)
                .cloned()
                .ok_or_else(|| UnitChangeError::UnknownCandidate(title.clone())),
        }
    }

    fn apply(&self, plot: &mut PlotModel, axis: Axis, choice: &UnitChoice) -> Result<Unit, UnitChangeError> {
        if !self.accept_enabled {
            return Err(UnitChangeError::NoUnits);
        }
        let unit = self.resolve(axis, choice)?;
        match axis {
            Axis::Spectral => plot.set_spectral_axis_unit(unit.clone())?,
            Axis::Data => plot.set_data_unit(unit.clone())?,
        }
        Ok(unit)
    }

    /// Apply the flux choice, then the spectral-axis choice. Each axis is
    /// all-or-nothing across the plot's series; a refusal on one axis
    /// does not undo the other.
    pub fn accept(&self, plot: &mut PlotModel, spectral: &UnitChoice, data: &UnitChoice) -> UnitChangeOutcome {
        let outcome = UnitChangeOutcome {
            data: self.apply(plot, Axis::Data, data),
            spectral: self.apply(plot, Axis::Spectral, spectral),
        };
        for (axis, result) in [("flux", &outcome.data), ("spectral axis", &outcome.spectral)] {
            match result {
                Ok(unit) => log::info!("{axis} unit set to '{unit}'"),
                Err(e) => log::warn!("{axis}: {e}"),
            }
        }
        outcome
    }
}
