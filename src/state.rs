use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use crate::analysis::panel::{update_statistics, StatisticsPanel};
use crate::analysis::region::{RawSelection, SampleGridMapper};
use crate::config::ViewerConfig;
use crate::data::loader::load_file;
use crate::data::model::{DataCollection, RecordId, SpectrumRecord};
use crate::plot::model::PlotModel;
use crate::plot::palette::ColorPalette;
use crate::plot::series::DisplaySeries;
use crate::plot::unit_change::{validate_custom, Axis, CustomUnitStatus, UnitChangeDialog, UnitChoice};
use crate::units::CUSTOM_ENTRY;

// ---------------------------------------------------------------------------
// Unit dialog state
// ---------------------------------------------------------------------------

/// Widget values of the open unit dialog.
#[derive(Debug, Clone)]
pub struct UnitDialogState {
    pub dialog: UnitChangeDialog,
    pub spectral_title: String,
    pub data_title: String,
    pub spectral_custom: String,
    pub data_custom: String,
}

impl UnitDialogState {
    fn new(dialog: UnitChangeDialog) -> Self {
        UnitDialogState {
            spectral_title: dialog.current_title(Axis::Spectral).to_string(),
            data_title: dialog.current_title(Axis::Data).to_string(),
            dialog,
            spectral_custom: String::new(),
            data_custom: String::new(),
        }
    }

    pub fn title_mut(&mut self, axis: Axis) -> &mut String {
        match axis {
            Axis::Spectral => &mut self.spectral_title,
            Axis::Data => &mut self.data_title,
        }
    }

    pub fn custom_mut(&mut self, axis: Axis) -> &mut String {
        match axis {
            Axis::Spectral => &mut self.spectral_custom,
            Axis::Data => &mut self.data_custom,
        }
    }

    /// Live check of the custom text box, `None` while a listed unit is picked.
    pub fn custom_status(&self, axis: Axis) -> Option<CustomUnitStatus> {
        let (title, custom) = match axis {
            Axis::Spectral => (&self.spectral_title, &self.spectral_custom),
            Axis::Data => (&self.data_title, &self.data_custom),
        };
        (title == CUSTOM_ENTRY).then(|| validate_custom(custom))
    }

    fn choice(&self, axis: Axis) -> UnitChoice {
        match axis {
            Axis::Spectral => UnitChoice::from_selection(&self.spectral_title, &self.spectral_custom),
            Axis::Data => UnitChoice::from_selection(&self.data_title, &self.data_custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Every loaded spectrum.
    pub collection: DataCollection,

    /// The single plot and its shared display units.
    pub plot: PlotModel,

    palette: ColorPalette,

    /// Series the statistics panel reports on.
    pub current: Option<RecordId>,

    pub statistics: StatisticsPanel,

    pub unit_dialog: Option<UnitDialogState>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Plot x coordinate where the current shift-drag started.
    pub drag_anchor: Option<f64>,

    /// Set by record and series observers; statistics are recomputed when set.
    stale: Rc<Cell<bool>>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            palette: ColorPalette::new(config.palette.clone()),
            config,
            collection: DataCollection::default(),
            plot: PlotModel::default(),
            current: None,
            statistics: StatisticsPanel::default(),
            unit_dialog: None,
            status_message: None,
            drag_anchor: None,
            stale: Rc::new(Cell::new(true)),
        }
    }

    fn mark_stale(&self) {
        self.stale.set(true);
    }

    pub fn open_file(&mut self, path: &Path) {
        match load_file(path, &mut self.collection) {
            Ok(records) => {
                log::info!("Loaded {} spectra from {}", records.len(), path.display());
                self.status_message = None;
                self.plot_records(records);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Add a series per record. Records whose units the plot cannot show
    /// stay loaded but unplotted.
    pub fn plot_records(&mut self, records: Vec<Rc<SpectrumRecord>>) {
        for record in records {
            let stale = Rc::clone(&self.stale);
            record.on_change(move |_| stale.set(true));

            let mut series = DisplaySeries::new(Rc::clone(&record), self.palette.next_color());
            series.set_width(self.config.default_line_width);
            series.set_visible(self.config.show_new_series);
            let stale = Rc::clone(&self.stale);
            series.on_change(move |_| stale.set(true));

            match self.plot.add_series(series) {
                Ok(_) => {
                    self.current.get_or_insert(record.identifier());
                }
                Err(e) => {
                    log::warn!("{e}");
                    self.status_message = Some(e.to_string());
                }
            }
        }
        self.mark_stale();
    }

    pub fn remove_record(&mut self, id: RecordId) {
        self.plot.remove_series(id);
        self.collection.remove(id);
        if self.current == Some(id) {
            self.current = self.plot.series().first().map(|s| s.record().identifier());
        }
        self.mark_stale();
    }

    pub fn current_series(&self) -> Option<&DisplaySeries> {
        self.current.and_then(|id| self.plot.find(id))
    }

    pub fn set_current(&mut self, id: RecordId) {
        self.current = Some(id);
        self.mark_stale();
    }

    /// Draw `id` above every other series.
    pub fn bring_to_front(&mut self, id: RecordId) {
        let top = self
            .plot
            .series()
            .iter()
            .filter(|s| s.record().identifier() != id)
            .map(|s| s.zorder())
            .max();
        if let (Some(top), Some(series)) = (top, self.plot.find_mut(id)) {
            if series.zorder() <= top {
                series.set_zorder(top + 1);
            }
        }
    }

    pub fn set_selection(&mut self, selection: Option<RawSelection>) {
        self.plot.set_selection(selection);
        self.mark_stale();
    }

    /// Recompute statistics if anything they depend on changed.
    pub fn refresh_statistics(&mut self) {
        if !self.stale.replace(false) {
            return;
        }
        let target = self.current.and_then(|id| self.plot.find(id));
        update_statistics(
            &mut self.statistics,
            target,
            self.plot.selection(),
            &SampleGridMapper,
            self.config.integration,
        );
    }

    pub fn open_unit_dialog(&mut self) {
        let dialog = UnitChangeDialog::open(&self.plot, self.current_series());
        self.unit_dialog = Some(UnitDialogState::new(dialog));
    }

    /// Apply the dialog's choices and close it.
    pub fn accept_unit_dialog(&mut self) {
        let Some(state) = self.unit_dialog.take() else {
            return;
        };
        let outcome = state.dialog.accept(
            &mut self.plot,
            &state.choice(Axis::Spectral),
            &state.choice(Axis::Data),
        );
        self.status_message = outcome.failure().map(|e| e.to_string());
        self.mark_stale();
    }

    pub fn reset_units(&mut self) {
        if let Err(e) = self.plot.reset_units() {
            log::warn!("{e}");
            self.status_message = Some(e.to_string());
        }
        self.mark_stale();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::spectrum;
    use crate::units::Unit;

    fn state_with_one_spectrum() -> AppState {
        let mut state = AppState::default();
        let id = state.collection.next_identifier();
        let record = state.collection.add(
            SpectrumRecord::new(
                id,
                "vega",
                spectrum(vec![400.0, 500.0, 600.0], "nm", vec![1.0, 2.0, 3.0], "Jy"),
            )
            .unwrap(),
        );
        state.plot_records(vec![record]);
        state
    }

    #[test]
    fn test_new_records_are_plotted_with_palette_colors() {
        let state = state_with_one_spectrum();
        let series = state.current_series().unwrap();
        assert_eq!(series.color(), "#000000");
        assert!(series.visible());
    }

    #[test]
    fn test_statistics_follow_selection_and_data() {
        let mut state = state_with_one_spectrum();
        state.refresh_statistics();
        assert_eq!(state.statistics.status(), "Data: vega");

        state.set_selection(Some(RawSelection::new(450.0, 700.0, Unit::parse("nm").unwrap())));
        state.refresh_statistics();
        assert_eq!(state.statistics.stats().map(|s| s.mean), Some(2.5));

        let record = state.collection.get(RecordId(0)).cloned().unwrap();
        record
            .set_data(spectrum(vec![400.0, 500.0, 600.0], "nm", vec![10.0, 20.0, 40.0], "Jy"))
            .unwrap();
        state.refresh_statistics();
        assert_eq!(state.statistics.stats().map(|s| s.mean), Some(30.0));
    }

    #[test]
    fn test_unit_dialog_round_trip() {
        let mut state = state_with_one_spectrum();
        state.open_unit_dialog();
        let dialog = state.unit_dialog.as_mut().unwrap();
        *dialog.title_mut(Axis::Data) = CUSTOM_ENTRY.to_string();
        *dialog.custom_mut(Axis::Data) = "mJy".to_string();
        assert_eq!(
            dialog.custom_status(Axis::Data),
            Some(CustomUnitStatus::Valid("mJy".to_string()))
        );
        state.accept_unit_dialog();
        assert!(state.status_message.is_none());
        assert_eq!(state.plot.data_unit(), Some(&Unit::parse("mJy").unwrap()));

        state.refresh_statistics();
        let maxval = state.statistics.stats().unwrap().maxval;
        approx::assert_relative_eq!(maxval, 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_bring_to_front_raises_above_others() {
        let mut state = state_with_one_spectrum();
        let id = state.collection.next_identifier();
        let record = state.collection.add(
            SpectrumRecord::new(id, "deneb", spectrum(vec![400.0, 500.0], "nm", vec![1.0, 1.0], "Jy")).unwrap(),
        );
        state.plot_records(vec![record]);

        state.bring_to_front(RecordId(0));
        let zorder = |state: &AppState, id| state.plot.find(id).unwrap().zorder();
        assert!(zorder(&state, RecordId(0)) > zorder(&state, id));

        let before = zorder(&state, RecordId(0));
        state.bring_to_front(RecordId(0));
        assert_eq!(zorder(&state, RecordId(0)), before);
    }

    #[test]
    fn test_removing_current_record() {
        let mut state = state_with_one_spectrum();
        state.remove_record(RecordId(0));
        assert!(state.current_series().is_none());
        state.refresh_statistics();
        assert_eq!(state.statistics.status(), "No data selected.");
    }
}
