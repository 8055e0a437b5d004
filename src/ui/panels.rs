use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{to_color32, to_hex};
use crate::data::model::RecordId;
use crate::plot::series::PenColor;
use crate::plot::unit_change::Axis;
use crate::state::AppState;
use crate::units::CUSTOM_ENTRY;

// ---------------------------------------------------------------------------
// Left side panel – series list and statistics
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Spectra");
    ui.separator();

    if state.plot.series().is_empty() {
        ui.label("No spectra loaded.");
    }

    let mut remove: Option<RecordId> = None;
    let mut select: Option<RecordId> = None;

    ScrollArea::vertical()
        .max_height(ui.available_height() * 0.5)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            let current = state.current;
            for series in state.plot.series_mut() {
                let id = series.record().identifier();
                ui.horizontal(|ui: &mut Ui| {
                    let mut visible = series.visible();
                    if ui.checkbox(&mut visible, "").changed() {
                        series.set_visible(visible);
                    }
                    let swatch = to_color32(&PenColor::parse(series.color()));
                    let text = RichText::new(series.name()).color(swatch);
                    if ui.selectable_label(current == Some(id), text).clicked() {
                        select = Some(id);
                    }
                    if ui.small_button("✖").on_hover_text("Remove").clicked() {
                        remove = Some(id);
                    }
                });
            }
        });

    if let Some(id) = select {
        state.set_current(id);
    }
    if let Some(id) = remove {
        state.remove_record(id);
    }

    style_controls(ui, state);

    ui.separator();
    statistics_panel(ui, state);
}

/// Color, width and stacking of the selected series.
fn style_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(id) = state.current else {
        return;
    };
    let stacked = state.plot.series().len() > 1;
    let mut to_front = false;
    let Some(series) = state.plot.find_mut(id) else {
        return;
    };
    ui.horizontal(|ui: &mut Ui| {
        let mut color = to_color32(&PenColor::parse(series.color()));
        if ui.color_edit_button_srgba(&mut color).changed() {
            series.set_color(to_hex(color));
        }
        let mut width = series.width();
        if ui.add(egui::Slider::new(&mut width, 0.5..=5.0).text("width")).changed() {
            series.set_width(width);
        }
        to_front = ui.add_enabled(stacked, egui::Button::new("Bring to front")).clicked();
    });
    if to_front {
        state.bring_to_front(id);
    }
}

fn statistics_panel(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Statistics");
    egui::Grid::new("statistics_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (key, value) in state.statistics.rows() {
                ui.label(key);
                ui.monospace(value);
                ui.end_row();
            }
        });

    ui.add_space(4.0);
    if !state.statistics.status().is_empty() {
        ui.label(state.statistics.status());
    }

    ui.add_space(4.0);
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new("Shift-drag on the plot to select a region").weak());
    });
    if state.plot.selection().is_some() && ui.button("Clear region").clicked() {
        state.set_selection(None);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let has_units = state.plot.data_unit().is_some();
        if ui.add_enabled(has_units, egui::Button::new("Change units…")).clicked() {
            state.open_unit_dialog();
        }
        if ui.add_enabled(has_units, egui::Button::new("Reset units")).clicked() {
            state.reset_units();
        }

        ui.separator();
        ui.label(format!("{} spectra loaded", state.collection.len()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Unit dialog
// ---------------------------------------------------------------------------

fn unit_selector(ui: &mut Ui, state: &mut AppState, axis: Axis, label: &str) {
    let Some(dialog) = state.unit_dialog.as_mut() else {
        return;
    };
    let titles = dialog.dialog.titles(axis);
    ui.label(label);
    let selected = dialog.title_mut(axis);
    egui::ComboBox::from_id_salt(label)
        .selected_text(selected.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for title in titles {
                ui.selectable_value(selected, title.clone(), title);
            }
        });
    ui.end_row();

    if let Some(status) = dialog.custom_status(axis) {
        ui.label("");
        ui.vertical(|ui: &mut Ui| {
            ui.text_edit_singleline(dialog.custom_mut(axis));
            let color = if status.is_error() { Color32::RED } else { ui.visuals().weak_text_color() };
            ui.label(RichText::new(status.message()).color(color));
        });
        ui.end_row();
    }
}

/// Modal-style window for picking display units.
pub fn unit_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(dialog) = state.unit_dialog.as_ref() else {
        return;
    };
    let accept_enabled = dialog.dialog.accept_enabled();

    let mut open = true;
    let mut accept = false;
    let mut cancel = false;
    egui::Window::new("Change units")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("unit_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                unit_selector(ui, state, Axis::Spectral, "Spectral axis");
                unit_selector(ui, state, Axis::Data, "Flux");
            });
            ui.label(RichText::new(format!("Pick \"{CUSTOM_ENTRY}\" to type any unit")).weak());
            ui.separator();
            ui.horizontal(|ui: &mut Ui| {
                accept = ui.add_enabled(accept_enabled, egui::Button::new("OK")).clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });

    if accept {
        state.accept_unit_dialog();
    } else if cancel || !open {
        state.unit_dialog = None;
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectral data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
