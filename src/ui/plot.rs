use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, VLine};

use crate::analysis::region::RawSelection;
use crate::color::to_color32;
use crate::plot::series::Pen;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

const SELECTION_COLOR: Color32 = Color32::from_rgb(0xe6, 0x7e, 0x22);

fn axis_label(kind: &str, unit: Option<String>) -> String {
    match unit.filter(|u| !u.is_empty()) {
        Some(unit) => format!("{kind} [{unit}]"),
        None => kind.to_string(),
    }
}

/// Render the spectral plot. Shift-drag selects a spectral region.
pub fn spectral_plot(ui: &mut Ui, state: &mut AppState) {
    if state.plot.series().is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view spectra  (File → Open…)");
        });
        return;
    }

    let shift = ui.input(|i| i.modifiers.shift);
    let x_unit = state.plot.spectral_axis_unit().cloned();
    let y_label = axis_label("Flux", state.plot.data_unit().map(|u| u.to_string()));
    let x_label = axis_label("Spectral axis", x_unit.as_ref().map(|u| u.to_string()));

    let mut order: Vec<usize> = (0..state.plot.series().len()).collect();
    order.sort_by_key(|&i| state.plot.series()[i].zorder());

    let selection = state.plot.selection().map(|s| s.bounds);
    let mut anchor = state.drag_anchor;

    let dragged = Plot::new("spectral_plot")
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_boxed_zoom(!shift)
        .allow_drag(!shift)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &i in &order {
                let series = &state.plot.series()[i];
                let Pen::Solid { color, width } = series.pen() else {
                    continue;
                };
                let data = match series.render_data() {
                    Ok(data) => data,
                    Err(e) => {
                        log::debug!("not drawing '{}': {e}", series.name());
                        continue;
                    }
                };
                let name = series.name();
                for segment in data.segments() {
                    let line = Line::new(PlotPoints::from(segment))
                        .name(&name)
                        .color(to_color32(&color))
                        .width(width);
                    plot_ui.line(line);
                }
            }

            if let Some([a, b]) = selection {
                for x in [a, b] {
                    plot_ui.vline(VLine::new(x).color(SELECTION_COLOR).width(1.5));
                }
            }

            // (start, current) of a shift-drag in plot coordinates
            let response = plot_ui.response();
            let pointer = plot_ui.pointer_coordinate().map(|p| p.x);
            if shift && response.drag_started() {
                anchor = pointer;
            }
            match (anchor, pointer) {
                (Some(start), Some(end)) if shift && (response.dragged() || response.drag_stopped()) => {
                    Some((start, end, response.drag_stopped()))
                }
                _ => None,
            }
        })
        .inner;

    match (dragged, x_unit) {
        (Some((start, end, finished)), Some(unit)) => {
            state.set_selection(Some(RawSelection::new(start, end, unit)));
            state.drag_anchor = if finished { None } else { anchor };
        }
        _ => state.drag_anchor = anchor.filter(|_| shift),
    }
}
