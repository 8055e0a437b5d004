use eframe::egui;
use rusty_specviz::app::SpecvizApp;
use rusty_specviz::config::ViewerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Specviz – Spectral Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(SpecvizApp::new(config)))),
    )
}
