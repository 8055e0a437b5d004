//! Unit-aware spectrum viewer: unit algebra, spectral records, plot-scoped
//! display units, region statistics and the egui shell around them.

pub mod analysis;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod observe;
pub mod plot;
pub mod state;
pub mod ui;
pub mod units;
