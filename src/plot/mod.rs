/// Plotted series and the plot that owns them.
///
/// A [`series::DisplaySeries`] shows one shared record in display units;
/// [`model::PlotModel`] keeps those units the same across all of its
/// series, and [`unit_change`] drives changing them from the dialog.

pub mod model;
pub mod palette;
pub mod series;
pub mod unit_change;
