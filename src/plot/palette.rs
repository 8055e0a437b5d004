/// Flat-UI colors handed out to new series, in order.
pub const DEFAULT_COLORS: [&str; 7] = [
    "#000000", "#9b59b6", "#3498db", "#95a5a6", "#e74c3c", "#34495e", "#2ecc71",
];

/// Assigns colors to new series from a fixed ordered list, wrapping
/// around at the end. Each plot owns its own palette.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<String>,
    next: usize,
}

impl Default for ColorPalette {
    fn default() -> Self {
        ColorPalette::new(DEFAULT_COLORS.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorPalette {
    /// An empty list falls back to [`DEFAULT_COLORS`].
    pub fn new(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            log::warn!("empty palette, using defaults");
            return ColorPalette::default();
        }
        ColorPalette { colors, next: 0 }
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Color for the next series.
    pub fn next_color(&mut self) -> String {
        let color = self.colors[self.next % self.colors.len()].clone();
        self.next = (self.next + 1) % self.colors.len();
        color
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
