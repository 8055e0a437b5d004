use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::stats::Integration;
use crate::plot::palette::DEFAULT_COLORS;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "RUSTY_SPECVIZ_CONFIG";

/// Viewer settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Colors handed to new series, in order.
    pub palette: Vec<String>,
    pub default_line_width: f32,
    /// What the `total` statistic integrates over.
    pub integration: Integration,
    /// Whether newly loaded spectra start visible.
    pub show_new_series: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            palette: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
            default_line_width: 1.0,
            integration: Integration::default(),
            show_new_series: true,
        }
    }
}

impl ViewerConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Settings from [`CONFIG_ENV`], or defaults when unset or unreadable.
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return ViewerConfig::default();
        };
        match ViewerConfig::load_from_file(Path::new(&path)) {
            Ok(config) => {
                log::info!("loaded config from {path}");
                config
            }
            Err(e) => {
                log::warn!("{e:#}; using default settings");
                ViewerConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"integration": "spectral_axis", "default_line_width": 2.5}}"#).unwrap();
        let config = ViewerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.integration, Integration::SpectralAxis);
        assert_eq!(config.default_line_width, 2.5);
        assert_eq!(config.palette.len(), 7);
        assert!(config.show_new_series);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ViewerConfig::load_from_file(file.path()).is_err());
        assert!(ViewerConfig::load_from_file(Path::new("/no/such/config.json")).is_err());
    }
}
