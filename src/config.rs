//! Configuration loaded from ~/.oneshot/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Interpreter and CLI settings. Every field falls back to its default when
/// absent from the YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Surface pixels per grid unit.
    pub grid_scale: f64,
    /// Font passed to the surface for TEXT.
    pub font: String,
    /// Sample rate for WAV rendering.
    pub sample_rate: u32,
    /// Seed for RANDOM. None = seeded from entropy.
    pub seed: Option<u64>,
    /// Pace the shared clock against the wall clock.
    pub realtime: bool,
    /// How long the CLI keeps background playback going after the script ends.
    pub linger_ms: u64,
    /// Silence after the last note of a non-looping sheet.
    pub tail_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_scale: 4.0,
            font: "16px monospace".to_string(),
            sample_rate: 44_100,
            seed: None,
            realtime: true,
            linger_ms: 10_000,
            tail_ms: 500,
        }
    }
}

impl Config {
    /// The standard config location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".oneshot").join("config.yaml"))
    }

    /// Load from the standard path. A missing file yields defaults.
    pub fn load() -> Self {
        Self::default_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load from `path`. A missing file yields defaults; a malformed one
    /// yields defaults and a warning.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        Self::from_yaml(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), "ignoring malformed config: {e}");
            Self::default()
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.grid_scale, 4.0);
        assert_eq!(config.sample_rate, 44_100);
        assert!(config.seed.is_none());
        assert_eq!(config.tail_ms, 500);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("grid_scale: 8\nseed: 7\n").unwrap();
        assert_eq!(config.grid_scale, 8.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.font, "16px monospace");
        assert!(config.realtime);
    }

    #[test]
    fn yaml_roundtrip() {
        let config = Config {
            realtime: false,
            linger_ms: 250,
            ..Config::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.yaml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "grid_scale: [not, a, number]").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "font: 8px serif\nrealtime: false\n").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.font, "8px serif");
        assert!(!config.realtime);
    }
}
