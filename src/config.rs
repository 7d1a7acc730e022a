//! Viewer configuration with defaults and RON loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::TableKind;
use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub display: DisplayConfig,
    /// Default log filter (error, warn, info, debug, trace). `RUST_LOG` overrides it.
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub title: String,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
}

/// Where the precomputed tables live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    pub dir: PathBuf,
    pub transmittance: String,
    pub scattering: String,
    pub irradiance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub white_point: [f32; 3],
    /// View preset (1-9) to start from instead of the default view.
    pub initial_preset: Option<u8>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            display: DisplayConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 576,
            title: "Precomputed Atmospheric Scattering".to_string(),
            vsync: true,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            transmittance: "transmittance.dat".to_string(),
            scattering: "scattering.dat".to_string(),
            irradiance: "irradiance.dat".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            white_point: [1.0, 1.0, 1.0],
            initial_preset: None,
        }
    }
}

impl AssetConfig {
    pub fn path_for(&self, kind: TableKind) -> PathBuf {
        let file = match kind {
            TableKind::Transmittance => &self.transmittance,
            TableKind::Scattering => &self.scattering,
            TableKind::Irradiance => &self.irradiance,
        };
        self.dir.join(file)
    }
}

impl ViewerConfig {
    /// Load a config from a RON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config = Self::from_ron(&contents)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.display.initial_preset {
            Some(p) if !(1..=9).contains(&p) => Err(ConfigError::UnknownPreset(p)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 576);
        assert_eq!(config.display.white_point, [1.0, 1.0, 1.0]);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.assets.path_for(TableKind::Scattering),
            PathBuf::from("assets").join("scattering.dat")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = ViewerConfig::from_ron(
            r#"(
                window: (width: 800),
                assets: (dir: "tables"),
                display: (initial_preset: Some(6)),
            )"#,
        )
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 576);
        assert_eq!(
            config.assets.path_for(TableKind::Irradiance),
            PathBuf::from("tables").join("irradiance.dat")
        );
        assert_eq!(config.display.initial_preset, Some(6));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        std::fs::write(&path, "(log_level: \"debug\")").unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn malformed_ron_is_parse_error() {
        let err = ViewerConfig::from_ron("(window: (width: \"wide\"))").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn out_of_range_preset_rejected() {
        let mut config = ViewerConfig::default();
        config.display.initial_preset = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::UnknownPreset(0))));
        config.display.initial_preset = Some(10);
        assert!(config.validate().is_err());
        config.display.initial_preset = Some(9);
        assert!(config.validate().is_ok());
    }
}
