// ABOUTME: Engine configuration loaded from TOML with per-field defaults
// ABOUTME: Contrast threshold, resolution depth, layer count, default mode and CSS naming

use crate::error::ConfigError;
use crate::resolver::DEFAULT_MAX_DEPTH;
use crate::color_math::ContrastRatios;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokenweave_logging::{info, warn};
use tokenweave_types::Mode;

/// Upper bound accepted for `max_depth`
const MAX_DEPTH_LIMIT: usize = 64;

/// Upper bound accepted for `layer_count`
const MAX_LAYER_COUNT: u8 = 16;

/// CSS custom-property naming
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CssConfig {
    /// Inserted after `--` in every variable name (e.g. `tw-`)
    #[serde(default)]
    pub prefix: String,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum contrast ratio for on-tone and interactive colors
    #[serde(default = "default_min_contrast")]
    pub min_contrast: f64,

    /// Reference hops allowed before a chain counts as cyclic
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Layers whose element-interactive color the cascade recomputes
    #[serde(default = "default_layer_count")]
    pub layer_count: u8,

    /// Mode used when a session starts
    #[serde(default)]
    pub default_mode: Mode,

    #[serde(default)]
    pub css: CssConfig,
}

fn default_min_contrast() -> f64 {
    ContrastRatios::AA_NORMAL
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_layer_count() -> u8 {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_contrast: default_min_contrast(),
            max_depth: default_max_depth(),
            layer_count: default_layer_count(),
            default_mode: Mode::default(),
            css: CssConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(config_path = %path.display(), "No engine configuration file found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;

        info!(
            config_path = %path.display(),
            min_contrast = config.min_contrast,
            max_depth = config.max_depth,
            layer_count = config.layer_count,
            default_mode = %config.default_mode,
            "Loaded engine configuration"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1.0..=21.0).contains(&self.min_contrast) {
            return Err(ConfigError::invalid(format!(
                "min_contrast must be within [1, 21], got {}",
                self.min_contrast
            )));
        }

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::invalid(format!(
                "max_depth must be within [1, {MAX_DEPTH_LIMIT}], got {}",
                self.max_depth
            )));
        }

        if self.layer_count > MAX_LAYER_COUNT {
            return Err(ConfigError::invalid(format!(
                "layer_count must not exceed {MAX_LAYER_COUNT}, got {}",
                self.layer_count
            )));
        }

        if self
            .css
            .prefix
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(ConfigError::invalid(format!(
                "css.prefix may only contain ASCII letters, digits, '-' and '_', got {:?}",
                self.css.prefix
            )));
        }

        if self.min_contrast < ContrastRatios::AA_NORMAL {
            warn!(
                min_contrast = self.min_contrast,
                "Minimum contrast is below WCAG AA for normal text"
            );
        }

        Ok(())
    }
}
