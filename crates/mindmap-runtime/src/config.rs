#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! Every tunable of the engine lives in one [`EngineConfig`] that can be
//! loaded from JSON (always) or TOML (with the `config-toml` feature):
//!
//! ```toml
//! default_label = "New idea"
//!
//! [history]
//! capacity = 100
//!
//! [drag]
//! sibling_zone = 24.0
//!
//! [layout]
//! level_spacing = 260.0
//! ```
//!
//! Missing sections and fields take their defaults, so
//! `EngineConfig::default()` and an empty file behave identically.

use std::path::Path;

use mindmap_layout::LayoutConfig;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Label given to freshly added nodes.
    pub default_label: String,
    pub layout: LayoutConfig,
    pub history: HistoryConfig,
    pub drag: DragConfig,
    pub save: SaveConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_label: "New Node".to_string(),
            layout: LayoutConfig::default(),
            history: HistoryConfig::default(),
            drag: DragConfig::default(),
            save: SaveConfig::default(),
        }
    }
}

/// Undo/redo history bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained snapshots, including the current one.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

/// Drag gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel (px) before a press becomes a drag.
    pub activation_threshold: f64,
    /// Cross-axis distance (px) from a target's center beyond which a drop
    /// means "insert as sibling" instead of "insert as child".
    pub sibling_zone: f64,
    /// Minimum interval between hover recomputations.
    pub throttle_ms: u64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 5.0,
            sibling_zone: 20.0,
            throttle_ms: 16,
        }
    }
}

/// Persistence cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Quiet period before a pending save is released. The default `0`
    /// saves on every commit; a positive value coalesces bursts and needs
    /// the host to call `poll_save`.
    pub debounce_ms: u64,
}

impl EngineConfig {
    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, EngineConfigError> {
        serde_json::from_str(s).map_err(EngineConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(EngineConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, EngineConfigError> {
        toml::from_str(s).map_err(EngineConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-toml")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, EngineConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(EngineConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.layout.validate();

        if self.default_label.trim().is_empty() {
            errors.push("default_label must not be blank".into());
        }
        if self.history.capacity == 0 {
            errors.push("history.capacity must be > 0".into());
        }
        if !self.drag.activation_threshold.is_finite() || self.drag.activation_threshold < 0.0 {
            errors.push(format!(
                "drag.activation_threshold must be >= 0, got {}",
                self.drag.activation_threshold
            ));
        }
        if !self.drag.sibling_zone.is_finite() || self.drag.sibling_zone < 0.0 {
            errors.push(format!(
                "drag.sibling_zone must be >= 0, got {}",
                self.drag.sibling_zone
            ));
        }

        errors
    }

    /// Return `self` if valid, otherwise every validation message.
    pub fn validated(self) -> Result<Self, EngineConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(EngineConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug)]
pub enum EngineConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-toml")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for EngineConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-toml")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for EngineConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-toml")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
