//! Runtime settings.
//!
//! Defaults cover the common setup. With the `config` feature, settings can also be read from
//! a TOML file, either given explicitly or discovered under the user's configuration directory:
//!
//! ```toml
//! protocol = "four-code"
//! confirm_row_policy = "cancel"
//! layout = "standard"
//! backend = "xdotool"
//!
//! [[custom_rows]]
//! items = ["1", "2", "3"]
//! number_row = true
//!
//! [[custom_rows]]
//! items = ["Y", "E", "S", "N", "O", "Space", "Del", "Enter"]
//! ```

use crate::error::Result;
use crate::inject::Backend;
use crate::layout::{Layout, LayoutPreset, RowSpec};
use crate::protocol::{ConfirmRowPolicy, ProtocolVariant};

#[cfg(feature = "config")]
use crate::error::BlinkError;
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
const CONFIG_DIR_NAME: &str = "blinkboard";
#[cfg(feature = "config")]
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct Settings {
    pub protocol: ProtocolVariant,
    pub confirm_row_policy: ConfirmRowPolicy,
    pub layout: LayoutPreset,
    /// Replaces the preset when non-empty.
    pub custom_rows: Vec<RowSpec>,
    pub backend: Backend,
    pub target_window: Option<String>,
    pub quiet: bool,
}

impl Settings {
    /// Build and validate the layout these settings describe.
    pub fn build_layout(&self) -> Result<Layout> {
        if self.custom_rows.is_empty() {
            Layout::preset(self.layout)
        } else {
            Layout::from_specs(&self.custom_rows)
        }
    }

    #[cfg(feature = "config")]
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| BlinkError::config(err.to_string()))
    }

    /// Load settings from a TOML file.
    #[cfg(feature = "config")]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            BlinkError::config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// `<config_dir>/blinkboard/config.toml`, when the platform has a config directory.
    #[cfg(feature = "config")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the default configuration file if present, otherwise fall back to defaults.
    #[cfg(feature = "config")]
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
