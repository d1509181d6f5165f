//! Manager configuration, loaded from TOML.
//!
//! ```toml
//! default_deadzone = 0.15
//! motion = "auto"      # "auto" | "enabled" | "disabled"
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::snapshot::{clamp_deadzone, DEFAULT_DEADZONE};

/// Environment variable that marks handheld hardware (`"1"` = handheld).
pub const HANDHELD_ENV_VAR: &str = "SteamDeck";

/// Whether to register the motion-sensor device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// Register it on handheld hardware or when the platform reports sensors at startup.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Deadzone for `axis_value` and for axis bindings that do not name one.
    pub default_deadzone: f32,
    pub motion: MotionMode,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            default_deadzone: DEFAULT_DEADZONE,
            motion: MotionMode::default(),
        }
    }
}

impl InputConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text).map_err(InputError::Config)?;
        config.default_deadzone = clamp_deadzone(config.default_deadzone);
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(InputError::ConfigWrite)
    }
}

/// Whether the process runs on handheld hardware, per [`HANDHELD_ENV_VAR`].
pub fn running_on_handheld() -> bool {
    std::env::var(HANDHELD_ENV_VAR).is_ok_and(|value| value == "1")
}
