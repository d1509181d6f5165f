//! Error types.
//!
//! Only failures the caller can act on are errors. A missing gamepad, an
//! unsupported touchscreen or an unknown identifier are not: queries against
//! them return neutral values instead (see [`InputManager`](crate::InputManager)).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    /// The platform input subsystem could not be brought up.
    ///
    /// Fatal to [`InputManager::initialize`](crate::InputManager::initialize);
    /// the manager keeps keyboard and mouse running if the caller carries on.
    #[error("input subsystem initialization failed: {message}")]
    InitializationFailure { message: String },

    /// Malformed `InputConfig` TOML.
    #[error("invalid input config: {0}")]
    Config(#[source] toml::de::Error),

    /// `InputConfig` could not be written back out as TOML.
    #[error("could not serialize input config: {0}")]
    ConfigWrite(#[source] toml::ser::Error),

    /// Malformed JSON binding profile.
    #[error("invalid binding profile: {0}")]
    Profile(#[source] serde_json::Error),

    /// Malformed TOML binding profile.
    #[error("invalid binding profile: {0}")]
    ProfileToml(#[source] toml::de::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InputError {
    pub fn init_failure(message: impl Into<String>) -> Self {
        Self::InitializationFailure {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InputError>;
