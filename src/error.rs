//! Application-level errors

use std::io;

use global_hotkey::hotkey::HotKeyParseError;
use meetclock_core::{ConfigError, PresetError};
use meetclock_overlay::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error("invalid shortcut '{keys}'")]
    Shortcut {
        keys: String,
        #[source]
        source: HotKeyParseError,
    },

    #[error("failed to open the overlay window: {0}")]
    Window(PlatformError),

    #[error("failed to start the audio thread")]
    AudioThread(#[source] io::Error),

    #[error("{0}")]
    Invalid(String),
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        AppError::Window(err)
    }
}
