//! Commands accepted by the audio thread

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Play a file (configured path, resolved by the service). A zero
    /// `fade_in` starts at the target volume.
    Play { path: String, fade_in: Duration },
    /// Stop playback, fading out first when `fade_out` is non-zero
    Stop { fade_out: Duration },
    /// Target volume, 0-100
    SetVolume(u8),
    /// Silence output without touching the fade envelope
    ToggleMute,
    Shutdown,
}
