//! Core logic for MeetClock
//!
//! Everything here is platform-independent: the countdown state machine,
//! the audio fade envelope, readout formatting, preset handling, view-mode
//! geometry, resource lookup and config persistence.

pub mod config;
pub mod countdown;
pub mod display;
pub mod fade;
pub mod mode;
pub mod presets;
pub mod resources;

pub use config::{AppConfig, ConfigError, ConfigSource};
pub use countdown::{Countdown, CountdownConfig, CountdownEvent, FLASH_INTERVAL, TICK_INTERVAL};
pub use display::{Readout, format_remaining};
pub use fade::{FADE_STEP_INTERVAL, FadeEnvelope, FadeProgress, FadeStart};
pub use mode::{Geometry, ModeGeometry, ViewMode, adjust_opacity};
pub use presets::{PresetCursor, PresetError};
pub use resources::ResourceResolver;

pub use meetclock_types as types;
