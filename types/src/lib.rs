//! Shared configuration types for MeetClock
//!
//! This crate contains the serializable configuration model shared between
//! the core state machines (meetclock-core), the overlay renderer
//! (meetclock-overlay) and the application binary.
//!
//! Every struct uses serde defaults so a partial config file is merged with
//! the built-in defaults on load.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color, 0-255 per channel
pub type Color = [u8; 4];

// ─────────────────────────────────────────────────────────────────────────────
// Limits (shared by CLI validation and runtime clamping)
// ─────────────────────────────────────────────────────────────────────────────

/// Longest allowed preset, in seconds (10 hours)
pub const MAX_PRESET_SECS: u32 = 36_000;
/// Lowest window opacity reachable with the opacity hotkeys
pub const MIN_OPACITY: f32 = 0.2;
pub const MAX_OPACITY: f32 = 1.0;
/// Opacity change per hotkey press
pub const OPACITY_STEP: f32 = 0.1;
pub const MAX_FADE_MS: u32 = 10_000;
pub const MIN_FONT_SIZE: u32 = 20;
pub const MAX_FONT_SIZE: u32 = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Serde Default Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn default_flash_secs() -> u32 {
    5
}
fn default_music() -> Option<String> {
    Some("sounds/time.mp3".to_string())
}
fn default_preset_name() -> String {
    "New preset".to_string()
}
fn default_preset_duration() -> u32 {
    300
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

/// A named countdown configuration
///
/// Field names follow the on-disk format (`duration`, `alert_time`,
/// `flash_time`, `music`); all times are whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default = "default_preset_name")]
    pub name: String,
    /// Total countdown length
    #[serde(default = "default_preset_duration")]
    pub duration: u32,
    /// Remaining time at which the alert sound starts (0 disables the alert)
    #[serde(default)]
    pub alert_time: u32,
    /// Remaining time at which the readout starts blinking.
    /// `None` falls back to `reminder.flash_seconds`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_time: Option<u32>,
    /// Sound played when the alert threshold is crossed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<String>,
}

impl Preset {
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration,
            alert_time: 60,
            flash_time: Some(10),
            music: default_music(),
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new(default_preset_name(), default_preset_duration())
    }
}

fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("5 min", 300),
        Preset::new("10 min", 600),
        Preset::new("15 min", 900),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

/// Actions that can be bound to a global keyboard shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutAction {
    StartPause,
    Reset,
    NextPreset,
    PrevPreset,
    ToggleWindow,
    ToggleTop,
    OpacityUp,
    OpacityDown,
    Mute,
}

impl ShortcutAction {
    pub const ALL: [ShortcutAction; 9] = [
        Self::StartPause,
        Self::Reset,
        Self::NextPreset,
        Self::PrevPreset,
        Self::ToggleWindow,
        Self::ToggleTop,
        Self::OpacityUp,
        Self::OpacityDown,
        Self::Mute,
    ];

    /// Config key for this action
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartPause => "start_pause",
            Self::Reset => "reset",
            Self::NextPreset => "next_preset",
            Self::PrevPreset => "prev_preset",
            Self::ToggleWindow => "toggle_window",
            Self::ToggleTop => "toggle_top",
            Self::OpacityUp => "opacity_up",
            Self::OpacityDown => "opacity_down",
            Self::Mute => "mute",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::StartPause => "Start / pause",
            Self::Reset => "Reset",
            Self::NextPreset => "Next preset",
            Self::PrevPreset => "Previous preset",
            Self::ToggleWindow => "Show / hide window",
            Self::ToggleTop => "Toggle always on top",
            Self::OpacityUp => "Increase opacity",
            Self::OpacityDown => "Decrease opacity",
            Self::Mute => "Mute / unmute",
        }
    }
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortcutAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| format!("unknown shortcut action '{}'", s))
    }
}

/// Key sequence per action (e.g. "ctrl+m"). An empty string means unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutSettings {
    pub start_pause: String,
    pub reset: String,
    pub next_preset: String,
    pub prev_preset: String,
    pub toggle_window: String,
    pub toggle_top: String,
    pub opacity_up: String,
    pub opacity_down: String,
    pub mute: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            start_pause: "1".into(),
            reset: "2".into(),
            next_preset: "3".into(),
            prev_preset: "4".into(),
            toggle_window: "5".into(),
            toggle_top: "6".into(),
            opacity_up: "7".into(),
            opacity_down: "8".into(),
            mute: "ctrl+m".into(),
        }
    }
}

impl ShortcutSettings {
    fn slot(&self, action: ShortcutAction) -> &String {
        match action {
            ShortcutAction::StartPause => &self.start_pause,
            ShortcutAction::Reset => &self.reset,
            ShortcutAction::NextPreset => &self.next_preset,
            ShortcutAction::PrevPreset => &self.prev_preset,
            ShortcutAction::ToggleWindow => &self.toggle_window,
            ShortcutAction::ToggleTop => &self.toggle_top,
            ShortcutAction::OpacityUp => &self.opacity_up,
            ShortcutAction::OpacityDown => &self.opacity_down,
            ShortcutAction::Mute => &self.mute,
        }
    }

    fn slot_mut(&mut self, action: ShortcutAction) -> &mut String {
        match action {
            ShortcutAction::StartPause => &mut self.start_pause,
            ShortcutAction::Reset => &mut self.reset,
            ShortcutAction::NextPreset => &mut self.next_preset,
            ShortcutAction::PrevPreset => &mut self.prev_preset,
            ShortcutAction::ToggleWindow => &mut self.toggle_window,
            ShortcutAction::ToggleTop => &mut self.toggle_top,
            ShortcutAction::OpacityUp => &mut self.opacity_up,
            ShortcutAction::OpacityDown => &mut self.opacity_down,
            ShortcutAction::Mute => &mut self.mute,
        }
    }

    /// Key sequence bound to an action (None if unbound or blank)
    pub fn get(&self, action: ShortcutAction) -> Option<&str> {
        Some(self.slot(action).trim()).filter(|s| !s.is_empty())
    }

    /// Bind or (with `None`) unbind an action
    pub fn set(&mut self, action: ShortcutAction, sequence: Option<String>) {
        *self.slot_mut(action) = sequence.map(|s| s.trim().to_string()).unwrap_or_default();
    }

    /// All bound (action, sequence) pairs in declaration order
    pub fn bindings(&self) -> impl Iterator<Item = (ShortcutAction, &str)> + '_ {
        ShortcutAction::ALL
            .into_iter()
            .filter_map(|action| self.get(action).map(|seq| (action, seq)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Window / Theme
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted window geometry and behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    /// Background opacity used in simple mode (0.2 - 1.0)
    pub opacity: f32,
    pub topmost: bool,
    pub x: i32,
    pub y: i32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 350,
            height: 250,
            opacity: 1.0,
            topmost: false,
            x: 100,
            y: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio
// ─────────────────────────────────────────────────────────────────────────────

/// Audio playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Playback volume, 0.0 - 1.0
    pub volume: f32,
    /// Fade-in length for the alert sound, in milliseconds
    pub fade_duration: u32,
    /// Pre-meeting announcement for regular meetings (empty = unset)
    pub prompt_regular: String,
    /// Pre-meeting announcement for confidential meetings (empty = unset)
    pub prompt_confidential: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            fade_duration: 2000,
            prompt_regular: "sounds/prompt_regular.wav".to_string(),
            prompt_confidential: "sounds/prompt_confidential.wav".to_string(),
        }
    }
}

impl AudioSettings {
    /// Volume on the 0-100 scale used by the player
    pub fn volume_percent(&self) -> f32 {
        (self.volume.clamp(0.0, 1.0) * 100.0).round()
    }
}

/// Which pre-meeting prompt to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Regular,
    Confidential,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "Regular meeting prompt",
            Self::Confidential => "Confidential meeting prompt",
        }
    }
}

impl AudioSettings {
    /// Configured path for a prompt (None if unset or blank)
    pub fn prompt(&self, kind: PromptKind) -> Option<&str> {
        let path = match kind {
            PromptKind::Regular => &self.prompt_regular,
            PromptKind::Confidential => &self.prompt_confidential,
        };
        Some(path.trim()).filter(|p| !p.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reminder / Display
// ─────────────────────────────────────────────────────────────────────────────

/// Visual reminder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    /// Flash threshold for presets that do not set their own
    pub flash_seconds: u32,
    /// Hex color ("#RRGGBB" or "#RRGGBBAA") painted while flashing
    pub flash_color: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            flash_seconds: default_flash_secs(),
            flash_color: "#FF0000".to_string(),
        }
    }
}

impl ReminderSettings {
    /// Parsed flash color, falling back to opaque red on bad input
    pub fn flash_rgba(&self) -> Color {
        parse_hex_color(&self.flash_color).unwrap_or([255, 0, 0, 255])
    }
}

/// How the remaining time is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    /// MM:SS
    #[default]
    MinSec,
    /// Whole seconds
    Seconds,
    /// Percentage of the preset remaining
    Percent,
}

impl FromStr for DisplayFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min_sec" | "minsec" | "mm:ss" => Ok(Self::MinSec),
            "seconds" | "secs" => Ok(Self::Seconds),
            "percent" | "%" => Ok(Self::Percent),
            other => Err(format!(
                "unknown format '{}' (expected min_sec, seconds or percent)",
                other
            )),
        }
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MinSec => "min_sec",
            Self::Seconds => "seconds",
            Self::Percent => "percent",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub format: DisplayFormat,
    /// Readout font size in pixels
    pub font_size: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            format: DisplayFormat::MinSec,
            font_size: 150,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root of the persisted configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_presets")]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub shortcuts: ShortcutSettings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub reminder: ReminderSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            presets: default_presets(),
            shortcuts: ShortcutSettings::default(),
            window: WindowSettings::default(),
            audio: AudioSettings::default(),
            reminder: ReminderSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse "#RRGGBB", "#RRGGBBAA" or the same without '#'
pub fn parse_hex_color(input: &str) -> Option<Color> {
    let hex = input.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0, 255]));
        assert_eq!(parse_hex_color("00ff0080"), Some([0, 255, 0, 128]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color("#ÿÿÿ"), None);
    }

    #[test]
    fn test_flash_color_falls_back_to_red() {
        let reminder = ReminderSettings {
            flash_color: "not a color".to_string(),
            ..Default::default()
        };
        assert_eq!(reminder.flash_rgba(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_shortcut_lookup_and_blank_values() {
        let mut shortcuts = ShortcutSettings::default();
        assert_eq!(shortcuts.get(ShortcutAction::Mute), Some("ctrl+m"));

        shortcuts.set(ShortcutAction::Mute, Some("   ".to_string()));
        assert_eq!(shortcuts.get(ShortcutAction::Mute), None);
        assert_eq!(shortcuts.bindings().count(), 8);
    }

    #[test]
    fn test_shortcut_action_from_str() {
        assert_eq!(
            "start-pause".parse::<ShortcutAction>(),
            Ok(ShortcutAction::StartPause)
        );
        assert_eq!("MUTE".parse::<ShortcutAction>(), Ok(ShortcutAction::Mute));
        assert!("explode".parse::<ShortcutAction>().is_err());
    }

    #[test]
    fn test_volume_percent_is_clamped() {
        let audio = AudioSettings {
            volume: 1.7,
            ..Default::default()
        };
        assert_eq!(audio.volume_percent(), 100.0);
    }

    #[test]
    fn test_blank_prompt_is_unset() {
        let audio = AudioSettings {
            prompt_regular: String::new(),
            ..Default::default()
        };
        assert_eq!(audio.prompt(PromptKind::Regular), None);
        assert!(audio.prompt(PromptKind::Confidential).is_some());
    }
}
