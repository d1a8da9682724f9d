//! Command-line configuration editing
//!
//! Each command loads the config file, applies one change, validates it and
//! saves. A running window picks the change up when its Settings button is
//! pressed.

use std::path::Path;

use clap::{Args, Subcommand};
use meetclock_core::presets::{self, PresetError};
use meetclock_core::types::{
    AppConfig, DisplayFormat, MAX_FADE_MS, MAX_FONT_SIZE, MAX_OPACITY, MAX_PRESET_SECS,
    MIN_FONT_SIZE, MIN_OPACITY, Preset, ShortcutAction, Theme, parse_hex_color,
};
use global_hotkey::hotkey::HotKey;
use meetclock_core::ConfigSource;

use crate::error::AppError;

// ─────────────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Fields for `preset add`
#[derive(Debug, Clone, Args)]
pub struct NewPreset {
    pub name: String,
    /// Seconds, MM:SS or H:MM:SS
    #[arg(value_parser = parse_duration)]
    pub duration: u32,
    /// Remaining time at which the alert sound starts (0 disables it)
    #[arg(long, value_parser = parse_duration, default_value = "60")]
    pub alert: u32,
    /// Remaining time at which the readout starts flashing
    #[arg(long, value_parser = parse_duration)]
    pub flash: Option<u32>,
    /// Alert sound file
    #[arg(long)]
    pub music: Option<String>,
}

/// Fields for `preset edit`; anything left out is kept
#[derive(Debug, Clone, Default, Args)]
pub struct PresetChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<u32>,
    #[arg(long, value_parser = parse_duration)]
    pub alert: Option<u32>,
    #[arg(long, value_parser = parse_duration)]
    pub flash: Option<u32>,
    /// Use the global flash threshold instead of a per-preset one
    #[arg(long, conflicts_with = "flash")]
    pub default_flash: bool,
    /// Alert sound file ("" removes it)
    #[arg(long)]
    pub music: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Setting {
    /// Playback volume in percent (0-100)
    Volume { percent: u32 },
    /// Alert fade-in in milliseconds
    Fade { millis: u32 },
    /// Window opacity in simple mode (0.2-1.0, one decimal)
    Opacity { value: f32 },
    /// light or dark
    Theme { theme: Theme },
    /// min_sec, seconds or percent
    Format { format: DisplayFormat },
    /// Readout font size in pixels
    FontSize { pixels: u32 },
    /// Flash color as #RRGGBB or #RRGGBBAA
    FlashColor { color: String },
    /// Default flash threshold for presets without their own
    FlashSeconds {
        #[arg(value_parser = parse_duration)]
        seconds: u32,
    },
    /// Keep the window above others
    Topmost {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Regular meeting prompt file (omit to unset)
    PromptRegular { path: Option<String> },
    /// Confidential meeting prompt file (omit to unset)
    PromptConfidential { path: Option<String> },
}

/// Parse "90", "1:30" or "1:01:30" into seconds
pub fn parse_duration(input: &str) -> Result<u32, String> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(format!("invalid duration '{}'", input));
    }
    let mut total: u32 = 0;
    for (i, part) in parts.iter().enumerate() {
        let value: u32 = part
            .parse()
            .map_err(|_| format!("invalid duration '{}'", input))?;
        if i > 0 && value >= 60 {
            return Err(format!("invalid duration '{}'", input));
        }
        total = total
            .checked_mul(60)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| format!("duration '{}' is too long", input))?;
    }
    Ok(total)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Load, edit and save. Nothing is written if the edit fails.
fn update<F>(source: &ConfigSource, edit: F) -> Result<AppConfig, AppError>
where
    F: FnOnce(&mut AppConfig) -> Result<(), AppError>,
{
    let mut config = source.try_load()?;
    edit(&mut config)?;
    source.save(&config)?;
    Ok(config)
}

fn preset_mut(config: &mut AppConfig, index: usize) -> Result<&mut Preset, AppError> {
    let len = config.presets.len();
    config
        .presets
        .get_mut(index)
        .ok_or(AppError::Preset(PresetError::NoSuchPreset { index, len }))
}

fn format_secs(secs: u32) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

pub fn format_presets(config: &AppConfig) -> String {
    if config.presets.is_empty() {
        return "No presets configured\n".to_string();
    }
    let mut out = format!(
        "{:<4} {:<24} {:>9} {:>7} {:>7}  Music\n",
        "#", "Name", "Duration", "Alert", "Flash"
    );
    out.push_str(&"-".repeat(72));
    out.push('\n');
    for (i, preset) in config.presets.iter().enumerate() {
        let flash = match preset.flash_time {
            Some(secs) => format_secs(secs),
            None => format!("({})", format_secs(config.reminder.flash_seconds)),
        };
        out.push_str(&format!(
            "{:<4} {:<24} {:>9} {:>7} {:>7}  {}\n",
            i,
            preset.name,
            format_secs(preset.duration),
            format_secs(preset.alert_time),
            flash,
            preset.music.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn format_shortcuts(config: &AppConfig) -> String {
    let mut out = String::new();
    for action in ShortcutAction::ALL {
        let keys = config.shortcuts.get(action).unwrap_or("(unbound)");
        out.push_str(&format!(
            "{:<14} {:<12} {}\n",
            action.as_str(),
            keys,
            action.label()
        ));
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

pub fn config_show(source: &ConfigSource) -> Result<(), AppError> {
    // Loading first creates the file when it is missing
    source.try_load()?;
    let path = source.path()?;
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| AppError::Invalid(format!("cannot read {}: {}", path.display(), e)))?;
    println!("# {}", path.display());
    print!("{}", contents);
    Ok(())
}

pub fn config_path(source: &ConfigSource) -> Result<(), AppError> {
    println!("{}", source.path()?.display());
    Ok(())
}

pub fn config_reset(source: &ConfigSource) -> Result<(), AppError> {
    source.reset()?;
    println!("Configuration reset to defaults");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

pub fn preset_list(source: &ConfigSource) -> Result<(), AppError> {
    let config = source.try_load()?;
    print!("{}", format_presets(&config));
    Ok(())
}

pub fn preset_add(source: &ConfigSource, new: NewPreset) -> Result<(), AppError> {
    let preset = Preset {
        name: new.name.trim().to_string(),
        duration: new.duration,
        alert_time: new.alert,
        flash_time: new.flash,
        music: new.music.filter(|m| !m.trim().is_empty()),
    };
    presets::validate(&preset)?;
    let config = update(source, |config| {
        config.presets.push(preset);
        Ok(())
    })?;
    println!(
        "Added preset {} ({} presets)",
        config.presets.len() - 1,
        config.presets.len()
    );
    Ok(())
}

pub fn preset_edit(
    source: &ConfigSource,
    index: usize,
    changes: PresetChanges,
) -> Result<(), AppError> {
    update(source, |config| {
        let preset = preset_mut(config, index)?;
        if let Some(name) = changes.name {
            preset.name = name.trim().to_string();
        }
        if let Some(duration) = changes.duration {
            preset.duration = duration;
        }
        if let Some(alert) = changes.alert {
            preset.alert_time = alert;
        }
        if changes.default_flash {
            preset.flash_time = None;
        } else if let Some(flash) = changes.flash {
            preset.flash_time = Some(flash);
        }
        if let Some(music) = changes.music {
            preset.music = Some(music.trim().to_string()).filter(|m| !m.is_empty());
        }
        presets::validate(preset)?;
        Ok(())
    })?;
    println!("Updated preset {}", index);
    Ok(())
}

pub fn preset_remove(source: &ConfigSource, index: usize) -> Result<(), AppError> {
    let mut removed = String::new();
    update(source, |config| {
        let len = config.presets.len();
        if index >= len {
            return Err(PresetError::NoSuchPreset { index, len }.into());
        }
        removed = config.presets.remove(index).name;
        Ok(())
    })?;
    println!("Removed preset {} ({})", index, removed);
    Ok(())
}

/// Import presets from JSON, replacing the list unless `append` is set
pub fn preset_import(source: &ConfigSource, path: &Path, append: bool) -> Result<(), AppError> {
    let imported = presets::import_presets(path)?;
    let count = imported.len();
    update(source, |config| {
        if !append {
            config.presets.clear();
        }
        config.presets.extend(imported);
        Ok(())
    })?;
    println!("Imported {} presets from {}", count, path.display());
    Ok(())
}

pub fn preset_export(source: &ConfigSource, path: &Path) -> Result<(), AppError> {
    let config = source.try_load()?;
    presets::export_presets(path, &config.presets)?;
    println!(
        "Exported {} presets to {}",
        config.presets.len(),
        path.display()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

pub fn shortcut_list(source: &ConfigSource) -> Result<(), AppError> {
    let config = source.try_load()?;
    print!("{}", format_shortcuts(&config));
    Ok(())
}

/// Bind a key sequence. The sequence is stored in its canonical form and
/// must not already be bound to another action.
pub fn shortcut_set(
    source: &ConfigSource,
    action: ShortcutAction,
    keys: &str,
) -> Result<(), AppError> {
    let hotkey: HotKey = keys.parse().map_err(|source| AppError::Shortcut {
        keys: keys.to_string(),
        source,
    })?;
    let canonical = hotkey.into_string();

    update(source, |config| {
        let taken = config
            .shortcuts
            .bindings()
            .filter(|(other, _)| *other != action)
            .find(|(_, seq)| seq.parse::<HotKey>().is_ok_and(|h| h == hotkey))
            .map(|(other, _)| other);
        if let Some(other) = taken {
            return Err(AppError::Invalid(format!(
                "'{}' is already bound to {}",
                canonical, other
            )));
        }
        config.shortcuts.set(action, Some(canonical.clone()));
        Ok(())
    })?;
    println!("{} = {}", action, canonical);
    Ok(())
}

pub fn shortcut_clear(source: &ConfigSource, action: ShortcutAction) -> Result<(), AppError> {
    update(source, |config| {
        config.shortcuts.set(action, None);
        Ok(())
    })?;
    println!("{} unbound", action);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

fn apply_setting(config: &mut AppConfig, setting: Setting) -> Result<(), AppError> {
    match setting {
        Setting::Volume { percent } => {
            if percent > 100 {
                return Err(AppError::Invalid(format!(
                    "volume must be 0-100 (got {})",
                    percent
                )));
            }
            config.audio.volume = percent as f32 / 100.0;
        }
        Setting::Fade { millis } => {
            if millis > MAX_FADE_MS {
                return Err(AppError::Invalid(format!(
                    "fade must be 0-{} ms (got {})",
                    MAX_FADE_MS, millis
                )));
            }
            config.audio.fade_duration = millis;
        }
        Setting::Opacity { value } => {
            let tenths = value * 10.0;
            if !(MIN_OPACITY..=MAX_OPACITY).contains(&value) || (tenths - tenths.round()).abs() > 1e-3
            {
                return Err(AppError::Invalid(format!(
                    "opacity must be {}-{} in steps of 0.1 (got {})",
                    MIN_OPACITY, MAX_OPACITY, value
                )));
            }
            config.window.opacity = tenths.round() / 10.0;
        }
        Setting::Theme { theme } => config.theme = theme,
        Setting::Format { format } => config.display.format = format,
        Setting::FontSize { pixels } => {
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&pixels) {
                return Err(AppError::Invalid(format!(
                    "font size must be {}-{} (got {})",
                    MIN_FONT_SIZE, MAX_FONT_SIZE, pixels
                )));
            }
            config.display.font_size = pixels;
        }
        Setting::FlashColor { color } => {
            if parse_hex_color(&color).is_none() {
                return Err(AppError::Invalid(format!(
                    "invalid color '{}' (expected #RRGGBB or #RRGGBBAA)",
                    color
                )));
            }
            config.reminder.flash_color = color.trim().to_string();
        }
        Setting::FlashSeconds { seconds } => {
            if seconds > MAX_PRESET_SECS {
                return Err(AppError::Invalid(format!(
                    "flash threshold must be at most {} (got {})",
                    format_secs(MAX_PRESET_SECS),
                    format_secs(seconds)
                )));
            }
            config.reminder.flash_seconds = seconds;
        }
        Setting::Topmost { enabled } => config.window.topmost = enabled,
        Setting::PromptRegular { path } => config.audio.prompt_regular = path.unwrap_or_default(),
        Setting::PromptConfidential { path } => {
            config.audio.prompt_confidential = path.unwrap_or_default()
        }
    }
    Ok(())
}

pub fn set(source: &ConfigSource, setting: Setting) -> Result<(), AppError> {
    let description = format!("{:?}", setting);
    update(source, |config| apply_setting(config, setting))?;
    println!("Saved {}", description);
    Ok(())
}
