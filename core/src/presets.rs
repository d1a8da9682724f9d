//! Preset selection, validation and JSON import/export

use std::path::{Path, PathBuf};

use meetclock_types::{MAX_PRESET_SECS, Preset, ReminderSettings};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset name must not be empty")]
    EmptyName,

    #[error("{field} must be between {min} and {max} seconds (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("failed to read preset file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write preset file {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid preset JSON")]
    Json(#[from] serde_json::Error),

    #[error("preset file must contain a JSON list")]
    ImportFormat,

    #[error("preset {index} does not exist ({len} presets)")]
    NoSuchPreset { index: usize, len: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursor
// ─────────────────────────────────────────────────────────────────────────────

/// Index of the active preset, wrapping in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresetCursor {
    index: usize,
    len: usize,
}

impl PresetCursor {
    pub fn new(index: usize, len: usize) -> Self {
        let mut cursor = Self { index, len };
        cursor.clamp_to(len);
        cursor
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active preset, if the list has any
    pub fn current<'a>(&self, presets: &'a [Preset]) -> Option<&'a Preset> {
        presets.get(self.index)
    }

    /// Move forward, wrapping to the first preset. No-op when empty.
    pub fn next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = (self.index + 1) % self.len;
        Some(self.index)
    }

    /// Move back, wrapping to the last preset. No-op when empty.
    pub fn prev(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.index = (self.index + self.len - 1) % self.len;
        Some(self.index)
    }

    /// Re-fit after the preset list changed length
    pub fn clamp_to(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

/// Find a preset by index or case-insensitive name
pub fn find_preset(presets: &[Preset], query: &str) -> Option<usize> {
    if let Ok(index) = query.trim().parse::<usize>() {
        return (index < presets.len()).then_some(index);
    }
    presets
        .iter()
        .position(|p| p.name.eq_ignore_ascii_case(query.trim()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn check_range(field: &'static str, value: u32, min: u32) -> Result<(), PresetError> {
    if (min..=MAX_PRESET_SECS).contains(&value) {
        Ok(())
    } else {
        Err(PresetError::OutOfRange {
            field,
            value,
            min,
            max: MAX_PRESET_SECS,
        })
    }
}

pub fn validate(preset: &Preset) -> Result<(), PresetError> {
    if preset.name.trim().is_empty() {
        return Err(PresetError::EmptyName);
    }
    check_range("duration", preset.duration, 1)?;
    check_range("alert_time", preset.alert_time, 0)?;
    if let Some(flash) = preset.flash_time {
        check_range("flash_time", flash, 0)?;
    }
    Ok(())
}

/// Flash offset used for a preset
pub fn effective_flash(preset: &Preset, reminder: &ReminderSettings) -> u32 {
    preset.flash_time.unwrap_or(reminder.flash_seconds)
}

// ─────────────────────────────────────────────────────────────────────────────
// Import / Export
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a JSON preset list. Every entry is validated.
pub fn parse_presets(json: &str) -> Result<Vec<Preset>, PresetError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(PresetError::ImportFormat);
    }
    let presets: Vec<Preset> = serde_json::from_value(value)?;
    for preset in &presets {
        validate(preset)?;
    }
    Ok(presets)
}

pub fn import_presets(path: &Path) -> Result<Vec<Preset>, PresetError> {
    let json = std::fs::read_to_string(path).map_err(|source| PresetError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let presets = parse_presets(&json)?;
    tracing::info!(path = %path.display(), count = presets.len(), "Imported presets");
    Ok(presets)
}

pub fn export_presets(path: &Path, presets: &[Preset]) -> Result<(), PresetError> {
    let json = serde_json::to_string_pretty(presets)?;
    std::fs::write(path, json).map_err(|source| PresetError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), count = presets.len(), "Exported presets");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_wraps_both_ways() {
        let mut cursor = PresetCursor::new(0, 3);
        assert_eq!(cursor.prev(), Some(2));
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
    }

    #[test]
    fn test_cursor_empty_list_is_noop() {
        let mut cursor = PresetCursor::new(0, 0);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.prev(), None);
        assert!(cursor.current(&[]).is_none());
    }

    #[test]
    fn test_cursor_clamps_after_removal() {
        let mut cursor = PresetCursor::new(2, 3);
        cursor.clamp_to(2);
        assert_eq!(cursor.index(), 1);
        cursor.clamp_to(0);
        assert_eq!(cursor.index(), 0);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_find_preset_by_index_or_name() {
        let presets = vec![Preset::new("Standup", 900), Preset::new("Review", 1800)];
        assert_eq!(find_preset(&presets, "1"), Some(1));
        assert_eq!(find_preset(&presets, "5"), None);
        assert_eq!(find_preset(&presets, "standup"), Some(0));
        assert_eq!(find_preset(&presets, "retro"), None);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(validate(&Preset::new("ok", 1)).is_ok());
        assert!(matches!(
            validate(&Preset::new("zero", 0)),
            Err(PresetError::OutOfRange { field: "duration", .. })
        ));
        assert!(matches!(
            validate(&Preset::new("  ", 60)),
            Err(PresetError::EmptyName)
        ));

        let mut preset = Preset::new("long alert", 60);
        preset.alert_time = MAX_PRESET_SECS + 1;
        assert!(validate(&preset).is_err());
    }

    #[test]
    fn test_effective_flash() {
        let reminder = ReminderSettings::default();
        let mut preset = Preset::new("p", 60);
        assert_eq!(effective_flash(&preset, &reminder), 10);
        preset.flash_time = None;
        assert_eq!(effective_flash(&preset, &reminder), reminder.flash_seconds);
    }

    #[test]
    fn test_parse_presets_requires_list() {
        assert!(matches!(
            parse_presets(r#"{"name": "x", "duration": 60}"#),
            Err(PresetError::ImportFormat)
        ));
        assert!(matches!(parse_presets("not json"), Err(PresetError::Json(_))));
    }

    #[test]
    fn test_parse_presets_fills_defaults() {
        let presets = parse_presets(r#"[{"name": "Retro", "duration": 3600}]"#).unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets[0].name, "Retro");
        assert_eq!(presets[0].alert_time, 0);
        assert_eq!(presets[0].flash_time, None);
        assert_eq!(presets[0].music, None);
    }

    #[test]
    fn test_parse_presets_rejects_invalid_entry() {
        let result = parse_presets(r#"[{"name": "Bad", "duration": 0}]"#);
        assert!(matches!(result, Err(PresetError::OutOfRange { .. })));
    }

    #[test]
    fn test_export_then_import_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let presets = vec![Preset::new("Planning", 2700)];

        export_presets(file.path(), &presets).unwrap();
        let loaded = import_presets(file.path()).unwrap();

        assert_eq!(loaded, presets);
    }
}
