//! Tests for the application controller
//!
//! Verifies the action table:
//! - Shortcut vs button start/pause (mode switching only from shortcuts)
//! - Reset, preset cycling, prompts, window toggles
//! - Timer events turning into audio and flash effects
//! - Settings that persist immediately

use std::time::{Duration, Instant};

use meetclock_core::types::{AppConfig, PromptKind, ShortcutAction};
use meetclock_core::{ConfigSource, Geometry, Readout, ViewMode};
use meetclock_overlay::OverlayAction;
use tempfile::TempDir;

use super::controller::{Controller, Effect, NO_PROMPT_NOTICE, NO_RESTORE_NOTICE};
use crate::audio::AudioCommand;

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn temp_source() -> (ConfigSource, TempDir) {
    let dir = TempDir::new().unwrap();
    (ConfigSource::File(dir.path().join("config.toml")), dir)
}

fn controller() -> (Controller, TempDir) {
    let (source, dir) = temp_source();
    (Controller::new(AppConfig::default(), source, 0), dir)
}

fn saved(dir: &TempDir) -> AppConfig {
    ConfigSource::File(dir.path().join("config.toml"))
        .try_load()
        .unwrap()
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn stop_now() -> Effect {
    Effect::Audio(AudioCommand::Stop {
        fade_out: Duration::ZERO,
    })
}

fn clock(minutes: &str, seconds: &str) -> Readout {
    Readout::Clock {
        minutes: minutes.to_string(),
        seconds: seconds.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Start / Pause / Reset
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_starts_on_first_preset() {
    let (c, _dir) = controller();
    let data = c.data();
    assert_eq!(data.label, "5 min");
    assert_eq!(data.readout, clock("05", "00"));
    assert_eq!(data.progress, 1.0);
    assert!(!data.running);
}

#[test]
fn test_start_pause_shortcut_switches_mode() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();

    let effects = c.shortcut(ShortcutAction::StartPause, t0);
    assert_eq!(effects, vec![Effect::EnterMode(ViewMode::Simple)]);
    assert!(c.countdown().is_running());

    let effects = c.shortcut(ShortcutAction::StartPause, t0 + secs(1));
    assert_eq!(
        effects,
        vec![Effect::Flash(false), Effect::EnterMode(ViewMode::Normal)]
    );
    assert!(!c.countdown().is_running());
}

#[test]
fn test_start_button_keeps_mode() {
    let (mut c, _dir) = controller();
    let effects = c.button(OverlayAction::StartPause, Instant::now());
    assert!(effects.is_empty());
    assert!(c.countdown().is_running());
    assert!(c.data().running);
}

#[test]
fn test_reset_shortcut_rewinds_stops_audio_and_leaves_simple_mode() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.shortcut(ShortcutAction::StartPause, t0);
    c.tick(t0 + secs(30));
    assert_eq!(c.data().readout, clock("04", "30"));

    let effects = c.shortcut(ShortcutAction::Reset, t0 + secs(31));
    assert!(effects.contains(&stop_now()));
    assert_eq!(effects.last(), Some(&Effect::EnterMode(ViewMode::Normal)));
    assert_eq!(c.data().readout, clock("05", "00"));
    assert!(!c.countdown().is_running());
}

#[test]
fn test_reset_button_does_not_change_mode() {
    let (mut c, _dir) = controller();
    let effects = c.button(OverlayAction::Reset, Instant::now());
    assert!(effects.contains(&stop_now()));
    assert!(!effects.iter().any(|e| matches!(e, Effect::EnterMode(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// Presets
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preset_cycling_wraps() {
    let (mut c, _dir) = controller();
    let now = Instant::now();

    c.shortcut(ShortcutAction::PrevPreset, now);
    assert_eq!(c.preset_index(), 2);
    assert_eq!(c.data().label, "15 min");
    assert_eq!(c.data().readout, clock("15", "00"));

    c.shortcut(ShortcutAction::NextPreset, now);
    assert_eq!(c.preset_index(), 0);
    assert_eq!(c.data().label, "5 min");
}

#[test]
fn test_loading_preset_stops_running_countdown() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);
    c.shortcut(ShortcutAction::NextPreset, t0 + secs(5));
    assert!(!c.countdown().is_running());
    assert_eq!(c.data().readout, clock("10", "00"));
}

#[test]
fn test_empty_preset_list() {
    let (source, _dir) = temp_source();
    let mut config = AppConfig::default();
    config.presets.clear();
    let mut c = Controller::new(config, source, 0);

    assert_eq!(c.data().label, "No presets");
    assert_eq!(c.data().progress, 0.0);
    assert!(c.shortcut(ShortcutAction::NextPreset, Instant::now()).is_empty());
    // Starting a zero-length countdown does nothing
    c.button(OverlayAction::StartPause, Instant::now());
    assert!(!c.countdown().is_running());
}

// ═══════════════════════════════════════════════════════════════════════════
// Timer Events
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_alert_plays_preset_music_with_fade() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);

    assert!(c.tick(t0 + secs(239)).is_empty());
    let effects = c.tick(t0 + secs(240) + Duration::from_millis(1));
    assert_eq!(
        effects,
        vec![
            Effect::Audio(AudioCommand::SetVolume(80)),
            Effect::Audio(AudioCommand::Play {
                path: "sounds/time.mp3".to_string(),
                fade_in: Duration::from_millis(2000),
            }),
        ]
    );
    // Only once
    assert!(c.tick(t0 + secs(241)).is_empty());
}

#[test]
fn test_alert_without_music_is_silent() {
    let (source, _dir) = temp_source();
    let mut config = AppConfig::default();
    config.presets[0].music = None;
    let mut c = Controller::new(config, source, 0);
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);
    assert!(c.tick(t0 + secs(250)).is_empty());
}

#[test]
fn test_flash_blinks_near_the_end() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);
    c.tick(t0 + secs(250));

    // 9 s left: flash phase starts unlit, first toggle half a second later
    assert!(c.tick(t0 + secs(291)).is_empty());
    let effects = c.tick(t0 + secs(291) + Duration::from_millis(500));
    assert_eq!(effects, vec![Effect::Flash(true)]);
    let effects = c.tick(t0 + secs(292));
    assert_eq!(effects, vec![Effect::Flash(false)]);
}

#[test]
fn test_finish_clears_flash_and_shows_zero() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);
    c.tick(t0 + secs(295));

    let effects = c.tick(t0 + secs(301));
    assert_eq!(effects.last(), Some(&Effect::Flash(false)));
    assert_eq!(c.data().readout, clock("00", "00"));
    assert!(!c.data().running);
}

// ═══════════════════════════════════════════════════════════════════════════
// Window & Audio Actions
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_window_actions() {
    let (mut c, _dir) = controller();
    let now = Instant::now();
    assert_eq!(
        c.shortcut(ShortcutAction::ToggleWindow, now),
        vec![Effect::ToggleVisible]
    );
    assert_eq!(c.button(OverlayAction::Close, now), vec![Effect::Exit]);
    assert_eq!(
        c.shortcut(ShortcutAction::Mute, now),
        vec![Effect::Audio(AudioCommand::ToggleMute)]
    );
}

#[test]
fn test_minimize_hides_only_when_restorable() {
    let (mut c, _dir) = controller();
    let now = Instant::now();
    assert_eq!(
        c.button(OverlayAction::Minimize, now),
        vec![Effect::Notice(NO_RESTORE_NOTICE.to_string())]
    );

    c.set_restorable(true);
    assert_eq!(c.button(OverlayAction::Minimize, now), vec![Effect::Hide]);

    c.set_restorable(false);
    assert!(!c.button(OverlayAction::Minimize, now).contains(&Effect::Hide));
}

#[test]
fn test_toggle_top_persists() {
    let (mut c, dir) = controller();
    let effects = c.shortcut(ShortcutAction::ToggleTop, Instant::now());
    assert_eq!(effects, vec![Effect::SetTopmost(true)]);

    let saved = saved(&dir);
    assert!(saved.window.topmost);
}

#[test]
fn test_opacity_steps_are_clamped_and_persisted() {
    let (mut c, dir) = controller();
    let now = Instant::now();

    assert_eq!(
        c.shortcut(ShortcutAction::OpacityUp, now),
        vec![Effect::Opacity(1.0)]
    );
    assert_eq!(
        c.shortcut(ShortcutAction::OpacityDown, now),
        vec![Effect::Opacity(0.9)]
    );
    for _ in 0..20 {
        c.shortcut(ShortcutAction::OpacityDown, now);
    }
    assert_eq!(c.config().window.opacity, 0.2);

    let saved = saved(&dir);
    assert_eq!(saved.window.opacity, 0.2);
}

#[test]
fn test_prompt_plays_configured_file_without_fade() {
    let (mut c, _dir) = controller();
    let effects = c.button(
        OverlayAction::Prompt(PromptKind::Confidential),
        Instant::now(),
    );
    assert_eq!(
        effects,
        vec![
            stop_now(),
            Effect::Audio(AudioCommand::SetVolume(80)),
            Effect::Audio(AudioCommand::Play {
                path: "sounds/prompt_confidential.wav".to_string(),
                fade_in: Duration::ZERO,
            }),
        ]
    );
}

#[test]
fn test_prompt_without_file_shows_notice() {
    let (source, _dir) = temp_source();
    let mut config = AppConfig::default();
    config.audio.prompt_regular = String::new();
    let mut c = Controller::new(config, source, 0);

    let effects = c.button(OverlayAction::Prompt(PromptKind::Regular), Instant::now());
    assert_eq!(
        effects,
        vec![stop_now(), Effect::Notice(NO_PROMPT_NOTICE.to_string())]
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_apply_config_reloads_preset_when_paused() {
    let (mut c, _dir) = controller();
    let mut config = AppConfig::default();
    config.presets[0].duration = 120;

    let effects = c.apply_config(config);
    assert_eq!(effects[0], Effect::Reconfigured);
    assert_eq!(c.data().readout, clock("02", "00"));
}

#[test]
fn test_apply_config_keeps_running_countdown() {
    let (mut c, _dir) = controller();
    let t0 = Instant::now();
    c.button(OverlayAction::StartPause, t0);

    let mut config = AppConfig::default();
    config.presets.truncate(1);
    config.presets[0].duration = 120;
    c.apply_config(config);

    assert!(c.countdown().is_running());
    assert_eq!(c.countdown().duration(), secs(300));
}

#[test]
fn test_apply_config_clamps_cursor() {
    let (source, _dir) = temp_source();
    let mut c = Controller::new(AppConfig::default(), source, 2);
    let mut config = AppConfig::default();
    config.presets.truncate(1);
    c.apply_config(config);
    assert_eq!(c.preset_index(), 0);
}

#[test]
fn test_settings_button_reloads_from_disk() {
    let (source, _dir) = temp_source();
    let mut on_disk = AppConfig::default();
    on_disk.window.opacity = 0.5;
    source.save(&on_disk).unwrap();

    let mut c = Controller::new(AppConfig::default(), source, 0);
    let effects = c.button(OverlayAction::Settings, Instant::now());
    assert!(effects.contains(&Effect::Reconfigured));
    assert!(effects.contains(&Effect::Opacity(0.5)));
    assert!(effects.iter().any(|e| matches!(e, Effect::Notice(_))));
    assert_eq!(c.config().window.opacity, 0.5);
}

#[test]
fn test_store_geometry_persists_window() {
    let (mut c, dir) = controller();
    c.store_geometry(Geometry {
        x: 40,
        y: 60,
        width: 420,
        height: 300,
    });
    let saved = saved(&dir);
    assert_eq!((saved.window.x, saved.window.y), (40, 60));
    assert_eq!((saved.window.width, saved.window.height), (420, 300));
}
