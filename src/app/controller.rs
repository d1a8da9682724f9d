//! Application controller
//!
//! Pure state: configuration, countdown and preset cursor.
//! Inputs (shortcuts, button clicks, ticks) come in with the current
//! instant and come out as [`Effect`]s for the window and audio layers, so
//! the whole action table is testable without a display or sound device.

use std::time::{Duration, Instant};

use meetclock_core::types::{AppConfig, OPACITY_STEP, Preset, PromptKind, ShortcutAction};
use meetclock_core::{
    ConfigSource, Countdown, CountdownConfig, CountdownEvent, Geometry, PresetCursor, ViewMode,
    adjust_opacity, format_remaining,
};
use meetclock_overlay::{CountdownData, OverlayAction};
use tracing::{debug, info, warn};

use crate::audio::AudioCommand;

/// Shown when a prompt is requested but no file is configured
pub const NO_PROMPT_NOTICE: &str = "No prompt sound configured";
/// Shown instead of hiding when nothing could bring the window back
pub const NO_RESTORE_NOTICE: &str = "Bind toggle_window to minimise";
const NO_PRESETS_LABEL: &str = "No presets";

/// Something the window or audio layer must do
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Audio(AudioCommand),
    EnterMode(ViewMode),
    ToggleVisible,
    Hide,
    SetTopmost(bool),
    Opacity(f32),
    Flash(bool),
    Notice(String),
    /// Configuration was replaced; restyle and re-register shortcuts
    Reconfigured,
    Exit,
}

pub struct Controller {
    config: AppConfig,
    source: ConfigSource,
    countdown: Countdown,
    cursor: PresetCursor,
    /// A toggle_window shortcut is registered, so hiding is reversible
    restorable: bool,
}

impl Controller {
    pub fn new(config: AppConfig, source: ConfigSource, preset: usize) -> Self {
        let cursor = PresetCursor::new(preset, config.presets.len());
        let mut controller = Self {
            config,
            source,
            countdown: Countdown::default(),
            cursor,
            restorable: false,
        };
        controller.load_preset();
        controller
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn preset_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn set_restorable(&mut self, restorable: bool) {
        self.restorable = restorable;
    }

    fn current_preset(&self) -> Option<&Preset> {
        self.cursor.current(&self.config.presets)
    }

    /// Snapshot for the overlay
    pub fn data(&self) -> CountdownData {
        CountdownData {
            label: self
                .current_preset()
                .map_or_else(|| NO_PRESETS_LABEL.to_string(), |p| p.name.clone()),
            readout: format_remaining(
                self.config.display.format,
                self.countdown.remaining(),
                self.countdown.duration(),
            ),
            progress: self.countdown.progress(),
            running: self.countdown.is_running(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inputs
    // ─────────────────────────────────────────────────────────────────────────

    pub fn shortcut(&mut self, action: ShortcutAction, now: Instant) -> Vec<Effect> {
        debug!(action = %action, "Shortcut");
        match action {
            ShortcutAction::StartPause => {
                let mut effects = self.toggle(now);
                let mode = if self.countdown.is_running() {
                    ViewMode::Simple
                } else {
                    ViewMode::Normal
                };
                effects.push(Effect::EnterMode(mode));
                effects
            }
            ShortcutAction::Reset => {
                let mut effects = self.reset();
                effects.push(Effect::EnterMode(ViewMode::Normal));
                effects
            }
            ShortcutAction::NextPreset => match self.cursor.next() {
                Some(_) => self.load_preset(),
                None => Vec::new(),
            },
            ShortcutAction::PrevPreset => match self.cursor.prev() {
                Some(_) => self.load_preset(),
                None => Vec::new(),
            },
            ShortcutAction::ToggleWindow => vec![Effect::ToggleVisible],
            ShortcutAction::ToggleTop => {
                self.config.window.topmost = !self.config.window.topmost;
                self.persist();
                vec![Effect::SetTopmost(self.config.window.topmost)]
            }
            ShortcutAction::OpacityUp => self.step_opacity(OPACITY_STEP),
            ShortcutAction::OpacityDown => self.step_opacity(-OPACITY_STEP),
            ShortcutAction::Mute => vec![Effect::Audio(AudioCommand::ToggleMute)],
        }
    }

    pub fn button(&mut self, action: OverlayAction, now: Instant) -> Vec<Effect> {
        debug!(action = ?action, "Button");
        match action {
            OverlayAction::StartPause => self.toggle(now),
            OverlayAction::Reset => self.reset(),
            OverlayAction::Prompt(kind) => self.prompt(kind),
            OverlayAction::Settings => self.reload(),
            OverlayAction::Minimize if self.restorable => vec![Effect::Hide],
            OverlayAction::Minimize => {
                warn!("Minimise ignored: no toggle_window shortcut is registered");
                vec![Effect::Notice(NO_RESTORE_NOTICE.to_string())]
            }
            OverlayAction::Close => vec![Effect::Exit],
        }
    }

    /// Advance the countdown; call every tick
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let events = self.countdown.tick(now);
        self.timer_effects(events)
    }

    /// Re-read the configuration from disk (the Settings button)
    pub fn reload(&mut self) -> Vec<Effect> {
        let config = self.source.load();
        info!(presets = config.presets.len(), "Configuration reloaded");
        let mut effects = self.apply_config(config);
        effects.push(Effect::Notice("Settings reloaded".to_string()));
        effects
    }

    /// Replace the configuration. The running countdown keeps its timings;
    /// a paused one picks up the (possibly edited) current preset.
    pub fn apply_config(&mut self, config: AppConfig) -> Vec<Effect> {
        self.config = config;
        self.cursor.clamp_to(self.config.presets.len());

        let mut effects = vec![
            Effect::Reconfigured,
            Effect::SetTopmost(self.config.window.topmost),
            Effect::Opacity(self.config.window.opacity),
            Effect::Audio(AudioCommand::SetVolume(self.volume())),
        ];
        if !self.countdown.is_running() {
            effects.extend(self.load_preset());
        }
        effects
    }

    /// Remember the window geometry for the next start
    pub fn store_geometry(&mut self, geometry: Geometry) {
        geometry.store(&mut self.config.window);
        self.persist();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    fn toggle(&mut self, now: Instant) -> Vec<Effect> {
        let events = self.countdown.toggle(now);
        info!(running = self.countdown.is_running(), "Countdown toggled");
        self.timer_effects(events)
    }

    fn reset(&mut self) -> Vec<Effect> {
        let events = self.countdown.reset();
        let mut effects = self.timer_effects(events);
        effects.push(Effect::Audio(AudioCommand::Stop {
            fade_out: Duration::ZERO,
        }));
        effects
    }

    fn load_preset(&mut self) -> Vec<Effect> {
        let timings = match self.current_preset() {
            Some(preset) => {
                info!(preset = %preset.name, duration = preset.duration, "Preset loaded");
                CountdownConfig::from_preset(preset, &self.config.reminder)
            }
            None => CountdownConfig::default(),
        };
        let events = self.countdown.configure(timings);
        self.timer_effects(events)
    }

    fn step_opacity(&mut self, delta: f32) -> Vec<Effect> {
        let opacity = adjust_opacity(self.config.window.opacity, delta);
        self.config.window.opacity = opacity;
        self.persist();
        vec![Effect::Opacity(opacity)]
    }

    fn prompt(&mut self, kind: PromptKind) -> Vec<Effect> {
        let mut effects = vec![Effect::Audio(AudioCommand::Stop {
            fade_out: Duration::ZERO,
        })];
        match self.config.audio.prompt(kind) {
            Some(path) => {
                effects.push(Effect::Audio(AudioCommand::SetVolume(self.volume())));
                effects.push(Effect::Audio(AudioCommand::Play {
                    path: path.to_string(),
                    fade_in: Duration::ZERO,
                }));
            }
            None => effects.push(Effect::Notice(NO_PROMPT_NOTICE.to_string())),
        }
        effects
    }

    fn volume(&self) -> u8 {
        self.config.audio.volume_percent() as u8
    }

    fn timer_effects(&self, events: Vec<CountdownEvent>) -> Vec<Effect> {
        let mut effects = Vec::new();
        for event in events {
            match event {
                CountdownEvent::AlertReached => {
                    let music = self
                        .current_preset()
                        .and_then(|p| p.music.as_deref())
                        .map(str::trim)
                        .filter(|m| !m.is_empty());
                    info!(music = ?music, "Alert threshold reached");
                    if let Some(music) = music {
                        effects.push(Effect::Audio(AudioCommand::SetVolume(self.volume())));
                        effects.push(Effect::Audio(AudioCommand::Play {
                            path: music.to_string(),
                            fade_in: Duration::from_millis(self.config.audio.fade_duration.into()),
                        }));
                    }
                }
                CountdownEvent::Flash(lit) => effects.push(Effect::Flash(lit)),
                CountdownEvent::Finished => info!("Countdown finished"),
                CountdownEvent::Tick(_) => {}
            }
        }
        effects
    }

    fn persist(&self) {
        if let Err(e) = self.source.save(&self.config) {
            warn!(error = %e, "Failed to save configuration");
        }
    }
}
