//! Application loop
//!
//! Owns the overlay window, the audio thread and the shortcut bindings, and
//! drives the [`Controller`] every 20 ms: poll window events, dispatch
//! clicks and hotkeys, tick the countdown, apply the resulting effects and
//! repaint when something visible changed.

mod controller;

#[cfg(test)]
mod controller_tests;

pub use controller::{Controller, Effect, NO_PROMPT_NOTICE, NO_RESTORE_NOTICE};

use std::time::Instant;

use global_hotkey::GlobalHotKeyManager;
use meetclock_core::presets::find_preset;
use meetclock_core::types::ShortcutAction;
use meetclock_core::{
    ConfigSource, Geometry, ModeGeometry, ResourceResolver, TICK_INTERVAL, ViewMode,
};
use meetclock_overlay::{CountdownOverlay, CountdownStyle, OverlayConfig};
use tracing::{error, info, warn};

use crate::audio::{self, AudioCommand, AudioHandle};
use crate::error::AppError;
use crate::hotkeys::HotkeyBindings;

/// Options from `meetclock run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Preset index or name to start with
    pub preset: Option<String>,
    /// Start in simple mode
    pub simple: bool,
}

pub struct App {
    controller: Controller,
    overlay: CountdownOverlay,
    audio: AudioHandle,
    /// None when the desktop refuses global shortcuts (e.g. pure Wayland)
    hotkeys: Option<GlobalHotKeyManager>,
    bindings: HotkeyBindings,
    geometry: ModeGeometry,
}

impl App {
    pub fn new(source: ConfigSource, options: RunOptions) -> Result<Self, AppError> {
        let config = source.load();

        let preset = match options.preset.as_deref() {
            Some(query) => find_preset(&config.presets, query)
                .ok_or_else(|| AppError::Invalid(format!("no preset matches '{}'", query)))?,
            None => 0,
        };

        let overlay_config =
            OverlayConfig::from_geometry(Geometry::from(&config.window), config.window.topmost);
        let overlay = CountdownOverlay::new(overlay_config, CountdownStyle::from_config(&config))?;
        let audio = audio::spawn(ResourceResolver::from_env(), config.audio.volume_percent() as u8)?;
        let hotkeys = GlobalHotKeyManager::new()
            .inspect_err(|e| warn!(error = %e, "Global shortcuts unavailable"))
            .ok();

        let mut app = Self {
            controller: Controller::new(config, source, preset),
            overlay,
            audio,
            hotkeys,
            bindings: HotkeyBindings::new(),
            geometry: ModeGeometry::new(),
        };
        app.register_hotkeys();
        if options.simple {
            app.enter_mode(ViewMode::Simple);
        }
        app.overlay.set_data(app.controller.data());
        Ok(app)
    }

    fn register_hotkeys(&mut self) {
        if let Some(manager) = self.hotkeys.as_mut() {
            self.bindings
                .register_all(manager, &self.controller.config().shortcuts);
        }
        self.controller
            .set_restorable(self.bindings.is_bound(ShortcutAction::ToggleWindow));
    }

    /// Run until the window is closed
    pub fn run(mut self) -> Result<(), AppError> {
        info!("MeetClock running");
        let mut next_tick = Instant::now();

        loop {
            if !self.overlay.poll_events() {
                info!("Window closed");
                break;
            }

            let now = Instant::now();
            let mut effects = Vec::new();

            if let Some((x, y)) = self.overlay.frame_mut().window_mut().take_click() {
                if let Some(action) = self.overlay.handle_click(x, y) {
                    effects.extend(self.controller.button(action, now));
                }
            }
            for action in self.bindings.pending_actions() {
                effects.extend(self.controller.shortcut(action, now));
            }
            effects.extend(self.controller.tick(now));

            if !self.apply(effects, now) {
                break;
            }

            self.overlay.set_data(self.controller.data());
            self.overlay.expire_notice(now);
            self.overlay.render_if_needed();

            next_tick += TICK_INTERVAL;
            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            } else {
                // Fell behind (suspend, slow frame); don't try to catch up
                next_tick = now;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Apply effects in order. Returns false when the app should exit.
    fn apply(&mut self, effects: Vec<Effect>, now: Instant) -> bool {
        for effect in effects {
            match effect {
                Effect::Audio(command) => self.audio.send(command),
                Effect::EnterMode(mode) => self.enter_mode(mode),
                Effect::ToggleVisible => {
                    let window = self.overlay.frame_mut().window_mut();
                    let visible = !window.is_visible();
                    window.set_visible(visible);
                    if visible {
                        self.overlay.invalidate();
                    }
                }
                Effect::Hide => self.overlay.frame_mut().window_mut().set_visible(false),
                Effect::SetTopmost(topmost) => {
                    self.overlay.frame_mut().window_mut().set_topmost(topmost)
                }
                Effect::Opacity(opacity) => self.overlay.set_opacity(opacity),
                Effect::Flash(lit) => self.overlay.set_flash(lit),
                Effect::Notice(text) => self.overlay.show_notice(text, now),
                Effect::Reconfigured => {
                    self.overlay
                        .set_style(CountdownStyle::from_config(self.controller.config()));
                    self.register_hotkeys();
                }
                Effect::Exit => return false,
            }
        }
        true
    }

    /// Switch view mode, restoring the geometry last used in the new mode
    fn enter_mode(&mut self, mode: ViewMode) {
        let current = self.overlay.frame().window().geometry();
        if let Some(geometry) = self.geometry.switch(current, mode) {
            self.overlay.frame_mut().window_mut().set_geometry(geometry);
        }
        self.overlay.set_mode(mode);
    }

    fn shutdown(mut self) {
        // Persist the normal-mode geometry even when closing from simple mode
        let current = self.overlay.frame().window().geometry();
        let geometry = match self.geometry.mode() {
            ViewMode::Normal => current,
            ViewMode::Simple => self.geometry.remembered(ViewMode::Normal).unwrap_or(current),
        };
        self.controller.store_geometry(geometry);

        if let Some(manager) = self.hotkeys.as_mut() {
            self.bindings.unregister_all(manager);
        }
        self.audio.send(AudioCommand::Stop {
            fade_out: std::time::Duration::ZERO,
        });
        self.audio.shutdown();
        info!("MeetClock stopped");
    }
}

/// Open the window and run until it is closed
pub fn run(source: ConfigSource, options: RunOptions) -> Result<(), AppError> {
    let app = App::new(source, options).inspect_err(|e| error!(error = %e, "Startup failed"))?;
    app.run()
}
