use std::time::{Duration, Instant};

use meetclock_types::{Preset, ReminderSettings};

use crate::presets::effective_flash;

/// How often the application should call [`Countdown::tick`]
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Half-period of the flash blink (lit/unlit toggles at this rate)
pub const FLASH_INTERVAL: Duration = Duration::from_millis(500);

/// Something the UI or audio layer needs to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Remaining time changed (emitted last on every tick and on reset)
    Tick(Duration),
    /// Remaining time crossed the alert offset
    AlertReached,
    /// Blink state changed; `true` means the flash color is showing
    Flash(bool),
    /// Remaining time hit zero
    Finished,
}

/// Timings for one countdown run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownConfig {
    pub duration: Duration,
    /// Zero disables the alert
    pub alert_at: Duration,
    pub flash_at: Duration,
}

impl CountdownConfig {
    pub fn from_secs(duration: u32, alert_at: u32, flash_at: u32) -> Self {
        Self {
            duration: Duration::from_secs(duration.into()),
            alert_at: Duration::from_secs(alert_at.into()),
            flash_at: Duration::from_secs(flash_at.into()),
        }
    }

    /// Timings of a preset. Presets without their own flash offset use the
    /// reminder default.
    pub fn from_preset(preset: &Preset, reminder: &ReminderSettings) -> Self {
        Self::from_secs(
            preset.duration,
            preset.alert_time,
            effective_flash(preset, reminder),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Blink {
    lit: bool,
    next_toggle: Instant,
}

/// Countdown/alerting state machine
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    config: CountdownConfig,
    remaining: Duration,
    running: bool,
    alert_fired: bool,
    blink: Option<Blink>,
    last_tick: Option<Instant>,
}

impl Countdown {
    pub fn new(config: CountdownConfig) -> Self {
        let mut countdown = Self::default();
        countdown.configure(config);
        countdown
    }

    /// Replace the timings and reset
    pub fn configure(&mut self, config: CountdownConfig) -> Vec<CountdownEvent> {
        self.config = config;
        self.reset()
    }

    /// Start counting. Does nothing once the countdown has run out.
    pub fn start(&mut self, now: Instant) -> Vec<CountdownEvent> {
        if self.remaining.is_zero() {
            return Vec::new();
        }
        self.running = true;
        self.last_tick = Some(now);
        Vec::new()
    }

    /// Stop counting and clear the flash
    pub fn pause(&mut self) -> Vec<CountdownEvent> {
        self.running = false;
        self.last_tick = None;
        self.blink = None;
        vec![CountdownEvent::Flash(false)]
    }

    pub fn toggle(&mut self, now: Instant) -> Vec<CountdownEvent> {
        if self.running {
            self.pause()
        } else {
            self.start(now)
        }
    }

    /// Pause and rewind to the full duration, re-arming the alert
    pub fn reset(&mut self) -> Vec<CountdownEvent> {
        let mut events = self.pause();
        self.remaining = self.config.duration;
        self.alert_fired = false;
        events.push(CountdownEvent::Tick(self.remaining));
        events
    }

    /// Advance to `now`. Returns nothing while paused.
    pub fn tick(&mut self, now: Instant) -> Vec<CountdownEvent> {
        if !self.running {
            return Vec::new();
        }
        let mut events = Vec::new();

        let last = self.last_tick.unwrap_or(now);
        self.remaining = self
            .remaining
            .saturating_sub(now.saturating_duration_since(last));
        self.last_tick = Some(now);

        if !self.config.alert_at.is_zero()
            && self.remaining <= self.config.alert_at
            && !self.alert_fired
        {
            self.alert_fired = true;
            events.push(CountdownEvent::AlertReached);
        }

        if self.remaining <= self.config.flash_at && self.blink.is_none() {
            self.blink = Some(Blink {
                lit: false,
                next_toggle: now + FLASH_INTERVAL,
            });
        }
        if let Some(blink) = self.blink.as_mut() {
            while blink.next_toggle <= now {
                blink.lit = !blink.lit;
                blink.next_toggle += FLASH_INTERVAL;
                events.push(CountdownEvent::Flash(blink.lit));
            }
        }

        if self.remaining.is_zero() {
            events.extend(self.pause());
            events.push(CountdownEvent::Finished);
        }

        events.push(CountdownEvent::Tick(self.remaining));
        events
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn duration(&self) -> Duration {
        self.config.duration
    }

    pub fn config(&self) -> CountdownConfig {
        self.config
    }

    /// Fraction of the duration still remaining (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        if self.config.duration.is_zero() {
            return 0.0;
        }
        (self.remaining.as_secs_f64() / self.config.duration.as_secs_f64()) as f32
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the flash phase is active (regardless of the current blink)
    pub fn is_flashing(&self) -> bool {
        self.blink.is_some()
    }

    /// Whether the flash color is currently showing
    pub fn is_lit(&self) -> bool {
        self.blink.is_some_and(|b| b.lit)
    }
}
