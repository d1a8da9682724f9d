//! Audio playback service
//!
//! Runs a current-thread tokio runtime on its own OS thread (the rodio
//! output stream cannot leave the thread that opened it), selecting over
//! the command channel and a 50 ms fade tick.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread::JoinHandle;

use meetclock_core::fade::MAX_VOLUME;
use meetclock_core::{FADE_STEP_INTERVAL, FadeEnvelope, FadeProgress, FadeStart, ResourceResolver};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::events::AudioCommand;
use crate::error::AppError;

/// Playback backend driven by [`AudioService`]
pub trait AudioOutput {
    /// Start playing `path`, replacing anything already playing.
    /// Returns false when the file could not be opened or decoded.
    fn play(&mut self, path: &Path, volume: f32) -> bool;
    /// Output gain, 0.0 - 1.0
    fn set_volume(&mut self, volume: f32);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// rodio backend
// ─────────────────────────────────────────────────────────────────────────────

/// Default output device through rodio
pub struct RodioOutput {
    // Dropping the stream closes the device
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn open() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
                sink: None,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "No audio output device, sound disabled");
                None
            }
        }
    }
}

impl AudioOutput for RodioOutput {
    fn play(&mut self, path: &Path, volume: f32) -> bool {
        self.stop();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot open sound file");
                return false;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot decode sound file");
                return false;
            }
        };
        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot create audio sink");
                return false;
            }
        };

        sink.set_volume(volume);
        sink.append(source);
        self.sink = Some(sink);
        true
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the output, the fade envelope and the mute flag
pub struct AudioService<O: AudioOutput> {
    output: Option<O>,
    resolver: ResourceResolver,
    envelope: FadeEnvelope,
    muted: bool,
}

impl<O: AudioOutput> AudioService<O> {
    /// `output` of `None` keeps the service alive with playback disabled
    pub fn new(output: Option<O>, resolver: ResourceResolver, volume: u8) -> Self {
        Self {
            output,
            resolver,
            envelope: FadeEnvelope::new(volume as f32),
            muted: false,
        }
    }

    pub fn volume(&self) -> f32 {
        self.envelope.volume()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_fading(&self) -> bool {
        self.envelope.is_fading()
    }

    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.envelope.volume() / MAX_VOLUME
        }
    }

    fn apply_gain(&mut self) {
        let gain = self.gain();
        if let Some(output) = self.output.as_mut() {
            output.set_volume(gain);
        }
    }

    fn stop_output(&mut self) {
        if let Some(output) = self.output.as_mut() {
            output.stop();
        }
    }

    /// Handle one command. Returns false on `Shutdown`.
    pub fn handle(&mut self, command: AudioCommand) -> bool {
        match command {
            AudioCommand::Play { path, fade_in } => self.play(&path, fade_in),
            AudioCommand::Stop { fade_out } => self.stop(fade_out),
            AudioCommand::SetVolume(volume) => {
                self.envelope.set_target_volume(volume as f32);
                if !self.envelope.is_fading() {
                    self.apply_gain();
                }
            }
            AudioCommand::ToggleMute => {
                self.muted = !self.muted;
                tracing::info!(muted = self.muted, "Audio mute toggled");
                self.apply_gain();
            }
            AudioCommand::Shutdown => {
                self.envelope.cancel();
                self.stop_output();
                return false;
            }
        }
        true
    }

    fn play(&mut self, configured: &str, fade_in: std::time::Duration) {
        let Some(path) = self.resolver.find(configured) else {
            tracing::warn!(path = configured, "Sound file not found, skipping");
            return;
        };

        let target = self.envelope.target_volume();
        let start = if fade_in.is_zero() { target } else { 0.0 };
        self.envelope.begin_at(start);
        let gain = self.gain();
        let Some(output) = self.output.as_mut() else {
            return;
        };
        if !output.play(&path, gain) {
            return;
        }
        tracing::info!(path = %path.display(), fade_in_ms = fade_in.as_millis() as u64, "Playing");

        if !fade_in.is_zero() {
            self.fade_to(target, fade_in, false);
        }
    }

    fn stop(&mut self, fade_out: std::time::Duration) {
        let playing = self.output.as_ref().is_some_and(|o| o.is_playing());
        if !fade_out.is_zero() && playing {
            self.fade_to(0.0, fade_out, true);
        } else {
            self.envelope.cancel();
            self.stop_output();
        }
    }

    fn fade_to(&mut self, target: f32, duration: std::time::Duration, stop_after: bool) {
        match self.envelope.fade_to(target, duration, stop_after) {
            FadeStart::Started => {}
            FadeStart::Completed { stop } => {
                self.apply_gain();
                if stop {
                    self.stop_output();
                }
            }
        }
    }

    /// One fade step; called every 50 ms while a fade runs
    pub fn step_fade(&mut self) {
        match self.envelope.advance() {
            None => {}
            Some(FadeProgress::Ramping(_)) => self.apply_gain(),
            Some(FadeProgress::Finished { stop }) => {
                self.apply_gain();
                if stop {
                    self.stop_output();
                }
            }
        }
    }

    /// Command loop; returns on `Shutdown` or when every sender is gone
    pub async fn run(mut self, mut commands: mpsc::Receiver<AudioCommand>) {
        let mut fade_tick = tokio::time::interval(FADE_STEP_INTERVAL);
        fade_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle(command) {
                        break;
                    }
                }
                _ = fade_tick.tick(), if self.envelope.is_fading() => self.step_fade(),
            }
        }

        self.envelope.cancel();
        self.stop_output();
        tracing::debug!("Audio service stopped");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Sender side of the audio thread
pub struct AudioHandle {
    tx: mpsc::Sender<AudioCommand>,
    thread: Option<JoinHandle<()>>,
}

impl AudioHandle {
    /// Queue a command; dropped with a log line if the thread is gone
    pub fn send(&self, command: AudioCommand) {
        if let Err(e) = self.tx.try_send(command) {
            tracing::warn!(error = %e, "Audio command dropped");
        }
    }

    /// Stop playback and join the audio thread
    pub fn shutdown(mut self) {
        self.send(AudioCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Audio thread panicked");
            }
        }
    }
}

/// Start the audio thread at `volume` (0-100)
pub fn spawn(resolver: ResourceResolver, volume: u8) -> Result<AudioHandle, AppError> {
    // 64 is plenty: commands come from user input and timer events
    let (tx, rx) = mpsc::channel(64);

    let thread = std::thread::Builder::new()
        .name("meetclock-audio".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to build audio runtime");
                    return;
                }
            };
            let service = AudioService::new(RodioOutput::open(), resolver, volume);
            runtime.block_on(service.run(rx));
        })
        .map_err(AppError::AudioThread)?;

    Ok(AudioHandle {
        tx,
        thread: Some(thread),
    })
}
