//! Tests for the audio service command handling
//!
//! Uses a recording output instead of a sound device.

use std::path::{Path, PathBuf};
use std::time::Duration;

use meetclock_core::ResourceResolver;
use tempfile::TempDir;

use super::events::AudioCommand;
use super::service::{AudioOutput, AudioService};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct RecordingOutput {
    plays: Vec<(PathBuf, f32)>,
    gain: f32,
    stops: usize,
    playing: bool,
    fail_decode: bool,
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, path: &Path, volume: f32) -> bool {
        if self.fail_decode {
            return false;
        }
        self.plays.push((path.to_path_buf(), volume));
        self.gain = volume;
        self.playing = true;
        true
    }

    fn set_volume(&mut self, volume: f32) {
        self.gain = volume;
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Directory with a single `alert.mp3`
fn sound_dir() -> (ResourceResolver, TempDir) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("alert.mp3"), b"not really audio").unwrap();
    (ResourceResolver::with_dirs(vec![dir.path().to_path_buf()]), dir)
}

fn service(volume: u8) -> (AudioService<RecordingOutput>, TempDir) {
    let (resolver, dir) = sound_dir();
    (
        AudioService::new(Some(RecordingOutput::default()), resolver, volume),
        dir,
    )
}

fn play(fade_in_ms: u64) -> AudioCommand {
    AudioCommand::Play {
        path: "alert.mp3".to_string(),
        fade_in: Duration::from_millis(fade_in_ms),
    }
}

fn output(service: &AudioService<RecordingOutput>) -> &RecordingOutput {
    service.output().unwrap()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// ═══════════════════════════════════════════════════════════════════════════
// Playback
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_play_without_fade_starts_at_target_volume() {
    let (mut svc, _dir) = service(80);
    assert!(svc.handle(play(0)));

    let out = output(&svc);
    assert_eq!(out.plays.len(), 1);
    assert!(close(out.plays[0].1, 0.8));
    assert!(!svc.is_fading());
}

#[test]
fn test_play_with_fade_ramps_from_silence() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(2000));

    assert!(close(output(&svc).plays[0].1, 0.0));
    assert!(svc.is_fading());

    // 2000 ms / 50 ms = 40 steps of 2.0
    for _ in 0..39 {
        svc.step_fade();
    }
    assert!(svc.is_fading());
    assert!(close(svc.volume(), 78.0));

    svc.step_fade();
    assert!(!svc.is_fading());
    assert!(close(svc.volume(), 80.0));
    assert!(close(output(&svc).gain, 0.8));
    assert_eq!(output(&svc).stops, 0);
}

#[test]
fn test_missing_file_is_skipped() {
    let (mut svc, _dir) = service(80);
    svc.handle(AudioCommand::Play {
        path: "nope.mp3".to_string(),
        fade_in: Duration::ZERO,
    });
    assert!(output(&svc).plays.is_empty());
}

#[test]
fn test_undecodable_file_does_not_start_fade() {
    let (resolver, _dir) = sound_dir();
    let out = RecordingOutput {
        fail_decode: true,
        ..Default::default()
    };
    let mut svc = AudioService::new(Some(out), resolver, 80);
    svc.handle(play(1000));
    assert!(!svc.is_fading());
}

#[test]
fn test_no_output_device_still_accepts_commands() {
    let (resolver, _dir) = sound_dir();
    let mut svc: AudioService<RecordingOutput> = AudioService::new(None, resolver, 80);
    assert!(svc.handle(play(0)));
    assert!(svc.handle(AudioCommand::Stop {
        fade_out: Duration::from_millis(500)
    }));
    assert!(!svc.handle(AudioCommand::Shutdown));
}

// ═══════════════════════════════════════════════════════════════════════════
// Stop
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_stop_with_fade_stops_after_reaching_silence() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(0));
    svc.handle(AudioCommand::Stop {
        fade_out: Duration::from_millis(500),
    });
    assert!(svc.is_fading());
    assert_eq!(output(&svc).stops, 0);

    for _ in 0..10 {
        svc.step_fade();
    }
    assert!(!svc.is_fading());
    assert_eq!(output(&svc).stops, 1);
    assert!(!output(&svc).playing);
}

#[test]
fn test_stop_with_fade_when_idle_stops_immediately() {
    let (mut svc, _dir) = service(80);
    svc.handle(AudioCommand::Stop {
        fade_out: Duration::from_millis(500),
    });
    assert!(!svc.is_fading());
    assert_eq!(output(&svc).stops, 1);
}

#[test]
fn test_stop_cancels_running_fade_in() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(2000));
    svc.step_fade();
    svc.handle(AudioCommand::Stop {
        fade_out: Duration::ZERO,
    });
    assert!(!svc.is_fading());
    assert_eq!(output(&svc).stops, 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Volume & Mute
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_set_volume_applies_when_idle() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(0));
    svc.handle(AudioCommand::SetVolume(50));
    assert!(close(output(&svc).gain, 0.5));
}

#[test]
fn test_set_volume_during_fade_waits_for_fade() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(1000));
    svc.step_fade();
    let gain = output(&svc).gain;

    svc.handle(AudioCommand::SetVolume(20));
    assert!(close(output(&svc).gain, gain));
    assert!(svc.is_fading());
}

#[test]
fn test_mute_silences_without_touching_volume() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(0));

    svc.handle(AudioCommand::ToggleMute);
    assert!(svc.is_muted());
    assert!(close(output(&svc).gain, 0.0));
    assert!(close(svc.volume(), 80.0));

    svc.handle(AudioCommand::ToggleMute);
    assert!(!svc.is_muted());
    assert!(close(output(&svc).gain, 0.8));
}

#[test]
fn test_shutdown_stops_playback() {
    let (mut svc, _dir) = service(80);
    svc.handle(play(0));
    assert!(!svc.handle(AudioCommand::Shutdown));
    assert_eq!(output(&svc).stops, 1);
}
