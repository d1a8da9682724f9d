//! Audio fade envelope
//!
//! Linear volume ramp stepped on a fixed [`FADE_STEP_INTERVAL`]. The envelope
//! only does the arithmetic; the audio service owns the sink, calls
//! [`FadeEnvelope::advance`] on its interval and applies the volume.
//!
//! Volumes use a 0-100 scale held as `f32` so ramps with steps smaller than
//! one unit still make progress.

use std::time::Duration;

/// Interval between two fade steps
pub const FADE_STEP_INTERVAL: Duration = Duration::from_millis(50);

pub const MAX_VOLUME: f32 = 100.0;

/// Outcome of [`FadeEnvelope::fade_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStart {
    /// A ramp is running; drive it with `advance`
    Started,
    /// The target was applied immediately. `stop` asks the caller to stop playback.
    Completed { stop: bool },
}

/// Result of one fade step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeProgress {
    Ramping(f32),
    /// Target reached. `stop` asks the caller to stop playback.
    Finished { stop: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    target: f32,
    step: f32,
    stop_after: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FadeEnvelope {
    volume: f32,
    target_volume: f32,
    ramp: Option<Ramp>,
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self::new(80.0)
    }
}

impl FadeEnvelope {
    /// Envelope at rest with `target_volume` as the level fade-ins aim for
    pub fn new(target_volume: f32) -> Self {
        let target_volume = target_volume.clamp(0.0, MAX_VOLUME);
        Self {
            volume: target_volume,
            target_volume,
            ramp: None,
        }
    }

    /// Current output volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn target_volume(&self) -> f32 {
        self.target_volume
    }

    pub fn is_fading(&self) -> bool {
        self.ramp.is_some()
    }

    /// Set the level fade-ins aim for. Applied to the output right away
    /// unless a fade is running.
    pub fn set_target_volume(&mut self, volume: f32) {
        self.target_volume = volume.clamp(0.0, MAX_VOLUME);
        if self.ramp.is_none() {
            self.volume = self.target_volume;
        }
    }

    /// Jump to `volume` without ramping, cancelling any running fade
    pub fn begin_at(&mut self, volume: f32) {
        self.ramp = None;
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }

    pub fn cancel(&mut self) {
        self.ramp = None;
    }

    /// Ramp linearly from the current volume to `target` over `duration`
    pub fn fade_to(&mut self, target: f32, duration: Duration, stop_after: bool) -> FadeStart {
        let target = target.clamp(0.0, MAX_VOLUME);
        let diff = target - self.volume;
        if diff == 0.0 {
            self.ramp = None;
            return FadeStart::Completed { stop: stop_after };
        }

        let steps = duration.as_millis() / FADE_STEP_INTERVAL.as_millis();
        if steps == 0 {
            self.ramp = None;
            self.volume = target;
            return FadeStart::Completed { stop: stop_after };
        }

        self.ramp = Some(Ramp {
            target,
            step: diff / steps as f32,
            stop_after,
        });
        FadeStart::Started
    }

    /// Advance one step. Returns `None` when no fade is running.
    pub fn advance(&mut self) -> Option<FadeProgress> {
        let ramp = self.ramp?;
        let next = self.volume + ramp.step;
        let reached = (ramp.step > 0.0 && next >= ramp.target)
            || (ramp.step < 0.0 && next <= ramp.target);

        if reached {
            self.volume = ramp.target;
            self.ramp = None;
            Some(FadeProgress::Finished {
                stop: ramp.stop_after,
            })
        } else {
            self.volume = next;
            Some(FadeProgress::Ramping(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(m: u64) -> Duration {
        Duration::from_millis(m)
    }

    /// Drive the envelope until the fade finishes, returning the step count
    fn run_to_end(envelope: &mut FadeEnvelope) -> (usize, FadeProgress) {
        let mut steps = 0;
        loop {
            steps += 1;
            match envelope.advance() {
                Some(FadeProgress::Ramping(_)) => continue,
                Some(done) => return (steps, done),
                None => panic!("fade stopped without finishing"),
            }
        }
    }

    #[test]
    fn test_fade_in_ramps_linearly() {
        let mut envelope = FadeEnvelope::new(80.0);
        envelope.begin_at(0.0);

        assert_eq!(envelope.fade_to(80.0, ms(2000), false), FadeStart::Started);
        assert_eq!(envelope.advance(), Some(FadeProgress::Ramping(2.0)));
        assert_eq!(envelope.advance(), Some(FadeProgress::Ramping(4.0)));

        let (steps, done) = run_to_end(&mut envelope);
        assert_eq!(steps, 38);
        assert_eq!(done, FadeProgress::Finished { stop: false });
        assert_eq!(envelope.volume(), 80.0);
        assert!(!envelope.is_fading());
    }

    #[test]
    fn test_fade_out_requests_stop() {
        let mut envelope = FadeEnvelope::new(50.0);
        assert_eq!(envelope.fade_to(0.0, ms(500), true), FadeStart::Started);

        let (steps, done) = run_to_end(&mut envelope);
        assert_eq!(steps, 10);
        assert_eq!(done, FadeProgress::Finished { stop: true });
        assert_eq!(envelope.volume(), 0.0);
    }

    #[test]
    fn test_sub_unit_steps_still_progress() {
        // 10 units over 2 s = 0.25 per step
        let mut envelope = FadeEnvelope::new(10.0);
        envelope.begin_at(0.0);
        envelope.fade_to(10.0, ms(2000), false);

        assert_eq!(envelope.advance(), Some(FadeProgress::Ramping(0.25)));
        let (_, done) = run_to_end(&mut envelope);
        assert_eq!(done, FadeProgress::Finished { stop: false });
        assert_eq!(envelope.volume(), 10.0);
    }

    #[test]
    fn test_same_volume_completes_immediately() {
        let mut envelope = FadeEnvelope::new(80.0);
        assert_eq!(
            envelope.fade_to(80.0, ms(1000), true),
            FadeStart::Completed { stop: true }
        );
        assert!(!envelope.is_fading());
        assert_eq!(envelope.advance(), None);
    }

    #[test]
    fn test_short_duration_jumps_to_target() {
        let mut envelope = FadeEnvelope::new(80.0);
        assert_eq!(
            envelope.fade_to(20.0, ms(30), false),
            FadeStart::Completed { stop: false }
        );
        assert_eq!(envelope.volume(), 20.0);
    }

    #[test]
    fn test_set_target_volume_deferred_while_fading() {
        let mut envelope = FadeEnvelope::new(80.0);
        envelope.begin_at(0.0);
        envelope.fade_to(80.0, ms(1000), false);
        envelope.advance();

        envelope.set_target_volume(30.0);
        assert_eq!(envelope.target_volume(), 30.0);
        assert_eq!(envelope.volume(), 4.0);

        envelope.cancel();
        envelope.set_target_volume(30.0);
        assert_eq!(envelope.volume(), 30.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut envelope = FadeEnvelope::new(150.0);
        assert_eq!(envelope.volume(), MAX_VOLUME);
        envelope.begin_at(-5.0);
        assert_eq!(envelope.volume(), 0.0);
    }
}
