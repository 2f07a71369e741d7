// Playback controller - Transport helpers over the playback surface

use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

pub const MIN_PLAYBACK_RATE: f64 = 0.25;
pub const MAX_PLAYBACK_RATE: f64 = 4.0;

/// User-facing transport controls layered over a [`PlaybackPort`].
#[derive(Clone)]
pub struct PlaybackController {
    port: Arc<dyn PlaybackPort>,
}

impl PlaybackController {
    pub fn new(port: Arc<dyn PlaybackPort>) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &Arc<dyn PlaybackPort> {
        &self.port
    }

    /// Current observable playback state
    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            current_time: self.port.current_time(),
            is_playing: self.port.is_playing(),
            volume: self.port.volume(),
            is_muted: self.port.muted(),
            playback_rate: self.port.playback_rate(),
        }
    }

    /// Apply everything in `state` except resuming playback. The surface is
    /// left paused.
    pub fn restore_paused(&self, state: &PlaybackState) {
        self.port.pause();
        self.port.set_volume(state.volume);
        self.port.set_muted(state.is_muted);
        self.port.set_playback_rate(state.playback_rate);
        self.port.set_current_time(state.current_time);
    }

    /// Put the surface back into `state`, resuming playback if it was running
    pub async fn restore(&self, state: &PlaybackState) -> Result<(), DomainError> {
        self.restore_paused(state);
        if state.is_playing {
            self.port.play().await?;
        }
        debug!(?state, "Playback state restored");
        Ok(())
    }

    /// Play or pause. Starting from the end of `range` (or outside it)
    /// rewinds to the range start first. Returns whether playback is running.
    pub async fn toggle_play(&self, range: Option<TrimRange>) -> Result<bool, DomainError> {
        if self.port.is_playing() {
            self.port.pause();
            return Ok(false);
        }
        if let Some(range) = range {
            let t = self.port.current_time();
            if t >= range.end || t < range.start {
                self.port.set_current_time(range.start);
            }
        }
        self.port.play().await?;
        Ok(true)
    }

    /// Set the volume, clamped to `[0, 1]`. Returns the applied value.
    pub fn set_volume(&self, volume: f64) -> f64 {
        if volume.is_finite() {
            self.port.set_volume(volume.clamp(0.0, 1.0));
        }
        self.port.volume()
    }

    pub fn toggle_mute(&self) -> bool {
        let muted = !self.port.muted();
        self.port.set_muted(muted);
        muted
    }

    /// Set the playback rate, clamped to `[0.25, 4]`. Returns the applied value.
    pub fn set_rate(&self, rate: f64) -> f64 {
        if rate.is_finite() {
            self.port
                .set_playback_rate(rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE));
        }
        self.port.playback_rate()
    }

    /// Keep the playhead inside `range`: reaching the end pauses and pins
    /// the playhead to `end`, a playhead before `start` jumps to `start`.
    /// Returns the playhead after clamping.
    pub fn clamp_to_range(&self, range: &TrimRange) -> f64 {
        let t = self.port.current_time();
        if t >= range.end {
            if self.port.is_playing() {
                debug!(end = range.end, "Reached trim end, pausing");
            }
            self.port.pause();
            self.port.set_current_time(range.end);
            return range.end;
        }
        if t < range.start {
            trace!(t, start = range.start, "Playhead before trim start");
            self.port.set_current_time(range.start);
            return range.start;
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::raw_video::generate_test_pattern;
    use crate::adapters::RawVideoPlayback;

    fn controller(seconds: f64) -> PlaybackController {
        let blob = generate_test_pattern(2, 2, 10, seconds).unwrap();
        PlaybackController::new(Arc::new(RawVideoPlayback::open(blob).unwrap()))
    }

    #[test]
    fn test_volume_and_rate_are_clamped() {
        let playback = controller(5.0);
        assert_eq!(playback.set_volume(1.7), 1.0);
        assert_eq!(playback.set_volume(-0.3), 0.0);
        assert_eq!(playback.set_volume(f64::NAN), 0.0);
        assert_eq!(playback.set_rate(10.0), MAX_PLAYBACK_RATE);
        assert_eq!(playback.set_rate(0.0), MIN_PLAYBACK_RATE);
        assert!(playback.toggle_mute());
        assert!(!playback.toggle_mute());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_toggle_play_from_end_restarts_at_range_start() {
        let playback = controller(10.0);
        let range = TrimRange::new(2.0, 6.0);
        playback.port().set_current_time(6.0);

        assert!(playback.toggle_play(Some(range)).await.unwrap());
        assert_eq!(playback.port().current_time(), 2.0);
        assert!(!playback.toggle_play(Some(range)).await.unwrap());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_clamp_to_range_pauses_at_end() {
        let playback = controller(10.0);
        let range = TrimRange::new(1.0, 3.0);
        playback.toggle_play(Some(range)).await.unwrap();
        tokio::time::advance(Duration::from_millis(2500)).await;

        assert_eq!(playback.clamp_to_range(&range), 3.0);
        assert!(!playback.port().is_playing());
        assert_eq!(playback.port().current_time(), 3.0);

        playback.port().set_current_time(0.5);
        assert_eq!(playback.clamp_to_range(&range), 1.0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn test_snapshot_restore_round_trip() {
        let playback = controller(10.0);
        playback.set_volume(0.4);
        playback.set_rate(1.5);
        playback.port().set_current_time(4.0);
        playback.toggle_play(None).await.unwrap();
        let saved = playback.snapshot();

        playback.port().pause();
        playback.set_volume(1.0);
        playback.set_rate(1.0);
        playback.toggle_mute();
        playback.port().set_current_time(9.0);

        playback.restore(&saved).await.unwrap();
        let now = playback.snapshot();
        assert_eq!(now.volume, 0.4);
        assert_eq!(now.playback_rate, 1.5);
        assert!(!now.is_muted);
        assert!(now.is_playing);
        assert_eq!(now.current_time, 4.0);
    }
}
