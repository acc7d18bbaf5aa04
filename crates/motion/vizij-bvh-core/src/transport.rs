//! Playback transport: wall-clock driven frame selection.

use std::cell::Cell;

use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::config::BvhConfig;

/// Source of the current time in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Monotonic clock, seconds since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Playback state of a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Frame index bookkeeping for a clip of `num_frames` frames.
///
/// While playing, the frame is derived from the time elapsed since the last
/// anchor: `start_frame + floor((now - start_time) * frame_rate * rate)`,
/// then wrapped (looping) or clamped to the clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    state: PlaybackState,
    looping: bool,
    rate: f64,
    start_time: f64,
    start_frame: usize,
    frame: usize,
    frame_new: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self::from_config(&BvhConfig::default())
    }
}

impl Transport {
    pub fn from_config(config: &BvhConfig) -> Self {
        Self {
            state: PlaybackState::Stopped,
            looping: config.looping,
            rate: config.play_rate,
            start_time: 0.0,
            start_frame: 0,
            frame: 0,
            frame_new: false,
        }
    }

    /// Start playing from the current frame
    pub fn play(&mut self, now: f64) {
        self.state = PlaybackState::Playing;
        self.start_frame = self.frame;
        self.start_time = now;
    }

    /// Stop, remembering the current frame for the next [`play`](Self::play)
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.start_frame = self.frame;
    }

    pub fn toggle(&mut self, now: f64) {
        if self.state.is_playing() {
            self.stop();
        } else {
            self.play(now);
        }
    }

    /// Change the rate without moving the current frame
    pub fn set_rate(&mut self, rate: f64, now: f64) {
        self.rate = rate;
        self.start_frame = self.frame;
        self.start_time = now;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Advance the clock-derived frame; returns the current frame
    pub fn tick(&mut self, now: f64, frame_rate: f64, num_frames: usize) -> usize {
        let previous = self.frame;
        if self.state.is_playing() && num_frames > 0 {
            let progress = ((now - self.start_time) * frame_rate * self.rate).floor();
            // Saturating float-to-int conversion keeps absurd rates finite.
            let frame = (self.start_frame as i64).saturating_add(progress as i64);
            self.frame = self.fit(frame, num_frames);
        }
        self.frame_new = self.frame != previous;
        self.frame
    }

    /// Jump to `frame` (wrapped or clamped) and re-anchor at `now`
    pub fn set_frame(&mut self, frame: i64, now: f64, num_frames: usize) {
        let frame = self.fit(frame, num_frames);
        self.frame = frame;
        self.start_frame = frame;
        self.start_time = now;
    }

    /// Stopped at frame 0
    pub fn rewind(&mut self) {
        self.frame = 0;
        self.stop();
    }

    fn fit(&self, frame: i64, num_frames: usize) -> usize {
        if num_frames == 0 {
            return 0;
        }
        let last = num_frames as i64 - 1;
        let fitted = if self.looping {
            frame.rem_euclid(num_frames as i64)
        } else {
            frame.clamp(0, last)
        };
        fitted as usize
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Frame the current playback run started from
    #[inline]
    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    /// Whether the last [`tick`](Self::tick) landed on a different frame
    #[inline]
    pub fn is_frame_new(&self) -> bool {
        self.frame_new
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(looping: bool, rate: f64) -> Transport {
        Transport::from_config(
            &BvhConfig::default()
                .with_looping(looping)
                .with_play_rate(rate),
        )
    }

    #[test]
    fn loops_and_clamps_elapsed_time() {
        let mut looped = transport(true, 2.0);
        looped.play(0.0);
        assert_eq!(looped.tick(0.55, 10.0, 10), 1);

        let mut clamped = transport(false, 2.0);
        clamped.play(0.0);
        assert_eq!(clamped.tick(0.55, 10.0, 10), 9);
    }

    #[test]
    fn stopped_transport_holds_its_frame() {
        let mut t = transport(true, 1.0);
        t.set_frame(4, 0.0, 10);
        assert_eq!(t.tick(100.0, 10.0, 10), 4);
        assert!(!t.is_frame_new());
    }

    #[test]
    fn frame_new_marks_changes_between_ticks() {
        let mut t = transport(true, 1.0);
        t.play(0.0);
        t.tick(0.05, 10.0, 10);
        assert!(!t.is_frame_new());
        t.tick(0.15, 10.0, 10);
        assert!(t.is_frame_new());
        t.tick(0.16, 10.0, 10);
        assert!(!t.is_frame_new());
    }

    #[test]
    fn stop_then_play_resumes() {
        let mut t = transport(true, 1.0);
        t.play(0.0);
        t.tick(0.35, 10.0, 10);
        t.stop();
        assert_eq!(t.start_frame(), 3);

        t.play(10.0);
        assert_eq!(t.tick(10.25, 10.0, 10), 5);
    }

    #[test]
    fn play_while_playing_keeps_the_frame() {
        let mut t = transport(true, 1.0);
        t.play(0.0);
        assert_eq!(t.tick(0.5, 10.0, 100), 5);
        t.play(0.5);
        assert_eq!(t.start_frame(), 5);
        assert_eq!(t.tick(0.5, 10.0, 100), 5);
        assert!(!t.is_frame_new());
        assert_eq!(t.tick(0.75, 10.0, 100), 7);
    }

    #[test]
    fn rate_change_is_not_retroactive() {
        let mut t = transport(true, 1.0);
        t.play(0.0);
        assert_eq!(t.tick(0.5, 10.0, 100), 5);
        t.set_rate(4.0, 0.5);
        assert_eq!(t.tick(0.5, 10.0, 100), 5);
        assert_eq!(t.tick(0.75, 10.0, 100), 15);
    }

    #[test]
    fn negative_rate_wraps_backwards() {
        let mut t = transport(true, -1.0);
        t.play(0.0);
        assert_eq!(t.tick(0.25, 10.0, 10), 7);

        let mut t = transport(false, -1.0);
        t.play(0.0);
        assert_eq!(t.tick(0.25, 10.0, 10), 0);
    }

    #[test]
    fn set_frame_applies_policy_and_keeps_state() {
        let mut t = transport(true, 1.0);
        t.set_frame(13, 0.0, 10);
        assert_eq!(t.frame(), 3);
        assert!(!t.is_playing());

        t.set_looping(false);
        t.play(0.0);
        t.set_frame(13, 1.0, 10);
        assert_eq!(t.frame(), 9);
        assert!(t.is_playing());
        assert_eq!(t.tick(1.0, 10.0, 10), 9);
    }

    #[test]
    fn toggle_and_rewind() {
        let mut t = transport(true, 1.0);
        t.toggle(0.0);
        assert_eq!(t.state(), PlaybackState::Playing);
        assert_eq!(t.state().name(), "playing");
        t.tick(0.42, 10.0, 10);
        t.toggle(1.0);
        assert!(!t.is_playing());

        t.rewind();
        assert_eq!(t.frame(), 0);
        assert_eq!(t.start_frame(), 0);
        assert!(!t.is_playing());
    }

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::new(1.5);
        clock.advance(0.25);
        assert_eq!(clock.now(), 1.75);
        clock.set(0.0);
        assert_eq!((&clock).now(), 0.0);
    }
}
