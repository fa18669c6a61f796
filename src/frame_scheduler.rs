//! Frame pacing for the render side of the supervisor loop
//!
//! Portable, without async or platform timers: the caller passes the
//! current time and sleeps until [`FrameClock::next_deadline`] itself.

use core::cmp::min;

use embassy_time::{Duration, Instant};

/// Gates rendering to a fixed frame interval
///
/// If the loop falls behind by more than two frames (a slow poll, for
/// example) the backlog is skipped instead of rendered in a burst.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_duration: Duration,
    next_frame: Instant,
    last_frame: Option<Instant>,
    stalled: bool,
}

impl FrameClock {
    /// First frame is due at `start`
    pub const fn new(frame_duration: Duration, start: Instant) -> Self {
        Self {
            frame_duration,
            next_frame: start,
            last_frame: None,
            stalled: false,
        }
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Deadline of the next frame
    pub const fn next_deadline(&self) -> Instant {
        self.next_frame
    }

    /// Mark that the loop blocked after reading the current time
    ///
    /// The wait is not animation time: the next claimed frame reports at
    /// most one frame duration.
    pub fn stall(&mut self) {
        self.stalled = true;
    }

    /// Claim a frame if one is due
    ///
    /// Returns the wall time elapsed since the previous frame (zero for the
    /// first one, at most one frame duration after a [`FrameClock::stall`]),
    /// or `None` when the next frame is not due yet.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        if now < self.next_frame {
            return None;
        }

        // Drift correction: if we've fallen too far behind, reset to now
        let max_drift = self.frame_duration * 2;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }
        self.next_frame += self.frame_duration;

        let elapsed = self
            .last_frame
            .map_or(Duration::from_millis(0), |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        if core::mem::take(&mut self.stalled) {
            return Some(min(elapsed, self.frame_duration));
        }
        Some(elapsed)
    }
}
