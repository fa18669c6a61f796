//! Phase animation for the strands
//!
//! The engine is a small state machine driven by confirmed channel
//! statuses and by elapsed time. It owns the animation clock and renders
//! one frame per call; it performs no I/O and cannot fail.

mod curve;

use core::fmt;

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

pub use curve::{ease_in_out, progress, pulse, ramp_down, ramp_up};

use crate::color::{OFF, Rgb, scale_color};
use crate::status::ChannelStatus;

const DEFAULT_RAMP_UP_MS: u64 = 20_000;
const DEFAULT_RAMP_DOWN_MS: u64 = 3_000;
const DEFAULT_PULSE_PERIOD_MS: u64 = 8_000;
const DEFAULT_PULSE_FLOOR: f32 = 0.6;

/// Animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPhase {
    /// Channel offline, strands dark
    #[default]
    Idle,
    /// Channel went live, strands brightening
    RampUp,
    /// Channel live, slow breathing
    SteadyPulse,
    /// Channel went offline, strands fading out
    RampDown,
}

impl AnimationPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RampUp => "ramp-up",
            Self::SteadyPulse => "pulse",
            Self::RampDown => "ramp-down",
        }
    }
}

impl fmt::Display for AnimationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing of the animation phases
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTimings {
    /// Duration of the ramp-up phase
    pub ramp_up: Duration,
    /// Duration of the ramp-down phase
    pub ramp_down: Duration,
    /// Period of one breath while live
    pub pulse_period: Duration,
    /// Lowest intensity of the breathing pulse, in `(0, 1)`
    pub pulse_floor: f32,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            ramp_up: Duration::from_millis(DEFAULT_RAMP_UP_MS),
            ramp_down: Duration::from_millis(DEFAULT_RAMP_DOWN_MS),
            pulse_period: Duration::from_millis(DEFAULT_PULSE_PERIOD_MS),
            pulse_floor: DEFAULT_PULSE_FLOOR,
        }
    }
}

/// Snapshot taken when a phase is entered
///
/// `start_intensity` is the intensity rendered at the moment of the
/// transition, so interrupted ramps reverse without a jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEntry {
    pub phase: AnimationPhase,
    pub start_intensity: f32,
}

impl PhaseEntry {
    const IDLE: Self = Self {
        phase: AnimationPhase::Idle,
        start_intensity: 0.0,
    };
}

/// Status-driven animation state machine
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    timings: AnimationTimings,
    color: Rgb,
    entry: PhaseEntry,
    /// Time elapsed since `entry` was taken
    clock: Duration,
}

impl AnimationEngine {
    /// Create an engine in the `Idle` phase
    pub const fn new(timings: AnimationTimings, color: Rgb) -> Self {
        Self {
            timings,
            color,
            entry: PhaseEntry::IDLE,
            clock: Duration::from_millis(0),
        }
    }

    pub const fn phase(&self) -> AnimationPhase {
        self.entry.phase
    }

    /// Time spent in the current phase
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    pub const fn entry(&self) -> PhaseEntry {
        self.entry
    }

    pub const fn timings(&self) -> &AnimationTimings {
        &self.timings
    }

    /// Feed the latest poll result
    ///
    /// `Unknown` never changes the phase. Returns the new phase when a
    /// transition fired.
    pub fn observe(&mut self, status: ChannelStatus) -> Option<AnimationPhase> {
        use AnimationPhase::{Idle, RampDown, RampUp, SteadyPulse};

        let next = match (self.entry.phase, status) {
            (_, ChannelStatus::Unknown) => return None,
            (Idle | RampDown, ChannelStatus::Live) => RampUp,
            (RampUp | SteadyPulse, ChannelStatus::Offline) => RampDown,
            (RampUp | SteadyPulse, ChannelStatus::Live)
            | (Idle | RampDown, ChannelStatus::Offline) => return None,
        };
        self.enter(next);
        Some(next)
    }

    /// Advance the animation clock
    ///
    /// Completes a ramp once its duration has elapsed. Returns the new phase
    /// when a transition fired.
    pub fn advance(&mut self, elapsed: Duration) -> Option<AnimationPhase> {
        self.clock += elapsed;

        let (limit, next) = match self.entry.phase {
            AnimationPhase::RampUp => (self.timings.ramp_up, AnimationPhase::SteadyPulse),
            AnimationPhase::RampDown => (self.timings.ramp_down, AnimationPhase::Idle),
            AnimationPhase::Idle | AnimationPhase::SteadyPulse => return None,
        };
        if self.clock < limit {
            return None;
        }
        self.enter(next);
        Some(next)
    }

    /// Intensity at the current clock
    pub fn intensity(&self) -> f32 {
        self.intensity_at(self.clock)
    }

    /// Intensity the current phase would render at `clock`
    pub fn intensity_at(&self, clock: Duration) -> f32 {
        let start = self.entry.start_intensity;
        match self.entry.phase {
            AnimationPhase::Idle => 0.0,
            AnimationPhase::RampUp => ramp_up(start, clock, self.timings.ramp_up),
            AnimationPhase::SteadyPulse => {
                pulse(clock, self.timings.pulse_period, self.timings.pulse_floor)
            }
            AnimationPhase::RampDown => ramp_down(start, clock, self.timings.ramp_down),
        }
    }

    /// Render the current frame into `leds`
    pub fn render(&self, leds: &mut [Rgb]) {
        let pixel = match self.entry.phase {
            AnimationPhase::Idle => OFF,
            _ => scale_color(self.color, self.intensity()),
        };
        leds.fill(pixel);
    }

    fn enter(&mut self, phase: AnimationPhase) {
        let start_intensity = self.intensity();
        #[cfg(feature = "esp32-log")]
        println!(
            "[AnimationEngine.enter] {} -> {} at {}ms (intensity {})",
            self.entry.phase,
            phase,
            self.clock.as_millis(),
            start_intensity
        );
        self.entry = PhaseEntry {
            phase,
            start_intensity,
        };
        self.clock = Duration::from_millis(0);
    }
}
