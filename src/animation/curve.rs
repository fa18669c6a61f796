//! Intensity curves for the ramp and pulse phases
//!
//! All curves work on `f32` intensities in `[0, 1]`. Ramps use a cubic
//! smoothstep so the strands accelerate out of the dark and settle into
//! the pulse without a visible kink.

use core::f32::consts::TAU;

use embassy_time::Duration;

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero duration counts as already complete.
#[allow(clippy::cast_precision_loss)]
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    let total = duration.as_micros();
    if total == 0 || elapsed.as_micros() >= total {
        return 1.0;
    }
    elapsed.as_micros() as f32 / total as f32
}

/// Cubic smoothstep, `3t² - 2t³`
///
/// Monotonic on `[0, 1]` with `ease(0) == 0` and `ease(1) == 1` exactly.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rising ramp from `start` to full intensity.
pub fn ramp_up(start: f32, elapsed: Duration, duration: Duration) -> f32 {
    let p = progress(elapsed, duration);
    if p >= 1.0 {
        return 1.0;
    }
    // `start + span * e` stays monotonic under float rounding
    let span = 1.0 - start;
    (start + span * ease_in_out(p)).min(1.0)
}

/// Falling ramp from `start` to dark.
pub fn ramp_down(start: f32, elapsed: Duration, duration: Duration) -> f32 {
    let p = progress(elapsed, duration);
    if p >= 1.0 {
        return 0.0;
    }
    (start * (1.0 - ease_in_out(p))).max(0.0)
}

/// Breathing pulse between `floor` and 1.0
///
/// Starts at full intensity at `elapsed == 0`, dips to `floor` halfway
/// through the period.
#[allow(clippy::cast_precision_loss)]
pub fn pulse(elapsed: Duration, period: Duration, floor: f32) -> f32 {
    let period_us = period.as_micros().max(1);
    let phase = (elapsed.as_micros() % period_us) as f32 / period_us as f32;
    let mid = (1.0 + floor) * 0.5;
    let amplitude = (1.0 - floor) * 0.5;
    (mid + amplitude * libm::cosf(TAU * phase)).clamp(floor, 1.0)
}
