//! Colors for the strands and the status pixel

use smart_leds::RGB8;

pub type Rgb = RGB8;

pub const OFF: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
pub const GREEN: Rgb = Rgb { r: 0, g: 255, b: 0 };
pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
pub const YELLOW: Rgb = Rgb { r: 255, g: 255, b: 0 };
/// Default strand color, close to a plain incandescent filament
pub const WARM_WHITE: Rgb = Rgb {
    r: 255,
    g: 147,
    b: 41,
};

/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Convert an intensity in `[0, 1]` to an 8-bit level, rounding to nearest
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn intensity8(intensity: f32) -> u8 {
    (intensity.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Scale `color` by an intensity in `[0, 1]`
pub fn scale_color(color: Rgb, intensity: f32) -> Rgb {
    let level = intensity8(intensity);
    Rgb {
        r: scale8(color.r, level),
        g: scale8(color.g, level),
        b: scale8(color.b, level),
    }
}
