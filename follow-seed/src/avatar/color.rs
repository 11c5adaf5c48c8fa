//! Background colour derivation.
//!
//! Hues advance by the golden angle so neighbouring indices never land on
//! similar colours; lightness and saturation are fixed.

/// Hue step between consecutive avatars, in degrees
pub const GOLDEN_ANGLE_DEGREES: f64 = 137.5;

pub const BACKGROUND_LIGHTNESS: f64 = 0.65;
pub const BACKGROUND_SATURATION: f64 = 0.7;

/// Background hue for `index`, in `[0, 360)`
pub fn hue_degrees(index: u32) -> f64 {
    (f64::from(index) * GOLDEN_ANGLE_DEGREES) % 360.0
}

/// Background fill for `index` as an RGB triple
pub fn background_rgb(index: u32) -> [u8; 3] {
    let (r, g, b) = hls_to_rgb(
        hue_degrees(index) / 360.0,
        BACKGROUND_LIGHTNESS,
        BACKGROUND_SATURATION,
    );
    [to_channel(r), to_channel(g), to_channel(b)]
}

/// HLS to RGB with every component in `[0, 1]`
pub fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - (l * s) };
    let m1 = 2.0 * l - m2;
    (
        hue_component(m1, m2, h + 1.0 / 3.0),
        hue_component(m1, m2, h),
        hue_component(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_component(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

// Truncates like an integer cast of `c * 255`
fn to_channel(c: f64) -> u8 {
    (c * 255.0).clamp(0.0, 255.0) as u8
}
