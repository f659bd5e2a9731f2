//! Color utility functions shared across the application.
//!
//! Materials, hotspot styles and the GPU uniforms all speak [`Color`]:
//! linear RGB in `0.0..=1.0`, created from sRGB hex literals the way the
//! palette in `constants` is written.

use serde::{Deserialize, Serialize};

/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from an sRGB `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Build a color from linear components stored as an array.
    pub fn from_array(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Convert one sRGB-encoded channel to linear.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_black_and_white() {
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        let white = Color::from_hex(0xffffff);
        assert!((white.r - 1.0).abs() < 1e-6);
        assert!((white.g - 1.0).abs() < 1e-6);
        assert!((white.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_channel_order() {
        let c = Color::from_hex(0x00aaff);
        assert_eq!(c.r, 0.0);
        assert!(c.g > 0.0 && c.g < 1.0);
        assert!((c.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_srgb_curve_is_monotonic() {
        let mut last = srgb_to_linear(0.0);
        for i in 1..=20 {
            let next = srgb_to_linear(i as f32 / 20.0);
            assert!(next > last);
            last = next;
        }
        assert!((last - 1.0).abs() < 1e-6);
    }
}
