//! Colors and the distance used to match them.

use core::fmt::Debug;
use std::hash::{Hash, Hasher};

use image::Rgba;

/// An RGB color with each channel normalised to `[0, 1]`.
///
/// Channels are clamped on construction and NaN becomes `0.0`, so two colors
/// compare equal exactly when their channel bit patterns do. That makes
/// `Color` usable as a map key.
#[derive(Clone, Copy, PartialEq)]
pub struct Color {
    red: f32,
    green: f32,
    blue: f32,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color {
        red: 0.0,
        green: 0.0,
        blue: 0.0,
    };

    /// A color from normalised channels, clamped into `[0, 1]`.
    pub fn new(red: f32, green: f32, blue: f32) -> Color {
        Self {
            red: normalise(red),
            green: normalise(green),
            blue: normalise(blue),
        }
    }

    /// Build a color from 8-bit channel values.
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Color {
        Self::new(
            red as f32 / 255.0,
            green as f32 / 255.0,
            blue as f32 / 255.0,
        )
    }

    /// Color of a pixel, ignoring alpha.
    pub fn from_pixel(pixel: &Rgba<u8>) -> Color {
        let [r, g, b, _] = pixel.0;
        Self::from_rgb8(r, g, b)
    }

    /// Red channel.
    pub fn red(&self) -> f32 {
        self.red
    }

    /// Green channel.
    pub fn green(&self) -> f32 {
        self.green
    }

    /// Blue channel.
    pub fn blue(&self) -> f32 {
        self.blue
    }

    /// The color as 8-bit channels, rounded to nearest.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [
            (self.red * 255.0).round() as u8,
            (self.green * 255.0).round() as u8,
            (self.blue * 255.0).round() as u8,
        ]
    }

    /// Sum of the absolute channel differences (L1 distance in RGB).
    ///
    /// Always in `[0, 3]`.
    pub fn distance(&self, other: &Color) -> f32 {
        num::abs(self.red - other.red)
            + num::abs(self.green - other.green)
            + num::abs(self.blue - other.blue)
    }
}

/// Dissimilarity between two colors, see [`Color::distance`].
pub fn distance(a: &Color, b: &Color) -> f32 {
    a.distance(b)
}

fn normalise(channel: f32) -> f32 {
    if channel.is_nan() {
        0.0
    } else {
        // Adding zero turns -0.0 into 0.0 so equal colors hash equally
        channel.clamp(0.0, 1.0) + 0.0
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.red.to_bits().hash(state);
        self.green.to_bits().hash(state);
        self.blue.to_bits().hash(state);
    }
}

impl Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3},{:.3},{:.3})", self.red, self.green, self.blue)
    }
}
