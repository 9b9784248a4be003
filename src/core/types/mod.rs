//! Basic core types used throughout this crate at a high level.

pub mod geometry;

pub use geometry::*;

use std::fmt;

/// An X11-style window identifier, as handed to wmdecor by the window manager.
pub type WindowId = u32;

/// A representation of a color, following the RGBA model.
///
/// The color is stored as a single `u32` in `0xRRGGBBAA` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(u32);

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color(0x000000ff);
    /// Opaque white.
    pub const WHITE: Color = Color(0xffffffff);

    /// Creates an opaque Color from its red, green and blue components.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xff)
    }

    /// Creates a Color from its red, green, blue and alpha components.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from_be_bytes([r, g, b, a]))
    }

    /// Returns the (R, G, B) values of the Color
    /// as bytes.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let (r, g, b, _) = self.rgba();
        (r, g, b)
    }

    /// Returns the (R, G, B, A) values of the Color
    /// as bytes.
    pub fn rgba(&self) -> (u8, u8, u8, u8) {
        let [r, g, b, a] = u32::to_be_bytes(self.0);
        (r, g, b, a)
    }

    /// Returns the (R, G, B, A) components of the Color
    /// as proportions of max intensity (255.0).
    pub fn rgba_f32(&self) -> (f32, f32, f32, f32) {
        let (r, g, b, a) = self.rgba();

        (
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

/// Formats as `r,g,b`, the way color entries are written to configuration.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.rgb();
        write!(f, "{},{},{}", r, g, b)
    }
}
