//! Drop shadows and rounded-corner masks.
//!
//! Rasterizing a shadow means building a rounded shape, blurring it, and
//! punching the original shape back out, which is far too slow to do per window
//! per frame. Instead, every distinct shape is described by a [`ShapeKey`],
//! rasterized once into a [`ShadowResource`], and shared through the
//! [`ShadowCache`] with every decoration that asks for the same key.
//!
//! Rounded-corner masks used by compositing effects get the same treatment
//! through the [`CornerTextureCache`], keyed only by radius.
//!
//! Cached resources are immutable. A change in shape produces a different key and
//! a different resource; old resources stay cached until [`ShadowCache::invalidate_all`]
//! is called, which happens whenever the DPI or the global theme changes.

use std::hash::{Hash, Hasher};

use byteorder::{BigEndian, ByteOrder};

use crate::platform::{CornerRadii, MAX_CORNER_RADIUS};
use crate::types::{Color, Margins, Rectangle};

mod cache;
pub mod raster;

#[doc(inline)]
pub use cache::{ShadowCache, CornerTextureCache};

/// The widest shadow halo a key can describe.
pub const MAX_BORDER_WIDTH: i32 = 256;

/// The structural key identifying one rasterized shadow.
///
/// All four radii are clamped to `1..=MAX_CORNER_RADIUS` on construction, so a
/// key built from `(0, 0, 0, 0)` is the same key as one built from
/// `(1, 1, 1, 1)`. The border width is clamped to `0..=MAX_BORDER_WIDTH`.
///
/// Equality is exact over every field, including `darkness`: two keys whose
/// darkness differs by any amount at all are different keys.
#[derive(Debug, Clone, Copy)]
pub struct ShapeKey {
    color: Color,
    top_left: i32,
    top_right: i32,
    bottom_left: i32,
    bottom_right: i32,
    darkness: f64,
    border_width: i32,
}

impl ShapeKey {
    /// Creates a new ShapeKey, clamping the radii and border width.
    pub fn new(color: Color, radii: CornerRadii, darkness: f64, border_width: i32) -> Self {
        let clamp = |r: i32| r.clamp(1, MAX_CORNER_RADIUS);
        Self {
            color,
            top_left: clamp(radii.top_left),
            top_right: clamp(radii.top_right),
            bottom_left: clamp(radii.bottom_left),
            bottom_right: clamp(radii.bottom_right),
            darkness,
            border_width: border_width.clamp(0, MAX_BORDER_WIDTH),
        }
    }

    /// The shadow color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The clamped corner radii.
    pub fn radii(&self) -> CornerRadii {
        CornerRadii::new(self.top_left, self.top_right, self.bottom_left, self.bottom_right)
    }

    /// The opacity multiplier applied to the shadow.
    pub fn darkness(&self) -> f64 {
        self.darkness
    }

    /// The width of the blurred halo around the shape.
    pub fn border_width(&self) -> i32 {
        self.border_width
    }
}

impl PartialEq for ShapeKey {
    fn eq(&self, other: &Self) -> bool {
        self.color == other.color
            && self.radii() == other.radii()
            && self.darkness.to_bits() == other.darkness.to_bits()
            && self.border_width == other.border_width
    }
}

impl Eq for ShapeKey {}

impl Hash for ShapeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.hash(state);
        self.radii().hash(state);
        self.darkness.to_bits().hash(state);
        self.border_width.hash(state);
    }
}

/// A buffer of premultiplied ARGB32 pixels, in row-major order.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// The width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw pixel data.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// The pixel at (x, y), or None if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None
        }
        self.data.get((y * self.width + x) as usize).copied()
    }

    /// The alpha of the pixel at (x, y), or 0 if out of bounds.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixel(x, y).map(|p| (p >> 24) as u8).unwrap_or(0)
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, argb: u32) {
        let idx = (y * self.width + x) as usize;
        self.data[idx] = argb;
    }

    /// Converts the buffer into premultiplied RGBA8 bytes, ready for
    /// texture upload.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.data.len() * 4];
        for (chunk, argb) in bytes.chunks_exact_mut(4).zip(&self.data) {
            BigEndian::write_u32(chunk, argb.rotate_left(8));
        }
        bytes
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A rasterized shadow.
///
/// `padding` is how far the shadow extends past the decoration on each side,
/// and `inner_rect` is the part of the buffer covered by the decoration
/// itself, which the compositor stretches to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowResource {
    /// The shadow pixels.
    pub buffer: PixelBuffer,
    /// Equal to the border width on every side.
    pub padding: Margins,
    /// The stretchable inner region of the buffer.
    pub inner_rect: Rectangle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_clamps_radii() {
        let zero = ShapeKey::new(Color::BLACK, CornerRadii::uniform(0), 1.0, 30);
        let one = ShapeKey::new(Color::BLACK, CornerRadii::uniform(1), 1.0, 30);

        assert_eq!(zero.radii(), CornerRadii::uniform(1));
        assert_eq!(zero, one);

        let huge = ShapeKey::new(Color::BLACK, CornerRadii::new(i32::MAX, 1, 1, 1), 1.0, i32::MAX);
        assert_eq!(huge.radii(), CornerRadii::new(MAX_CORNER_RADIUS, 1, 1, 1));
        assert_eq!(huge.border_width(), MAX_BORDER_WIDTH);
    }

    #[test]
    fn test_key_exact_darkness() {
        let a = ShapeKey::new(Color::BLACK, CornerRadii::uniform(6), 0.6, 30);
        let b = ShapeKey::new(Color::BLACK, CornerRadii::uniform(6), 0.6 + 1e-12, 30);

        assert_ne!(a, b);
    }

    #[test]
    fn test_rgba_bytes() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, 0x80102030);

        assert_eq!(buf.to_rgba_bytes(), vec![0, 0, 0, 0, 0x10, 0x20, 0x30, 0x80]);
        assert_eq!(buf.alpha(1, 0), 0x80);
        assert_eq!(buf.alpha(5, 5), 0);
    }
}
