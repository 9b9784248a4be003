//! Shadow and corner mask rasterization.
//!
//! These are pure functions of their keys: the caches in this module's parent
//! rely on that to share results between windows.

use crate::platform::MAX_CORNER_RADIUS;
use crate::types::{Color, Margins, Rectangle};

use super::{PixelBuffer, ShadowResource, ShapeKey, MAX_BORDER_WIDTH};

/// The width of the stretchable region in the middle of every shadow.
pub const INNER_CONTENT_WIDTH: i32 = 100;

/// Shadows are never laid out around a corner smaller than this.
pub const MIN_SHADOW_RADIUS: i32 = 12;

/// Samples per axis per pixel when computing shape coverage.
const SUPERSAMPLE: i32 = 4;

/// Box blur passes approximating a Gaussian.
const BLUR_PASSES: usize = 3;

/// Rasterizes the shadow described by `key`.
///
/// The shape is a square of side `2 * m + INNER_CONTENT_WIDTH`, where `m` is
/// the largest corner radius (but at least [`MIN_SHADOW_RADIUS`]), with each
/// corner rounded by its own radius. It is filled, blurred over the border
/// width, then cleared out again so that only the halo outside the shape
/// remains. Finally, the alpha of every pixel is scaled by the darkness.
pub fn rasterize_shadow(key: &ShapeKey) -> ShadowResource {
    let bw = key.border_width().clamp(0, MAX_BORDER_WIDTH);
    let radii = key.radii();
    let m = radii.max().clamp(MIN_SHADOW_RADIUS, MAX_CORNER_RADIUS);
    let side = m.saturating_mul(2).saturating_add(INNER_CONTENT_WIDTH);
    let size = side.saturating_add(bw.saturating_mul(2)) as usize;

    let shape = RoundedSquare {
        origin: bw as f32,
        side: side as f32,
        tl: radii.top_left as f32,
        tr: radii.top_right as f32,
        bl: radii.bottom_left as f32,
        br: radii.bottom_right as f32,
    };

    let coverage = coverage_mask(size, |x, y| shape.contains(x, y));

    let mut alpha = coverage.clone();
    let blur_radius = (bw / BLUR_PASSES as i32).max(1) as usize;
    if bw > 0 {
        box_blur(&mut alpha, size, size, blur_radius);
    }

    let darkness = key.darkness().max(0.0) as f32;
    for (a, cov) in alpha.iter_mut().zip(&coverage) {
        *a = (*a * (1.0 - cov) * darkness).clamp(0.0, 1.0);
    }

    trace!("rasterized {}x{} shadow for {:?}", size, size, key);

    ShadowResource {
        buffer: compose(&alpha, size, key.color()),
        padding: Margins::uniform(bw),
        inner_rect: Rectangle::new(bw + m, bw + m, INNER_CONTENT_WIDTH, INNER_CONTENT_WIDTH),
    }
}

/// Rasterizes a `radius`-sized quarter disc in white, with the round
/// edge towards the top left.
pub fn rasterize_corner(radius: i32) -> PixelBuffer {
    let r = radius.max(1) as f32;
    let size = radius.max(1) as usize;

    let coverage = coverage_mask(size, |x, y| {
        let (dx, dy) = (x - r, y - r);
        // only the corner is rounded, the rest of the square is solid
        x >= r || y >= r || dx * dx + dy * dy <= r * r
    });

    compose(&coverage, size, Color::WHITE)
}

struct RoundedSquare {
    origin: f32,
    side: f32,
    tl: f32,
    tr: f32,
    bl: f32,
    br: f32,
}

impl RoundedSquare {
    fn contains(&self, x: f32, y: f32) -> bool {
        let (x, y) = (x - self.origin, y - self.origin);
        let s = self.side;
        if x < 0.0 || y < 0.0 || x >= s || y >= s {
            return false
        }

        // (corner center x, corner center y, radius, whether the point lies in the corner box)
        let corners = [
            (self.tl, self.tl, self.tl, x < self.tl && y < self.tl),
            (s - self.tr, self.tr, self.tr, x > s - self.tr && y < self.tr),
            (self.bl, s - self.bl, self.bl, x < self.bl && y > s - self.bl),
            (s - self.br, s - self.br, self.br, x > s - self.br && y > s - self.br),
        ];

        corners.iter().all(|&(cx, cy, r, in_box)| {
            !in_box || (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r
        })
    }
}

/// Computes per-pixel coverage of a square `size` buffer by supersampling `inside`.
fn coverage_mask<F: Fn(f32, f32) -> bool>(size: usize, inside: F) -> Vec<f32> {
    let step = 1.0 / SUPERSAMPLE as f32;
    let total = (SUPERSAMPLE * SUPERSAMPLE) as f32;
    let mut mask = vec![0.0; size * size];

    for (idx, cov) in mask.iter_mut().enumerate() {
        let (px, py) = ((idx % size) as f32, (idx / size) as f32);
        let mut hits = 0;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let x = px + (sx as f32 + 0.5) * step;
                let y = py + (sy as f32 + 0.5) * step;
                if inside(x, y) {
                    hits += 1;
                }
            }
        }
        *cov = hits as f32 / total;
    }

    mask
}

/// Separable box blur, repeated to approximate a Gaussian.
///
/// Pixels outside the buffer count as transparent.
fn box_blur(mask: &mut [f32], width: usize, height: usize, radius: usize) {
    let mut prefix = Vec::with_capacity(width.max(height) + 1);
    let mut column = vec![0.0; height];

    for _ in 0..BLUR_PASSES {
        for row in mask.chunks_exact_mut(width) {
            blur_line(row, &mut prefix, radius);
        }
        for x in 0..width {
            for (y, v) in column.iter_mut().enumerate() {
                *v = mask[y * width + x];
            }
            blur_line(&mut column, &mut prefix, radius);
            for (y, v) in column.iter().enumerate() {
                mask[y * width + x] = *v;
            }
        }
    }
}

fn blur_line(line: &mut [f32], prefix: &mut Vec<f32>, radius: usize) {
    prefix.clear();
    prefix.push(0.0);
    let mut acc = 0.0;
    for v in line.iter() {
        acc += *v;
        prefix.push(acc);
    }

    let len = line.len();
    let kernel = (2 * radius + 1) as f32;
    for (i, out) in line.iter_mut().enumerate() {
        let hi = (i + radius + 1).min(len);
        let lo = i.saturating_sub(radius);
        *out = (prefix[hi] - prefix[lo]) / kernel;
    }
}

/// Turns an alpha mask into premultiplied ARGB32 pixels of `color`.
fn compose(alpha: &[f32], size: usize, color: Color) -> PixelBuffer {
    let (r, g, b, a) = color.rgba_f32();
    let mut buffer = PixelBuffer::new(size as u32, size as u32);

    for (idx, cov) in alpha.iter().enumerate() {
        let pa = cov * a;
        if pa <= 0.0 {
            continue
        }
        let channel = |c: f32| (c * pa * 255.0).round() as u32;
        let argb = channel(1.0) << 24 | channel(r) << 16 | channel(g) << 8 | channel(b);
        buffer.set((idx % size) as u32, (idx / size) as u32, argb);
    }

    buffer
}
