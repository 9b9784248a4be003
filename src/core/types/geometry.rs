//! Primitives for working with geometries.
//!
//! This module contains the core types [`Point`], [`Size`], [`Rectangle`] and
//! [`Margins`], which are used to describe decoration layouts: where the titlebar
//! sits, where each button goes, and how far the decoration extends past the
//! client on each side.
//!
//! Decoration geometry is always expressed in device pixels relative to the
//! top-left corner of the decoration, so unlike a full compositor these types
//! carry no coordinate-space marker and are plain `i32`s.

use core::ops::{Add, Sub};

/// A type for representing a point in decoration coordinates.
///
/// # Note
///
/// The (0, 0) reference is taken from the top left
/// corner of the decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// The `Point`'s X-coordinate.
    pub x: i32,
    /// The `Point`'s Y-coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a new Point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A width and a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// The width.
    pub width: i32,
    /// The height.
    pub height: i32,
}

impl Size {
    /// Creates a new Size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Creates a square Size.
    pub const fn square(side: i32) -> Self {
        Self::new(side, side)
    }

    /// Whether either dimension is zero or negative.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// The number of pixels covered by this Size, or 0 if it is empty.
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

/// A rectangle with a top-left origin and a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rectangle {
    /// The top-left corner of the Rectangle.
    pub point: Point,
    /// The size of the Rectangle.
    pub size: Size,
}

impl Rectangle {
    /// Creates a new Rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            point: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Returns a Rectangle with all values zeroed.
    pub const fn zeroed() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// The X-coordinate of the left edge.
    pub const fn x(&self) -> i32 {
        self.point.x
    }

    /// The Y-coordinate of the top edge.
    pub const fn y(&self) -> i32 {
        self.point.y
    }

    /// The width.
    pub const fn width(&self) -> i32 {
        self.size.width
    }

    /// The height.
    pub const fn height(&self) -> i32 {
        self.size.height
    }

    /// The X-coordinate one past the right edge.
    pub const fn right(&self) -> i32 {
        self.point.x + self.size.width
    }

    /// The Y-coordinate one past the bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.point.y + self.size.height
    }

    /// Whether the Rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Checks whether a given point falls within the Rectangle.
    pub const fn contains_point(&self, pt: Point) -> bool {
        pt.x >= self.x() && pt.x < self.right() && pt.y >= self.y() && pt.y < self.bottom()
    }
}

/// Distances on each of the four sides of a rectangle.
///
/// Used for decoration borders, resize-only grab areas, and shadow padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Margins {
    /// The left margin.
    pub left: i32,
    /// The top margin.
    pub top: i32,
    /// The right margin.
    pub right: i32,
    /// The bottom margin.
    pub bottom: i32,
}

impl Margins {
    /// Creates new Margins.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Creates Margins that are equal on all four sides.
    pub const fn uniform(width: i32) -> Self {
        Self::new(width, width, width, width)
    }

    /// Margins of zero on every side.
    pub const fn zeroed() -> Self {
        Self::uniform(0)
    }

    /// The sum of the left and right margins.
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }
}
