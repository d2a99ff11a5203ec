//! Geometry value types: Offset, Size, Region, Spacing.
//!
//! Everything here is `Copy`, compared and hashed by value, and free of
//! side effects. Regions use half-open edges: a region covers columns
//! `x..x + width` and rows `y..y + height`.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A displacement in cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `true` when both components are zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Width and height in cells. A zero size is a collapsed widget.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0, height: 0 };

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn area(self) -> i32 {
        self.width * self.height
    }

    /// `true` if either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Replace negative dimensions with zero.
    #[inline]
    pub const fn clamp_non_negative(self) -> Size {
        Size {
            width: if self.width < 0 { 0 } else { self.width },
            height: if self.height < 0 { 0 } else { self.height },
        }
    }

    /// A region of this size anchored at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

impl Add<Spacing> for Size {
    type Output = Size;

    /// Grow a size by the total thickness of a spacing.
    fn add(self, rhs: Spacing) -> Size {
        Size::new(self.width + rhs.width(), self.height + rhs.height())
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle in screen or container-local coordinates.
///
/// A region with a zero or negative dimension is empty. Empty regions never
/// overlap anything and are dropped by the compositor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a region from a position and a size.
    #[inline]
    pub const fn from_parts(origin: Offset, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    #[inline]
    pub const fn area(self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.width * self.height
        }
    }

    /// `true` if the region covers no cells (including inverted regions).
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// `true` if every cell of `other` lies inside `self`. An empty region
    /// is contained everywhere.
    #[inline]
    pub const fn contains_region(self, other: Region) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// `true` if the two regions share at least one cell.
    #[inline]
    pub const fn overlaps(self, other: Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The cells common to both regions, or [`Region::EMPTY`].
    pub fn intersection(self, other: Region) -> Region {
        if !self.overlaps(other) {
            return Region::EMPTY;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Region::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        )
    }

    /// The smallest region covering both. Empty operands are ignored.
    pub fn union(self, other: Region) -> Region {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    #[inline]
    pub const fn translate(self, by: Offset) -> Region {
        Region { x: self.x + by.x, y: self.y + by.y, width: self.width, height: self.height }
    }

    /// Expand outward by a spacing (used for margin boxes).
    #[inline]
    pub const fn grow(self, by: Spacing) -> Region {
        Region {
            x: self.x - by.left,
            y: self.y - by.top,
            width: self.width + by.width(),
            height: self.height + by.height(),
        }
    }

    /// Contract inward by a spacing. Dimensions never go below zero.
    #[inline]
    pub const fn shrink(self, by: Spacing) -> Region {
        let width = self.width - by.width();
        let height = self.height - by.height();
        Region {
            x: self.x + by.left,
            y: self.y + by.top,
            width: if width > 0 { width } else { 0 },
            height: if height > 0 { height } else { 0 },
        }
    }

    /// Cut the region at a point relative to its origin, returning the four
    /// quadrants `[top_left, top_right, bottom_left, bottom_right]`.
    ///
    /// The cut is clamped into `0..=width` / `0..=height`, so some quadrants
    /// may be empty. The quadrants never overlap and always cover `self`.
    pub fn split(self, cut_x: i32, cut_y: i32) -> [Region; 4] {
        let width = self.width.max(0);
        let height = self.height.max(0);
        let cx = cut_x.clamp(0, width);
        let cy = cut_y.clamp(0, height);
        [
            Region::new(self.x, self.y, cx, cy),
            Region::new(self.x + cx, self.y, width - cx, cy),
            Region::new(self.x, self.y + cy, cx, height - cy),
            Region::new(self.x + cx, self.y + cy, width - cx, height - cy),
        ]
    }

    /// The parts of `self` not covered by `occluder`, as non-overlapping
    /// fragments.
    ///
    /// Performed as two 4-way splits: one at the top-left corner of the
    /// overlap, then one at its far corner inside the bottom-right quadrant.
    /// Empty quadrants are discarded, so an edge overlap yields fewer pieces
    /// than a centred one (at most 6).
    pub fn subtract(self, occluder: Region) -> Vec<Region> {
        let overlap = self.intersection(occluder);
        if overlap.is_empty() {
            return if self.is_empty() { Vec::new() } else { vec![self] };
        }
        let [top_left, top_right, bottom_left, rest] =
            self.split(overlap.x - self.x, overlap.y - self.y);
        let [_covered, rest_right, rest_below, rest_corner] =
            rest.split(overlap.width, overlap.height);
        [top_left, top_right, bottom_left, rest_right, rest_below, rest_corner]
            .into_iter()
            .filter(|fragment| !fragment.is_empty())
            .collect()
    }

    /// Split into a left part `offset` cells wide and the remainder.
    pub fn split_vertical(self, offset: i32) -> (Region, Region) {
        let [left, right, _, _] = self.split(offset, self.height);
        (left, right)
    }

    /// Split into a top part `offset` rows tall and the remainder.
    pub fn split_horizontal(self, offset: i32) -> (Region, Region) {
        let [top, _, bottom, _] = self.split(self.width, offset);
        (top, bottom)
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Per-edge thickness for margins, padding, and borders.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub const fn all(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Vertical edges get `vertical`, horizontal edges get `horizontal`.
    #[inline]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Combined left + right thickness.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// Combined top + bottom thickness.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }

    /// Per-edge maximum. Used to collapse adjacent margins.
    pub fn grow_maximum(self, other: Spacing) -> Spacing {
        Spacing::new(
            self.top.max(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
            self.left.max(other.left),
        )
    }

    /// Replace negative edges with zero.
    pub fn clamp_non_negative(self) -> Spacing {
        Spacing::new(self.top.max(0), self.right.max(0), self.bottom.max(0), self.left.max(0))
    }
}

impl Add for Spacing {
    type Output = Spacing;

    fn add(self, rhs: Spacing) -> Spacing {
        Spacing::new(
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
            self.left + rhs.left,
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================
