//! Per-container scroll position.
//!
//! The offset is clamped to `[0, virtual_size - viewport_size]` on each axis
//! and re-clamped whenever either size changes, so a reflow that shrinks the
//! content never leaves the container scrolled past its end.

use crate::geometry::{Offset, Region, Size};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrollState {
    offset: Offset,
    /// Size of everything the container arranged.
    virtual_size: Size,
    /// Size of the container's content box.
    viewport_size: Size,
}

impl ScrollState {
    pub fn new(virtual_size: Size, viewport_size: Size) -> Self {
        Self { offset: Offset::ZERO, virtual_size, viewport_size }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn virtual_size(&self) -> Size {
        self.virtual_size
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Each component is `max(0, virtual - viewport)`.
    pub fn max_scroll(&self) -> Offset {
        Offset::new(
            (self.virtual_size.width - self.viewport_size.width).max(0),
            (self.virtual_size.height - self.viewport_size.height).max(0),
        )
    }

    /// Scroll to an absolute position. Returns `true` if the offset moved.
    pub fn scroll_to(&mut self, x: i32, y: i32) -> bool {
        let max = self.max_scroll();
        let offset = Offset::new(x.clamp(0, max.x), y.clamp(0, max.y));
        let moved = offset != self.offset;
        self.offset = offset;
        moved
    }

    pub fn scroll_by(&mut self, dx: i32, dy: i32) -> bool {
        self.scroll_to(self.offset.x + dx, self.offset.y + dy)
    }

    /// Record new sizes after a reflow and re-clamp the offset.
    pub fn set_sizes(&mut self, virtual_size: Size, viewport_size: Size) -> bool {
        self.virtual_size = virtual_size;
        self.viewport_size = viewport_size;
        self.scroll_to(self.offset.x, self.offset.y)
    }

    pub fn is_scrollable_x(&self) -> bool {
        self.virtual_size.width > self.viewport_size.width
    }

    pub fn is_scrollable_y(&self) -> bool {
        self.virtual_size.height > self.viewport_size.height
    }

    /// The part of the virtual canvas currently in view.
    pub fn visible_region(&self) -> Region {
        Region::from_parts(self.offset, self.viewport_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ScrollState {
        ScrollState::new(Size::new(100, 200), Size::new(40, 30))
    }

    #[test]
    fn starts_at_origin() {
        let state = state();
        assert_eq!(state.offset(), Offset::ZERO);
        assert_eq!(state.max_scroll(), Offset::new(60, 170));
        assert!(state.is_scrollable_x() && state.is_scrollable_y());
    }

    #[test]
    fn content_smaller_than_viewport() {
        let mut state = ScrollState::new(Size::new(10, 10), Size::new(40, 30));
        assert_eq!(state.max_scroll(), Offset::ZERO);
        assert!(!state.scroll_to(5, 5));
        assert!(!state.is_scrollable_y());
    }

    #[test]
    fn scroll_to_clamps() {
        let mut state = state();
        assert!(state.scroll_to(20, 50));
        assert_eq!(state.offset(), Offset::new(20, 50));
        state.scroll_to(999, -5);
        assert_eq!(state.offset(), Offset::new(60, 0));
    }

    #[test]
    fn scroll_by_is_relative() {
        let mut state = state();
        state.scroll_to(30, 50);
        state.scroll_by(-10, -20);
        assert_eq!(state.offset(), Offset::new(20, 30));
        assert!(!state.scroll_by(0, 0));
    }

    #[test]
    fn shrinking_content_reclamps() {
        let mut state = state();
        state.scroll_to(60, 170);
        assert!(state.set_sizes(Size::new(50, 40), Size::new(40, 30)));
        assert_eq!(state.offset(), Offset::new(10, 10));
    }

    #[test]
    fn visible_region_follows_offset() {
        let mut state = state();
        state.scroll_to(5, 7);
        assert_eq!(state.visible_region(), Region::new(5, 7, 40, 30));
    }
}
