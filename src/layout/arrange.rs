//! One container's arrangement: where each direct child goes.
//!
//! [`arrange`] runs the steps in a fixed order:
//!
//! 1. docked children, in document order, each carving its edge off the
//!    remaining area;
//! 2. the flow children (neither docked nor absolute) through the
//!    container's layout mode in what is left;
//! 3. alignment of the flow group inside that area, then `offset` shifts
//!    for relatively positioned children;
//! 4. absolutely positioned children at their offset from the content
//!    origin.
//!
//! All regions are relative to the container's content box.

use std::collections::HashMap;

use tracing::debug;

use crate::css::scalar::Scalar;
use crate::css::styles::{AlignHorizontal, AlignVertical, Dock, LayoutMode, Position, ResolvedStyle};
use crate::dom::NodeId;
use crate::geometry::{Offset, Region, Size, Spacing};

use super::box_model::{arrange_box, Axis};
use super::grid::arrange_grid;

// ---------------------------------------------------------------------------
// Arrangement
// ---------------------------------------------------------------------------

/// Where one child sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub node: NodeId,
    /// Border box, relative to the container's content origin.
    pub region: Region,
    pub margin: Spacing,
    /// Docked children stay put when the container scrolls.
    pub fixed: bool,
}

impl Placement {
    pub fn new(node: NodeId, region: Region, margin: Spacing) -> Self {
        Self { node, region, margin, fixed: false }
    }
}

/// The regions of one container's displayed children plus the size of
/// everything they cover. Always replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Arrangement {
    placements: Vec<Placement>,
    index: HashMap<NodeId, usize>,
    /// Space the children need before alignment, measured from the content
    /// origin. Larger than the content box when the container overflows.
    pub virtual_size: Size,
}

impl Arrangement {
    pub fn new(placements: Vec<Placement>, virtual_size: Size) -> Self {
        let index = placements.iter().enumerate().map(|(i, p)| (p.node, i)).collect();
        Self { placements, index, virtual_size }
    }

    pub fn get(&self, node: NodeId) -> Option<&Placement> {
        self.index.get(&node).map(|&i| &self.placements[i])
    }

    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.get(node).map(|placement| placement.region)
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Content measurement for `auto` dimensions.
pub trait Measure {
    /// Natural content-box length of `node` along `axis` when its content
    /// box may use up to `available` cells. The other axis is taken as
    /// given.
    fn content_size(&self, node: NodeId, available: Size, axis: Axis) -> i32;
}

/// A child as the arrangement sees it.
#[derive(Debug, Clone, Copy)]
pub struct Child<'a> {
    pub node: NodeId,
    pub style: &'a ResolvedStyle,
}

impl<'a> Child<'a> {
    pub fn new(node: NodeId, style: &'a ResolvedStyle) -> Self {
        Self { node, style }
    }
}

/// How a child's length along one axis is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Extent {
    Cells(i32),
    Fraction(f64),
    /// No size set: `1fr` on a main axis, fill on a cross axis.
    Fill,
    Auto,
}

/// Everything an arrangement needs besides the children themselves.
#[derive(Clone, Copy)]
pub struct ArrangeContext<'a> {
    pub viewport: Size,
    pub measure: &'a dyn Measure,
    /// The container's width comes from its content, so fractions and unset
    /// widths of its children resolve as `auto`.
    pub auto_width: bool,
    pub auto_height: bool,
}

impl<'a> ArrangeContext<'a> {
    pub fn new(viewport: Size, measure: &'a dyn Measure) -> Self {
        Self { viewport, measure, auto_width: false, auto_height: false }
    }

    pub fn with_auto_axis(mut self, axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => self.auto_width = true,
            Axis::Vertical => self.auto_height = true,
        }
        self
    }

    fn is_auto(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.auto_width,
            Axis::Vertical => self.auto_height,
        }
    }

    /// Classify `style`'s length along `axis`; `reference` resolves
    /// percentages.
    pub(crate) fn extent(&self, style: &ResolvedStyle, axis: Axis, reference: i32) -> Extent {
        let auto_axis = self.is_auto(axis);
        match axis.length(style) {
            Some(Scalar::Auto) => Extent::Auto,
            Some(Scalar::Fraction(_)) | None if auto_axis => Extent::Auto,
            Some(scalar @ Scalar::Fraction(_)) => Extent::Fraction(scalar.fraction_weight()),
            None => Extent::Fill,
            Some(scalar) => Extent::Cells(scalar.resolve(reference, self.viewport).unwrap_or(0)),
        }
    }

    /// Border-box length of `child` along `axis`, measured from content
    /// when the border box may use `available`.
    pub(crate) fn measure_extent(&self, child: Child<'_>, axis: Axis, available: Size) -> i32 {
        let gutter = child.style.gutter();
        let content = Size::new(available.width - gutter.width(), available.height - gutter.height())
            .clamp_non_negative();
        self.measure.content_size(child.node, content, axis) + axis.total(gutter)
    }

    /// Apply `min-*` / `max-*` to a length. `min` wins over `max`.
    pub(crate) fn clamp(&self, style: &ResolvedStyle, axis: Axis, value: i32, reference: i32) -> i32 {
        let resolve = |scalar: Option<Scalar>| scalar.and_then(|s| s.resolve(reference, self.viewport));
        let mut value = value.max(0);
        if let Some(max) = resolve(axis.max_length(style)) {
            value = value.min(max);
        }
        if let Some(min) = resolve(axis.min_length(style)) {
            value = value.max(min);
        }
        value
    }

    /// Length along `axis` for a child that fills `space` unless sized.
    pub(crate) fn fill_or_size(&self, child: Child<'_>, axis: Axis, space: i32, other: i32) -> i32 {
        let margin = axis.total(child.style.margin);
        let available = (space - margin).max(0);
        let value = match self.extent(child.style, axis, space) {
            Extent::Cells(cells) => cells,
            Extent::Auto => self.measure_extent(child, axis, axis.compose(available, other)),
            Extent::Fraction(_) | Extent::Fill => available,
        };
        self.clamp(child.style, axis, value, space)
    }
}

// ---------------------------------------------------------------------------
// arrange
// ---------------------------------------------------------------------------

/// Arrange `children` of a container styled `style` in a content box of
/// `size`. `children` holds only displayed nodes, in document order.
pub fn arrange(ctx: &ArrangeContext<'_>, style: &ResolvedStyle, children: &[Child<'_>], size: Size) -> Arrangement {
    let size = size.clamp_non_negative();
    let mut placements = Vec::with_capacity(children.len());

    let mut area = size.to_region();
    let mut docked_extent = Size::ZERO;
    for child in children {
        if let Some(dock) = child.style.dock {
            let (placement, rest) = place_docked(ctx, *child, dock, area);
            let outer = placement.region.grow(placement.margin);
            docked_extent = match dock {
                Dock::Top | Dock::Bottom => docked_extent.max(Size::new(outer.right(), 0)),
                Dock::Left | Dock::Right => docked_extent.max(Size::new(0, outer.bottom())),
            };
            placements.push(placement);
            area = rest;
        }
    }

    let flow: Vec<Child<'_>> = children
        .iter()
        .filter(|child| child.style.dock.is_none() && child.style.position == Position::Relative)
        .copied()
        .collect();
    let mut flowed = match style.layout {
        LayoutMode::Vertical => arrange_box(ctx, Axis::Vertical, &flow, area.size()),
        LayoutMode::Horizontal => arrange_box(ctx, Axis::Horizontal, &flow, area.size()),
        LayoutMode::Center => {
            arrange_box(&ctx.with_auto_axis(Axis::Vertical), Axis::Vertical, &flow, area.size())
        }
        LayoutMode::Grid => arrange_grid(ctx, &style.grid, &flow, area.size()),
    };

    let (horizontal, vertical) = match style.layout {
        LayoutMode::Center => (AlignHorizontal::Center, AlignVertical::Middle),
        _ => (style.align_horizontal, style.align_vertical),
    };
    let flow_extent = align(&mut flowed, horizontal, vertical, area.size());
    // Docks add what they took from each edge.
    let mut virtual_size = Size::new(
        size.width - area.width + flow_extent.width,
        size.height - area.height + flow_extent.height,
    )
    .max(docked_extent);

    // Placements come back in flow order, minus any the grid dropped.
    let mut remaining = flow.iter();
    for placement in &mut flowed {
        placement.region = placement.region.translate(area.offset());
        if let Some(child) = remaining.find(|child| child.node == placement.node) {
            placement.region = placement.region.translate(offset_of(ctx, child.style, placement.region));
        }
    }
    placements.extend(flowed);

    for child in children {
        if child.style.dock.is_none() && child.style.position == Position::Absolute {
            let placement = place_absolute(ctx, *child, size);
            let outer = placement.region.grow(placement.margin);
            virtual_size = virtual_size.max(Size::new(outer.right(), outer.bottom()));
            placements.push(placement);
        }
    }

    Arrangement::new(placements, virtual_size)
}

/// Whether arranging `child` inside a container styled `container` reads the
/// child's content along `axis`. `auto_axis` is set when the container is
/// itself being measured along `axis`.
///
/// Follows the length rules of [`arrange`]: `auto` always measures, fixed
/// lengths never do, and unset or fractional lengths measure on a measured
/// axis, along a dock's edge, vertically in `center` layout and in `auto`
/// grid tracks.
pub fn measures_content(container: &ResolvedStyle, child: &ResolvedStyle, axis: Axis, auto_axis: bool) -> bool {
    match axis.length(child) {
        Some(Scalar::Auto) => return true,
        Some(Scalar::Fraction(_)) | None => {}
        Some(_) => return false,
    }
    if auto_axis {
        return true;
    }
    if let Some(dock) = child.dock {
        return dock_axis(dock) == axis;
    }
    if child.position == Position::Absolute {
        return false;
    }
    match container.layout {
        LayoutMode::Center => axis == Axis::Vertical,
        LayoutMode::Grid => {
            let tracks = match axis {
                Axis::Horizontal => &container.grid.column_tracks,
                Axis::Vertical => &container.grid.row_tracks,
            };
            tracks.iter().any(|track| track.is_auto())
        }
        LayoutMode::Vertical | LayoutMode::Horizontal => false,
    }
}

/// The axis a docked child takes its length along.
fn dock_axis(dock: Dock) -> Axis {
    match dock {
        Dock::Top | Dock::Bottom => Axis::Vertical,
        Dock::Left | Dock::Right => Axis::Horizontal,
    }
}

/// Place a docked child against `dock` of `area`, returning the placement
/// and what is left of the area.
fn place_docked(ctx: &ArrangeContext<'_>, child: Child<'_>, dock: Dock, area: Region) -> (Placement, Region) {
    let axis = dock_axis(dock);
    let cross = axis.cross();
    let margin = child.style.margin;
    let main_space = axis.extent(area.size());
    let cross_space = cross.extent(area.size());

    let cross_size = ctx.fill_or_size(child, cross, cross_space, (main_space - axis.total(margin)).max(0));
    let main_size = match ctx.extent(child.style, axis, main_space) {
        Extent::Cells(cells) => cells,
        Extent::Fraction(_) | Extent::Fill | Extent::Auto => ctx.measure_extent(
            child,
            axis,
            axis.compose((main_space - axis.total(margin)).max(0), cross_size),
        ),
    };
    let main_size = ctx.clamp(child.style, axis, main_size, main_space);

    let mut taken = main_size + axis.total(margin);
    if taken > main_space {
        debug!(node = ?child.node, taken, available = main_space, "docked widget overflows its container");
        taken = main_space;
    }

    let size = axis.compose(main_size, cross_size);
    let (origin, rest) = match dock {
        Dock::Top => (
            Offset::new(area.x + margin.left, area.y + margin.top),
            Region::new(area.x, area.y + taken, area.width, area.height - taken),
        ),
        Dock::Bottom => (
            Offset::new(area.x + margin.left, area.bottom() - margin.bottom - main_size),
            Region::new(area.x, area.y, area.width, area.height - taken),
        ),
        Dock::Left => (
            Offset::new(area.x + margin.left, area.y + margin.top),
            Region::new(area.x + taken, area.y, area.width - taken, area.height),
        ),
        Dock::Right => (
            Offset::new(area.right() - margin.right - main_size, area.y + margin.top),
            Region::new(area.x, area.y, area.width - taken, area.height),
        ),
    };
    let placement = Placement { fixed: true, ..Placement::new(child.node, Region::from_parts(origin, size), margin) };
    (placement, rest)
}

fn place_absolute(ctx: &ArrangeContext<'_>, child: Child<'_>, size: Size) -> Placement {
    let margin = child.style.margin;
    let width = ctx.fill_or_size(child, Axis::Horizontal, size.width, (size.height - margin.height()).max(0));
    let height = ctx.fill_or_size(child, Axis::Vertical, size.height, width);
    let region = Region::new(margin.left, margin.top, width, height);
    let region = region.translate(offset_of(ctx, child.style, region));
    Placement::new(child.node, region, margin)
}

/// The `offset` shift of a widget; percentages are of its own size.
fn offset_of(ctx: &ArrangeContext<'_>, style: &ResolvedStyle, region: Region) -> Offset {
    let x = style.offset_x.map_or(0, |x| x.resolve_signed(region.width, ctx.viewport));
    let y = style.offset_y.map_or(0, |y| y.resolve_signed(region.height, ctx.viewport));
    Offset::new(x, y)
}

/// Shift the flow group by the space it leaves free, returning the group's
/// extent before the shift. Overflowing groups stay at the origin.
fn align(placements: &mut [Placement], horizontal: AlignHorizontal, vertical: AlignVertical, size: Size) -> Size {
    let extent = placements.iter().fold(Size::ZERO, |extent, placement| {
        let outer = placement.region.grow(placement.margin);
        extent.max(Size::new(outer.right(), outer.bottom()))
    });
    let free_x = (size.width - extent.width).max(0);
    let free_y = (size.height - extent.height).max(0);
    let shift = Offset::new(
        match horizontal {
            AlignHorizontal::Left => 0,
            AlignHorizontal::Center => free_x / 2,
            AlignHorizontal::Right => free_x,
        },
        match vertical {
            AlignVertical::Top => 0,
            AlignVertical::Middle => free_y / 2,
            AlignVertical::Bottom => free_y,
        },
    );
    if !shift.is_zero() {
        for placement in placements {
            placement.region = placement.region.translate(shift);
        }
    }
    extent
}
