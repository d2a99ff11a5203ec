//! Vertical and horizontal box layout.
//!
//! Children are stacked along the main axis. Each child's cross-axis length
//! is settled first (fill, fixed, or measured), then main-axis lengths:
//! fixed and measured children take their space, and whatever is left is
//! shared between the fractional children by [`distribute`]. Adjacent
//! main-axis margins collapse to the larger of the two.

use tracing::debug;

use crate::css::scalar::Scalar;
use crate::css::styles::ResolvedStyle;
use crate::geometry::{Offset, Region, Size, Spacing};

use super::arrange::{ArrangeContext, Child, Extent, Placement};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Lets one implementation serve both stacking directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// The component of `size` along this axis.
    pub fn extent(self, size: Size) -> i32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// A size from a length along this axis and one across it.
    pub fn compose(self, main: i32, cross: i32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    /// A point from a position along this axis and one across it.
    pub fn offset(self, main: i32, cross: i32) -> Offset {
        match self {
            Axis::Horizontal => Offset::new(main, cross),
            Axis::Vertical => Offset::new(cross, main),
        }
    }

    pub fn leading(self, spacing: Spacing) -> i32 {
        match self {
            Axis::Horizontal => spacing.left,
            Axis::Vertical => spacing.top,
        }
    }

    pub fn trailing(self, spacing: Spacing) -> i32 {
        match self {
            Axis::Horizontal => spacing.right,
            Axis::Vertical => spacing.bottom,
        }
    }

    pub fn total(self, spacing: Spacing) -> i32 {
        self.leading(spacing) + self.trailing(spacing)
    }

    pub(crate) fn length(self, style: &ResolvedStyle) -> Option<Scalar> {
        match self {
            Axis::Horizontal => style.width,
            Axis::Vertical => style.height,
        }
    }

    pub(crate) fn min_length(self, style: &ResolvedStyle) -> Option<Scalar> {
        match self {
            Axis::Horizontal => style.min_width,
            Axis::Vertical => style.min_height,
        }
    }

    pub(crate) fn max_length(self, style: &ResolvedStyle) -> Option<Scalar> {
        match self {
            Axis::Horizontal => style.max_width,
            Axis::Vertical => style.max_height,
        }
    }
}

// ---------------------------------------------------------------------------
// Fraction distribution
// ---------------------------------------------------------------------------

/// Split `space` cells between `weights`.
///
/// Every positive weight except the last gets `floor(space * w / total)`;
/// the last positive weight gets whatever remains, so the shares always sum
/// to exactly `space`. Zero and negative weights get nothing, as does
/// everyone when no weight is positive. Negative space counts as zero.
pub fn distribute(space: i32, weights: &[f64]) -> Vec<i32> {
    let space = space.max(0);
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    let mut shares = vec![0; weights.len()];
    let Some(last) = weights.iter().rposition(|w| *w > 0.0) else {
        return shares;
    };
    let mut given = 0;
    for (i, weight) in weights.iter().enumerate().take(last) {
        if *weight > 0.0 {
            let share = (f64::from(space) * weight / total).floor() as i32;
            let share = share.clamp(0, space - given);
            shares[i] = share;
            given += share;
        }
    }
    shares[last] = space - given;
    shares
}

// ---------------------------------------------------------------------------
// Box layout
// ---------------------------------------------------------------------------

/// Stack `children` along `axis` inside a content box of `size`.
///
/// Regions start at the origin; alignment is applied by the caller.
pub fn arrange_box(ctx: &ArrangeContext<'_>, axis: Axis, children: &[Child<'_>], size: Size) -> Vec<Placement> {
    let cross_axis = axis.cross();
    let main_space = axis.extent(size);
    let cross_space = cross_axis.extent(size);

    // Gap before each child after collapsing with the previous margin.
    let mut gaps = Vec::with_capacity(children.len());
    let mut previous_trailing = None;
    for child in children {
        let leading = axis.leading(child.style.margin);
        gaps.push(previous_trailing.map_or(leading, |trailing: i32| trailing.max(leading)));
        previous_trailing = Some(axis.trailing(child.style.margin));
    }
    let margin_total: i32 = gaps.iter().sum::<i32>() + previous_trailing.unwrap_or(0);

    let cross: Vec<i32> = children
        .iter()
        .map(|child| {
            let available_main = (main_space - axis.total(child.style.margin)).max(0);
            ctx.fill_or_size(*child, cross_axis, cross_space, available_main)
        })
        .collect();

    let mut main = vec![0; children.len()];
    let mut weights = vec![0.0; children.len()];
    for (i, child) in children.iter().enumerate() {
        main[i] = match ctx.extent(child.style, axis, main_space) {
            Extent::Cells(cells) => ctx.clamp(child.style, axis, cells, main_space),
            Extent::Auto => {
                let available = axis.compose((main_space - axis.total(child.style.margin)).max(0), cross[i]);
                let measured = ctx.measure_extent(*child, axis, available);
                ctx.clamp(child.style, axis, measured, main_space)
            }
            Extent::Fraction(weight) => {
                weights[i] = weight;
                0
            }
            Extent::Fill => {
                weights[i] = 1.0;
                0
            }
        };
    }

    let remaining = main_space - margin_total - main.iter().sum::<i32>();
    if remaining < 0 {
        debug!(overflow = -remaining, ?axis, "children overflow their container");
    }
    if weights.iter().any(|w| *w > 0.0) {
        let shares = distribute(remaining, &weights);
        for (i, share) in shares.into_iter().enumerate() {
            if weights[i] > 0.0 {
                main[i] = ctx.clamp(children[i].style, axis, share, main_space);
            }
        }
    }

    let mut cursor = 0;
    children
        .iter()
        .enumerate()
        .map(|(i, child)| {
            cursor += gaps[i];
            let origin = axis.offset(cursor, cross_axis.leading(child.style.margin));
            cursor += main[i];
            Placement::new(child.node, Region::from_parts(origin, axis.compose(main[i], cross[i])), child.style.margin)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::arrange::tests::{ids, style, FixedMeasure};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn heights(placements: &[Placement]) -> Vec<i32> {
        placements.iter().map(|p| p.region.height).collect()
    }

    fn fr(weight: f32) -> ResolvedStyle {
        style(|s| s.height = Some(Scalar::Fraction(weight)))
    }

    #[test]
    fn distribute_exact_division() {
        assert_eq!(distribute(40, &[1.0, 2.0, 1.0]), vec![10, 20, 10]);
    }

    #[test]
    fn distribute_remainder_goes_last() {
        assert_eq!(distribute(41, &[1.0, 1.0]), vec![20, 21]);
        assert_eq!(distribute(10, &[1.0, 1.0, 1.0]), vec![3, 3, 4]);
    }

    #[test]
    fn distribute_degenerate_inputs() {
        assert_eq!(distribute(10, &[]), Vec::<i32>::new());
        assert_eq!(distribute(10, &[0.0, 0.0]), vec![0, 0]);
        assert_eq!(distribute(-5, &[1.0, 1.0]), vec![0, 0]);
        assert_eq!(distribute(9, &[1.0, 0.0]), vec![9, 0]);
        assert_eq!(distribute(9, &[-1.0, 2.0]), vec![0, 9]);
    }

    proptest! {
        #[test]
        fn distribute_sums_to_space(
            space in 0i32..10_000,
            weights in prop::collection::vec(0.0f64..50.0, 1..12),
        ) {
            let shares = distribute(space, &weights);
            prop_assert_eq!(shares.len(), weights.len());
            prop_assert!(shares.iter().all(|s| *s >= 0));
            if weights.iter().any(|w| *w > 0.0) {
                prop_assert_eq!(shares.iter().sum::<i32>(), space);
            } else {
                prop_assert!(shares.iter().all(|s| *s == 0));
            }
        }
    }

    #[test]
    fn fractions_share_the_main_axis() {
        let nodes = ids(3);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(20, 40), &measure);
        let (one, two) = (fr(1.0), fr(2.0));
        let children = [Child::new(nodes[0], &one), Child::new(nodes[1], &two), Child::new(nodes[2], &one)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(20, 40));
        assert_eq!(heights(&placements), vec![10, 20, 10]);
        assert_eq!(placements[1].region, Region::new(0, 10, 20, 20));
        assert_eq!(placements[2].region.y, 30);
    }

    #[test]
    fn fixed_percent_and_fraction_mix() {
        let nodes = ids(3);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(100, 30), &measure);
        let fixed = style(|s| s.width = Some(Scalar::Cells(20.0)));
        let percent = style(|s| s.width = Some(Scalar::Percent(30.0)));
        let rest = style(|_| {});
        let children = [Child::new(nodes[0], &fixed), Child::new(nodes[1], &percent), Child::new(nodes[2], &rest)];
        let placements = arrange_box(&ctx, Axis::Horizontal, &children, Size::new(100, 30));
        let widths: Vec<i32> = placements.iter().map(|p| p.region.width).collect();
        assert_eq!(widths, vec![20, 30, 50]);
        assert!(placements.iter().all(|p| p.region.height == 30));
        assert_eq!(placements[2].region.x, 50);
    }

    #[test]
    fn margins_collapse_between_siblings() {
        let nodes = ids(2);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(10, 20), &measure);
        let first = style(|s| {
            s.height = Some(Scalar::Cells(3.0));
            s.margin = Some(Spacing::new(1, 2, 2, 2));
        });
        let second = style(|s| {
            s.height = Some(Scalar::Cells(3.0));
            s.margin = Some(Spacing::new(3, 0, 0, 0));
        });
        let children = [Child::new(nodes[0], &first), Child::new(nodes[1], &second)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(10, 20));
        assert_eq!(placements[0].region, Region::new(2, 1, 6, 3));
        assert_eq!(placements[1].region, Region::new(0, 7, 10, 3));
    }

    #[test]
    fn fractions_take_space_after_margins() {
        let nodes = ids(2);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(10, 12), &measure);
        let spaced = style(|s| s.margin = Some(Spacing::all(1)));
        let children = [Child::new(nodes[0], &spaced), Child::new(nodes[1], &spaced)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(10, 12));
        // 12 - (1 + 1 + 1) = 9 rows shared.
        assert_eq!(heights(&placements), vec![4, 5]);
        assert_eq!(placements[1].region.y, 6);
    }

    #[test]
    fn auto_uses_measurement_plus_gutter() {
        let nodes = ids(2);
        let measure = FixedMeasure(HashMap::from([(nodes[0], Size::new(5, 2))]));
        let ctx = ArrangeContext::new(Size::new(20, 10), &measure);
        let auto = style(|s| {
            s.height = Some(Scalar::Auto);
            s.padding = Some(Spacing::symmetric(1, 0));
        });
        let rest = style(|_| {});
        let children = [Child::new(nodes[0], &auto), Child::new(nodes[1], &rest)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(20, 10));
        assert_eq!(heights(&placements), vec![4, 6]);
    }

    #[test]
    fn min_and_max_clamp() {
        let nodes = ids(2);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(10, 20), &measure);
        let capped = style(|s| s.max_height = Some(Scalar::Cells(4.0)));
        let floored = style(|s| {
            s.height = Some(Scalar::Cells(1.0));
            s.min_height = Some(Scalar::Cells(3.0));
        });
        let children = [Child::new(nodes[0], &capped), Child::new(nodes[1], &floored)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(10, 20));
        assert_eq!(heights(&placements), vec![4, 3]);
    }

    #[test]
    fn auto_container_treats_fractions_as_auto() {
        let nodes = ids(1);
        let measure = FixedMeasure(HashMap::from([(nodes[0], Size::new(3, 2))]));
        let ctx = ArrangeContext::new(Size::new(20, 10), &measure).with_auto_axis(Axis::Vertical);
        let one = fr(1.0);
        let children = [Child::new(nodes[0], &one)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(20, 10));
        assert_eq!(heights(&placements), vec![2]);
    }

    #[test]
    fn overflow_keeps_fixed_sizes() {
        let nodes = ids(3);
        let measure = FixedMeasure::default();
        let ctx = ArrangeContext::new(Size::new(10, 5), &measure);
        let big = style(|s| s.height = Some(Scalar::Cells(4.0)));
        let flexible = style(|_| {});
        let children = [Child::new(nodes[0], &big), Child::new(nodes[1], &big), Child::new(nodes[2], &flexible)];
        let placements = arrange_box(&ctx, Axis::Vertical, &children, Size::new(10, 5));
        assert_eq!(heights(&placements), vec![4, 4, 0]);
    }
}
