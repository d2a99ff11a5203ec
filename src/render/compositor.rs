//! Layering, clipping and overlap resolution.
//!
//! The `Compositor` walks a [`LayoutTree`] and produces a [`RenderTree`]: a
//! flat list of [`Chip`]s, bottom first, that never overlap. Each chip says
//! which node paints which rectangle of the screen. A node is clipped to the
//! inside of every ancestor's border, and whatever a later chip covers is cut
//! out of the earlier chips with [`Region::subtract`], so a corner overlap
//! leaves three fragments of the lower widget rather than one.

use slotmap::SecondaryMap;
use tracing::{debug, trace};

use crate::css::styles::ResolvedStyle;
use crate::dom::NodeId;
use crate::geometry::{Region, Size};
use crate::layout::LayoutTree;

// ---------------------------------------------------------------------------
// Chip
// ---------------------------------------------------------------------------

/// One rectangle of screen painted by one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chip {
    pub node: NodeId,
    /// The node's full border box. Row and column offsets inside the widget
    /// are measured from here.
    pub region: Region,
    /// The part of `region` left after clipping to the ancestors.
    pub clip: Region,
    /// The part of `clip` this chip actually paints.
    pub paint: Region,
    /// Index into the root's `layers` list.
    pub layer: usize,
    /// Depth-first document order of the node.
    pub order: usize,
}

impl Chip {
    /// A chip painting all of `clip`.
    pub fn new(node: NodeId, region: Region, clip: Region, layer: usize, order: usize) -> Self {
        Self { node, region, clip, paint: clip, layer, order }
    }

    /// Row `y` of the paint rectangle relative to the node's region.
    pub fn local_row(&self, y: i32) -> i32 {
        y - self.region.y
    }

    /// Columns of the node covered by the paint rectangle, relative to the
    /// node's region.
    pub fn local_columns(&self) -> (i32, i32) {
        (self.paint.x - self.region.x, self.paint.right() - self.region.x)
    }
}

// ---------------------------------------------------------------------------
// RenderTree
// ---------------------------------------------------------------------------

/// Non-overlapping chips for one frame, in paint order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderTree {
    chips: Vec<Chip>,
    size: Size,
}

impl RenderTree {
    pub fn new(size: Size) -> Self {
        Self { chips: Vec::new(), size }
    }

    /// Paint `chip` on top of everything added so far.
    ///
    /// Existing chips lose whatever `chip` covers; a chip may split into as
    /// many as six fragments, and one that is fully covered disappears.
    pub fn paint(&mut self, chip: Chip) {
        if chip.paint.is_empty() {
            return;
        }
        let occluder = chip.paint;
        let mut kept = Vec::with_capacity(self.chips.len() + 3);
        for below in self.chips.drain(..) {
            if !below.paint.overlaps(occluder) {
                kept.push(below);
                continue;
            }
            kept.extend(below.paint.subtract(occluder).into_iter().map(|paint| Chip { paint, ..below }));
        }
        kept.push(chip);
        self.chips = kept;
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Chips with at least one cell on row `y`, in paint order.
    pub fn chips_in_row(&self, y: i32) -> impl Iterator<Item = &Chip> + '_ {
        self.chips.iter().filter(move |chip| chip.paint.y <= y && y < chip.paint.bottom())
    }

    /// Every fragment painted by `node`.
    pub fn chips_of(&self, node: NodeId) -> impl Iterator<Item = &Chip> + '_ {
        self.chips.iter().filter(move |chip| chip.node == node)
    }

    /// Number of cells painted by all chips.
    pub fn painted_area(&self) -> i32 {
        self.chips.iter().map(|chip| chip.paint.area()).sum()
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Compositor {
    size: Size,
}

impl Compositor {
    pub fn new(size: Size) -> Self {
        Self { size: size.clamp_non_negative() }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size.clamp_non_negative();
    }

    /// Build the render tree for `layout`.
    ///
    /// Layer names come from the root's `layers` property; nodes without a
    /// `layer` paint in their parent's layer. Within a layer, document order
    /// decides. Hidden nodes keep their space but paint nothing, while their
    /// children still may.
    pub fn compose(&self, layout: &LayoutTree, styles: &SecondaryMap<NodeId, ResolvedStyle>) -> RenderTree {
        let mut tree = RenderTree::new(self.size);
        let fallback = ResolvedStyle::default();
        let style_of = |node: NodeId| styles.get(node).unwrap_or(&fallback);

        let Some(&root) = layout.order().first() else {
            return tree;
        };
        let layers = &style_of(root).layers;
        let screen = self.size.to_region();

        // Clip handed to each node's children, and the node's layer.
        let mut inner_clip: SecondaryMap<NodeId, Region> = SecondaryMap::new();
        let mut layer_of: SecondaryMap<NodeId, usize> = SecondaryMap::new();
        let mut candidates: Vec<Chip> = Vec::new();

        for &node in layout.order() {
            let Some(geometry) = layout.get(node) else {
                continue;
            };
            let style = style_of(node);
            let parent_clip = geometry.parent.and_then(|parent| inner_clip.get(parent).copied()).unwrap_or(screen);
            let parent_layer = geometry.parent.and_then(|parent| layer_of.get(parent).copied()).unwrap_or(0);

            let layer = match &style.layer {
                Some(name) => layers.iter().position(|layer| layer == name).unwrap_or_else(|| {
                    debug!(?node, layer = %name, "unknown layer, painting in layer 0");
                    0
                }),
                None => parent_layer,
            };
            layer_of.insert(node, layer);

            let region = geometry.region;
            if region.width < 0 || region.height < 0 {
                debug!(?node, ?region, "inverted region treated as empty");
            }
            let visible = region.intersection(parent_clip);
            inner_clip.insert(node, visible.intersection(region.shrink(style.border.thickness())));

            if visible.is_empty() || !style.is_visible() {
                continue;
            }
            candidates.push(Chip::new(node, region, visible, layer, geometry.order));
        }

        candidates.sort_by_key(|chip| (chip.layer, chip.order));
        for chip in candidates {
            tree.paint(chip);
        }
        trace!(chips = tree.len(), "composed render tree");
        tree
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}
