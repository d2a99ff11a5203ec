//! The layout engine: turns the DOM plus resolved styles into absolute
//! screen regions.
//!
//! [`LayoutEngine::reflow`] walks the tree from the root, which always
//! fills the viewport. Each container's children are arranged (or fetched
//! from the [`ArrangementCache`]) in the container's content box, then
//! translated to screen coordinates and by the container's scroll offset.
//! Docked children do not scroll.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use slotmap::SecondaryMap;
use tracing::{debug, trace};

use crate::css::styles::ResolvedStyle;
use crate::dom::{DirtyFlags, Dom, NodeId};
use crate::geometry::{Offset, Region, Size};

use super::arrange::{arrange, measures_content, ArrangeContext, Arrangement, Child, Measure};
use super::box_model::Axis;
use super::cache::{ArrangementCache, ArrangementKey, DEFAULT_CAPACITY};

/// Upper bound on measurement passes per auto-sized axis.
pub const DEFAULT_AUTO_SIZE_PASSES: usize = 2;

// ---------------------------------------------------------------------------
// LayoutTree
// ---------------------------------------------------------------------------

/// Geometry of one laid-out node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutNode {
    /// Border box in screen coordinates.
    pub region: Region,
    /// `region` minus border and padding.
    pub content: Region,
    pub parent: Option<NodeId>,
    /// Position in depth-first document order.
    pub order: usize,
}

/// Result of one reflow. Nodes that are not displayed, or that a full grid
/// left out, have no entry.
#[derive(Debug, Clone, Default)]
pub struct LayoutTree {
    nodes: SecondaryMap<NodeId, LayoutNode>,
    order: Vec<NodeId>,
    arrangements: SecondaryMap<NodeId, Arc<Arrangement>>,
    viewport: Size,
}

impl LayoutTree {
    fn new(viewport: Size) -> Self {
        Self { viewport, ..Self::default() }
    }

    pub fn get(&self, node: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(node)
    }

    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.nodes.get(node).map(|layout| layout.region)
    }

    pub fn content_region(&self, node: NodeId) -> Option<Region> {
        self.nodes.get(node).map(|layout| layout.content)
    }

    /// Arrangement of `container`'s children, if it has any displayed.
    pub fn arrangement(&self, container: NodeId) -> Option<Arc<Arrangement>> {
        self.arrangements.get(container).cloned()
    }

    /// Laid-out nodes in depth-first document order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LayoutEngine
// ---------------------------------------------------------------------------

pub struct LayoutEngine {
    cache: ArrangementCache,
    auto_size_passes: usize,
}

impl LayoutEngine {
    pub fn new(cache_capacity: usize, auto_size_passes: usize) -> Self {
        Self { cache: ArrangementCache::new(cache_capacity), auto_size_passes: auto_size_passes.max(1) }
    }

    pub fn cache(&self) -> &ArrangementCache {
        &self.cache
    }

    /// Forget every cached arrangement.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Lay out the whole tree in `viewport`.
    ///
    /// Nodes without an entry in `styles` use the default style.
    /// `scroll_offset` gives the current scroll position of a container.
    pub fn reflow(
        &mut self,
        dom: &Dom,
        styles: &SecondaryMap<NodeId, ResolvedStyle>,
        viewport: Size,
        scroll_offset: impl Fn(NodeId) -> Offset,
    ) -> LayoutTree {
        let mut tree = LayoutTree::new(viewport);
        let fallback = ResolvedStyle::default();
        let style_of = |node: NodeId| styles.get(node).unwrap_or(&fallback);

        let Some(root) = dom.root() else {
            return tree;
        };
        if !style_of(root).is_displayed() {
            return tree;
        }

        let measurer = Measurer {
            dom,
            styles,
            fallback: &fallback,
            viewport,
            passes: self.auto_size_passes,
            memo: RefCell::new(HashMap::new()),
        };

        let screen = viewport.clamp_non_negative().to_region();
        tree.nodes.insert(
            root,
            LayoutNode { region: screen, content: screen.shrink(style_of(root).gutter()), parent: None, order: 0 },
        );

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let Some(layout) = tree.nodes.get_mut(node) else {
                continue;
            };
            layout.order = tree.order.len();
            tree.order.push(node);
            let content = layout.content;

            let children = displayed_children(dom, node, &style_of);
            if children.is_empty() {
                continue;
            }

            let arrangement = self.arrange_cached(dom, &measurer, node, style_of(node), &children, content.size());
            let scroll = scroll_offset(node);
            for child in &children {
                let Some(placement) = arrangement.get(child.node) else {
                    continue;
                };
                let shift = if placement.fixed { Offset::ZERO } else { -scroll };
                let region = placement.region.translate(content.offset() + shift);
                tree.nodes.insert(
                    child.node,
                    LayoutNode { region, content: region.shrink(child.style.gutter()), parent: Some(node), order: 0 },
                );
            }
            stack.extend(children.iter().rev().map(|child| child.node).filter(|id| tree.nodes.contains_key(*id)));
            tree.arrangements.insert(node, arrangement);
        }

        let stats = self.cache.stats();
        trace!(nodes = tree.order.len(), hits = stats.hits, misses = stats.misses, "reflow complete");
        tree
    }

    fn arrange_cached(
        &mut self,
        dom: &Dom,
        measurer: &Measurer<'_>,
        container: NodeId,
        style: &ResolvedStyle,
        children: &[Child<'_>],
        size: Size,
    ) -> Arc<Arrangement> {
        let version = |node: NodeId| dom.get(node).map_or(0, |data| data.style_version());
        let key = ArrangementKey::new(
            container,
            size,
            version(container),
            measurer.viewport,
            children.iter().map(|child| (child.node, version(child.node))),
        );

        let dirty = dom.get(container).is_some_and(|data| data.dirty().contains(DirtyFlags::LAYOUT));
        if dirty {
            debug!(?container, "layout dirty, bypassing arrangement cache");
            self.cache.invalidate(container);
        } else if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let ctx = ArrangeContext::new(measurer.viewport, measurer);
        let arrangement = Arc::new(arrange(&ctx, style, children, size));
        self.cache.insert(key, Arc::clone(&arrangement));
        arrangement
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_AUTO_SIZE_PASSES)
    }
}

fn displayed_children<'s>(
    dom: &Dom,
    node: NodeId,
    style_of: &impl Fn(NodeId) -> &'s ResolvedStyle,
) -> Vec<Child<'s>> {
    dom.children(node)
        .iter()
        .map(|&child| Child::new(child, style_of(child)))
        .filter(|child| child.style.is_displayed())
        .collect()
}

/// Whether the arrangement of `node`'s parent reads `node`'s content on
/// either axis. A change anywhere inside such a node can move it, so its
/// parent has to be arranged again. The root always fills the viewport.
pub(crate) fn is_content_sized(dom: &Dom, styles: &SecondaryMap<NodeId, ResolvedStyle>, node: NodeId) -> bool {
    let fallback = ResolvedStyle::default();
    let style_of = |id: NodeId| styles.get(id).unwrap_or(&fallback);
    [Axis::Horizontal, Axis::Vertical].into_iter().any(|axis| measured_along(dom, &style_of, node, axis))
}

/// A node is measured along `axis` when its parent's arrangement measures
/// it, which in turn depends on whether the parent is being measured.
fn measured_along<'s>(
    dom: &Dom,
    style_of: &impl Fn(NodeId) -> &'s ResolvedStyle,
    node: NodeId,
    axis: Axis,
) -> bool {
    let Some(parent) = dom.parent(node) else {
        return false;
    };
    let auto_axis = measured_along(dom, style_of, parent, axis);
    measures_content(style_of(parent), style_of(node), axis, auto_axis)
}

// ---------------------------------------------------------------------------
// Auto-size measurement
// ---------------------------------------------------------------------------

/// Measures content for `auto` lengths during one reflow.
///
/// A node's content length is the larger of what its widget reports and the
/// extent of its arranged children. Children are arranged with the measured
/// axis treated as content-sized, then re-arranged at the measured length
/// until it stops changing or the pass limit is hit.
struct Measurer<'a> {
    dom: &'a Dom,
    styles: &'a SecondaryMap<NodeId, ResolvedStyle>,
    fallback: &'a ResolvedStyle,
    viewport: Size,
    passes: usize,
    memo: RefCell<HashMap<(NodeId, Size, Axis), i32>>,
}

impl Measurer<'_> {
    fn style(&self, node: NodeId) -> &ResolvedStyle {
        self.styles.get(node).unwrap_or(self.fallback)
    }

    fn measure_children(&self, node: NodeId, children: &[Child<'_>], available: Size, axis: Axis) -> i32 {
        let style = self.style(node);
        let ctx = ArrangeContext::new(self.viewport, self).with_auto_axis(axis);
        let cross = axis.cross().extent(available);

        let mut size = available;
        let mut measured = axis.extent(arrange(&ctx, style, children, size).virtual_size);
        for _ in 1..self.passes {
            let next = axis.compose(measured, cross);
            if next == size {
                break;
            }
            size = next;
            measured = axis.extent(arrange(&ctx, style, children, size).virtual_size);
        }
        measured
    }
}

impl Measure for Measurer<'_> {
    fn content_size(&self, node: NodeId, available: Size, axis: Axis) -> i32 {
        if let Some(length) = self.memo.borrow().get(&(node, available, axis)) {
            return *length;
        }

        let own = self.dom.widget(node).map_or(0, |widget| axis.extent(widget.measure(available)));
        let children = displayed_children(self.dom, node, &|child| self.style(child));
        let length = if children.is_empty() {
            own
        } else {
            own.max(self.measure_children(node, &children, available, axis))
        };

        self.memo.borrow_mut().insert((node, available, axis), length);
        length
    }
}
