//! The screen: one DOM and everything needed to turn it into terminal output.
//!
//! [`Screen`] owns the DOM, the style resolver and resolved styles, the
//! layout engine, the compositor and the frame renderer. Changes are
//! reported with [`mark_dirty`](Screen::mark_dirty) (or any DOM mutation)
//! and consumed all at once by [`render_frame`](Screen::render_frame):
//!
//! 1. drain the DOM's dirty queue;
//! 2. re-run the cascade for style-dirty subtrees;
//! 3. force re-arrangement of every container whose result may depend on a
//!    changed node;
//! 4. reflow, compose and render.

use std::collections::HashSet;
use std::sync::Arc;

use slotmap::SecondaryMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::app::AppConfig;
use crate::css::styles::ResolvedStyle;
use crate::css::{ParseError, StyleResolver};
use crate::dom::{DirtyKind, Dom, DomError, NodeData, NodeId};
use crate::geometry::{Offset, Region, Size};
use crate::layout::cache::CacheStats;
use crate::layout::engine::is_content_sized;
use crate::layout::{Arrangement, LayoutEngine, LayoutTree, SpatialMap};
use crate::render::compositor::{Compositor, RenderTree};
use crate::render::content::DomContent;
use crate::render::renderer::{FrameRenderer, FrameStats, RenderError, RenderSink};
use crate::widget::{ScrollState, Widget};

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("invalid stylesheet: {0}")]
    Css(#[from] ParseError),
    #[error("the screen already has a root; remove it before mounting another")]
    RootExists,
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

pub struct Screen {
    dom: Dom,
    resolver: StyleResolver,
    styles: SecondaryMap<NodeId, ResolvedStyle>,
    engine: LayoutEngine,
    layout: LayoutTree,
    compositor: Compositor,
    render_tree: RenderTree,
    renderer: FrameRenderer,
    spatial: SpatialMap,
    scroll: SecondaryMap<NodeId, ScrollState>,
    /// Widget types whose default CSS has been added.
    registered: HashSet<String>,
    size: Size,
    frame_requested: bool,
    restyle_all: bool,
}

impl Screen {
    /// A screen with the default configuration.
    pub fn new(width: u16, height: u16) -> Self {
        let config = AppConfig::default();
        let size = Size::new(i32::from(width), i32::from(height));
        Self::build(size, &config)
    }

    /// A screen using the engine settings and stylesheet of `config`.
    pub fn with_config(width: u16, height: u16, config: &AppConfig) -> Result<Self, ScreenError> {
        let size = Size::new(i32::from(width), i32::from(height));
        let mut screen = Self::build(size, config);
        if let Some(css) = &config.css {
            screen.add_css(css)?;
        }
        Ok(screen)
    }

    fn build(size: Size, config: &AppConfig) -> Self {
        Self {
            dom: Dom::new(),
            resolver: StyleResolver::new(),
            styles: SecondaryMap::new(),
            engine: LayoutEngine::new(config.cache_capacity, config.auto_size_passes),
            layout: LayoutTree::default(),
            compositor: Compositor::new(size),
            render_tree: RenderTree::new(size),
            renderer: FrameRenderer::new(size),
            spatial: SpatialMap::new(),
            scroll: SecondaryMap::new(),
            registered: HashSet::new(),
            size,
            frame_requested: true,
            restyle_all: false,
        }
    }

    // -----------------------------------------------------------------------
    // Tree and styles
    // -----------------------------------------------------------------------

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Direct DOM access. Structural and class changes are picked up at the
    /// next frame; widget edits should be reported with `mark_dirty`.
    pub fn dom_mut(&mut self) -> &mut Dom {
        self.frame_requested = true;
        &mut self.dom
    }

    /// Add user CSS. Every node is restyled at the next frame.
    pub fn add_css(&mut self, css: &str) -> Result<(), ScreenError> {
        self.resolver.add_css(css)?;
        self.restyle_all = true;
        self.request_frame();
        Ok(())
    }

    pub fn resolver(&self) -> &StyleResolver {
        &self.resolver
    }

    /// Mount `widget` as a new node under `parent`, or as the root when
    /// `parent` is `None`. There is only ever one root.
    pub fn mount(
        &mut self,
        parent: Option<NodeId>,
        data: NodeData,
        widget: impl Widget + 'static,
    ) -> Result<NodeId, ScreenError> {
        if parent.is_none() && self.dom.root().is_some() {
            return Err(ScreenError::RootExists);
        }
        self.register_default_css(&widget);
        let node = match parent {
            Some(parent) => self.dom.insert_child(parent, data)?,
            None => {
                let node = self.dom.insert(data);
                self.dom.set_root(node);
                node
            }
        };
        self.dom.set_widget(node, Box::new(widget))?;
        self.request_frame();
        Ok(node)
    }

    fn register_default_css(&mut self, widget: &dyn Widget) {
        let widget_type = widget.widget_type();
        if self.registered.contains(widget_type) {
            return;
        }
        self.registered.insert(widget_type.to_owned());
        let css = widget.default_css();
        if css.is_empty() {
            return;
        }
        match self.resolver.add_default_css(css) {
            Ok(()) => self.restyle_all = true,
            Err(error) => warn!(widget_type, %error, "ignoring widget default CSS"),
        }
    }

    /// Remove `node` and its subtree.
    pub fn remove(&mut self, node: NodeId) -> Result<(), ScreenError> {
        let subtree = self.dom.walk_depth_first(node);
        self.dom.remove(node)?;
        for id in subtree {
            self.styles.remove(id);
            self.scroll.remove(id);
        }
        self.request_frame();
        Ok(())
    }

    /// Report a change to `node`. Style changes re-run the cascade for its
    /// subtree; content changes re-measure and repaint it.
    pub fn mark_dirty(&mut self, node: NodeId, kind: DirtyKind) {
        self.dom.mark_dirty(node, kind);
        self.request_frame();
    }

    /// Edit the widget of `node` as a `W` and mark it content-dirty.
    /// Returns `false` if the node has no widget of that type.
    pub fn update_widget<W: Widget + 'static>(&mut self, node: NodeId, edit: impl FnOnce(&mut W)) -> bool {
        let Some(widget) = self.dom.widget_mut(node).and_then(|widget| widget.downcast_mut::<W>()) else {
            return false;
        };
        edit(widget);
        self.mark_dirty(node, DirtyKind::Content);
        true
    }

    pub fn style(&self, node: NodeId) -> Option<&ResolvedStyle> {
        self.styles.get(node)
    }

    // -----------------------------------------------------------------------
    // Geometry queries
    // -----------------------------------------------------------------------

    /// The arrangement of `container`'s children from the last frame.
    pub fn get_arrangement(&self, container: NodeId) -> Option<Arc<Arrangement>> {
        self.layout.arrangement(container)
    }

    /// Screen region of `node` from the last frame. `None` if it was not
    /// laid out or is hidden.
    pub fn get_region(&self, node: NodeId) -> Option<Region> {
        let region = self.layout.region(node)?;
        let visible = self.styles.get(node).map_or(true, ResolvedStyle::is_visible);
        visible.then_some(region)
    }

    /// The node painted at a screen cell in the last frame.
    pub fn get_widget_at(&self, x: i32, y: i32) -> Option<NodeId> {
        self.spatial.node_at(Offset::new(x, y))
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn render_tree(&self) -> &RenderTree {
        &self.render_tree
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.engine.cache().stats()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    // -----------------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------------

    pub fn scroll_state(&self, container: NodeId) -> Option<&ScrollState> {
        self.scroll.get(container)
    }

    /// Scroll a scrollable container. Returns `true` if the offset changed.
    pub fn scroll_to(&mut self, container: NodeId, x: i32, y: i32) -> bool {
        let moved = self.scroll.get_mut(container).is_some_and(|state| state.scroll_to(x, y));
        if moved {
            self.request_frame();
        }
        moved
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    /// Ask for a frame. Several requests before the next frame collapse
    /// into one.
    pub fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    pub fn needs_frame(&self) -> bool {
        self.frame_requested || self.dom.has_pending()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let size = Size::new(i32::from(width), i32::from(height));
        if size == self.size {
            return;
        }
        debug!(width, height, "screen resized");
        self.size = size;
        self.compositor.resize(size);
        self.renderer.resize(size);
        self.request_frame();
    }

    /// Force every row to be rewritten at the next frame.
    pub fn refresh(&mut self) {
        self.renderer.invalidate();
        self.request_frame();
    }

    /// Bring styles and layout up to date, then draw the difference from the
    /// previous frame to `sink`.
    pub fn render_frame(&mut self, sink: &mut dyn RenderSink) -> Result<FrameStats, RenderError> {
        let pending = self.dom.take_pending();
        self.restyle(&pending);
        for &(node, kind) in &pending {
            if kind == DirtyKind::Content {
                self.renderer.repaint(node);
                self.invalidate_layout(node);
            }
        }

        self.reflow();
        self.render_tree = self.compositor.compose(&self.layout, &self.styles);
        self.spatial.update(self.render_tree.chips().iter().map(|chip| (chip.node, chip.paint)), self.size);

        let content = DomContent::new(&self.dom, &self.styles);
        let stats = self.renderer.render_frame(&self.render_tree, &content, sink)?;

        self.dom.clear_dirty_flags();
        self.frame_requested = false;
        Ok(stats)
    }

    fn reflow(&mut self) {
        let scroll = &self.scroll;
        self.layout = self.engine.reflow(&self.dom, &self.styles, self.size, |node| {
            scroll.get(node).map_or(Offset::ZERO, ScrollState::offset)
        });

        let mut clamped = false;
        for &node in self.layout.order() {
            let scrollable = self.styles.get(node).is_some_and(ResolvedStyle::is_scrollable);
            let (Some(arrangement), Some(viewport)) = (self.layout.arrangement(node), self.layout.content_region(node))
            else {
                continue;
            };
            if !scrollable {
                continue;
            }
            let state = match self.scroll.get_mut(node) {
                Some(state) => state,
                None => {
                    self.scroll.insert(node, ScrollState::new(arrangement.virtual_size, viewport.size()));
                    continue;
                }
            };
            clamped |= state.set_sizes(arrangement.virtual_size, viewport.size());
        }

        // A container that shrank may have pulled its offset back.
        if clamped {
            trace!("scroll offsets clamped, reflowing");
            let scroll = &self.scroll;
            self.layout = self.engine.reflow(&self.dom, &self.styles, self.size, |node| {
                scroll.get(node).map_or(Offset::ZERO, ScrollState::offset)
            });
        }
    }

    /// Re-run the cascade for every style-dirty subtree, for nodes that have
    /// never been styled, or for everything after a stylesheet change.
    fn restyle(&mut self, pending: &[(NodeId, DirtyKind)]) {
        let Some(root) = self.dom.root() else {
            return;
        };
        let mut starts: Vec<NodeId> = if std::mem::take(&mut self.restyle_all) {
            vec![root]
        } else {
            pending
                .iter()
                .filter(|(node, kind)| *kind == DirtyKind::Style || !self.styles.contains_key(*node))
                .map(|(node, _)| *node)
                .collect()
        };
        // Parents before children, so inherited values are never stale.
        starts.sort_by_cached_key(|node| self.dom.ancestors(*node).len());

        let mut visited = HashSet::new();
        let mut changed = Vec::new();
        for start in starts {
            if visited.contains(&start) {
                continue;
            }
            for node in self.dom.walk_depth_first(start) {
                if !visited.insert(node) {
                    continue;
                }
                let resolved = {
                    let ancestors = self.dom.ancestors(node);
                    let parent_style = self.dom.parent(node).and_then(|parent| self.styles.get(parent));
                    self.resolver.resolve(node, &ancestors, &self.dom, parent_style)
                };
                if self.styles.get(node) != Some(&resolved) {
                    self.styles.insert(node, resolved);
                    changed.push(node);
                }
            }
        }

        trace!(restyled = visited.len(), changed = changed.len(), "cascade");
        for node in changed {
            self.dom.bump_style_version(node);
            self.renderer.repaint(node);
            self.invalidate_layout(node);
        }
    }

    /// Make the arrangements that may depend on `node` bypass the cache:
    /// its own, its parent's, and further ancestors while the one below
    /// them is measured from its content.
    fn invalidate_layout(&mut self, node: NodeId) {
        self.dom.mark_layout_dirty(node);
        let mut current = node;
        while let Some(parent) = self.dom.parent(current) {
            self.dom.mark_layout_dirty(parent);
            if !is_content_sized(&self.dom, &self.styles, parent) {
                break;
            }
            current = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;
    use crate::widgets::{Container, Static};
    use pretty_assertions::assert_eq;

    fn screen(css: &str) -> Screen {
        let config = AppConfig::new().with_css(css);
        Screen::with_config(20, 6, &config).expect("valid css")
    }

    #[test]
    fn first_frame_lays_out_and_draws() {
        let mut screen = screen("#title { height: 1; }");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let title = screen.mount(Some(root), NodeData::new("Static").with_id("title"), Static::new("Hello")).expect("mount");
        let mut sink = MemorySink::new(20, 6);

        assert!(screen.needs_frame());
        let stats = screen.render_frame(&mut sink).expect("render");
        assert!(!screen.needs_frame());
        assert_eq!(stats.rows_rendered, 6);
        assert_eq!(screen.get_region(title), Some(Region::new(0, 0, 20, 1)));
        assert_eq!(sink.lines()[0], "Hello               ");
        assert_eq!(screen.get_widget_at(2, 0), Some(title));
        assert_eq!(screen.get_widget_at(2, 3), Some(root));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut screen = screen("");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        screen.mount(Some(root), NodeData::new("Static"), Static::new("x")).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");
        let stats = screen.render_frame(&mut sink).expect("render");
        assert_eq!(stats.writes, 0);
        assert_eq!(stats.rows_skipped, 6);
    }

    #[test]
    fn content_change_resizes_auto_widget() {
        let mut screen = screen("Static { width: auto; }");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let label = screen.mount(Some(root), NodeData::new("Static"), Static::new("ab")).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(label), Some(Region::new(0, 0, 2, 1)));

        assert!(screen.update_widget::<Static>(label, |label| label.set_text("abcdef\nxyz")));
        assert!(!screen.update_widget::<Container>(label, |_| ()));
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(label), Some(Region::new(0, 0, 6, 2)));
        assert_eq!(sink.lines()[1], "xyz                 ");
    }

    #[test]
    fn class_change_restyles_and_invalidates() {
        let mut screen = screen(".tall { height: 3; }");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let first = screen.mount(Some(root), NodeData::new("Static"), Static::new("a")).expect("mount");
        let second = screen.mount(Some(root), NodeData::new("Static"), Static::new("b")).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(second).map(|r| r.y), Some(1));

        screen.dom_mut().add_class(first, "tall").expect("node exists");
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(first).map(|r| r.height), Some(3));
        assert_eq!(screen.get_region(second).map(|r| r.y), Some(3));
        let arrangement = screen.get_arrangement(root).expect("root arranged");
        assert_eq!(arrangement.region(second).map(|r| r.y), Some(3));
    }

    #[test]
    fn hidden_nodes_have_no_region() {
        let mut screen = screen("#gone { visibility: hidden; } #none { display: none; }");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let hidden = screen.mount(Some(root), NodeData::new("Static").with_id("gone"), Static::new("a")).expect("mount");
        let removed = screen.mount(Some(root), NodeData::new("Static").with_id("none"), Static::new("b")).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(hidden), None);
        assert_eq!(screen.get_region(removed), None);
        assert!(screen.layout().get(hidden).is_some());
    }

    #[test]
    fn resize_redraws_everything() {
        let mut screen = screen("");
        screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");
        screen.resize(10, 3);
        assert!(screen.needs_frame());
        let mut sink = MemorySink::new(10, 3);
        let stats = screen.render_frame(&mut sink).expect("render");
        assert_eq!(stats.writes, 3);
        assert_eq!(screen.render_tree().size(), Size::new(10, 3));
    }

    #[test]
    fn scrolling_moves_children_but_not_docks() {
        let css = "#list { height: 4; overflow-y: scroll; } #list #bar { dock: top; height: 1; } #list Static { height: 2; }";
        let mut screen = screen(css);
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let list = screen.mount(Some(root), NodeData::new("Container").with_id("list"), Container::new()).expect("mount");
        let bar = screen.mount(Some(list), NodeData::new("Static").with_id("bar"), Static::new("bar")).expect("mount");
        let items: Vec<NodeId> = (0..4)
            .map(|i| screen.mount(Some(list), NodeData::new("Static"), Static::new(format!("item {i}"))).expect("mount"))
            .collect();
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");

        let state = screen.scroll_state(list).expect("scrollable");
        assert_eq!(state.viewport_size(), Size::new(20, 4));
        assert_eq!(state.virtual_size().height, 9);

        assert!(screen.scroll_to(list, 0, 2));
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(bar).map(|r| r.y), Some(0));
        assert_eq!(screen.get_region(items[1]).map(|r| r.y), Some(1));
        assert!(!screen.scroll_to(list, 0, 2));
    }

    #[test]
    fn remove_drops_the_subtree() {
        let mut screen = screen("");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let panel = screen.mount(Some(root), NodeData::new("Container"), Container::new()).expect("mount");
        let child = screen.mount(Some(panel), NodeData::new("Static"), Static::new("x")).expect("mount");
        let mut sink = MemorySink::new(20, 6);
        screen.render_frame(&mut sink).expect("render");

        screen.remove(panel).expect("remove");
        screen.render_frame(&mut sink).expect("render");
        assert_eq!(screen.get_region(child), None);
        assert!(screen.style(child).is_none());
        assert!(matches!(screen.remove(panel), Err(ScreenError::Dom(DomError::NodeNotFound(_)))));
    }

    #[test]
    fn second_root_is_refused() {
        let mut screen = screen("");
        let root = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        let child = screen.mount(Some(root), NodeData::new("Static"), Static::new("x")).expect("mount");
        let result = screen.mount(None, NodeData::new("Screen"), Container::new());
        assert!(matches!(result, Err(ScreenError::RootExists)));
        assert_eq!(screen.dom().root(), Some(root));
        assert_eq!(screen.dom().len(), 2);
        assert_eq!(screen.dom().parent(child), Some(root));

        screen.remove(root).expect("remove");
        let replacement = screen.mount(None, NodeData::new("Screen"), Container::new()).expect("mount");
        assert_eq!(screen.dom().root(), Some(replacement));
        assert_eq!(screen.dom().len(), 1);
    }

    #[test]
    fn bad_css_is_an_error() {
        let config = AppConfig::new().with_css("Static {");
        assert!(matches!(Screen::with_config(10, 10, &config), Err(ScreenError::Css(_))));
    }
}
