//! The node arena: structure, widgets, and the dirty queue.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{DirtyFlags, DirtyKind, NodeData, NodeId, PseudoState};
use crate::css::styles::Styles;
use crate::widget::Widget;

const NO_CHILDREN: &[NodeId] = &[];

/// Structural errors. The tree is left unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),
    #[error("moving {node:?} under {parent:?} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },
}

/// Widget tree stored as a slotmap arena.
///
/// Children are ordered id lists, so restructuring is list splicing. Every
/// mutation that can change styling or geometry records a dirty entry which
/// the screen drains at the next frame.
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    widgets: SecondaryMap<NodeId, Box<dyn Widget>>,
    root: Option<NodeId>,
    pending: Vec<(NodeId, DirtyKind)>,
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            widgets: SecondaryMap::new(),
            root: None,
            pending: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Insert a detached node. The first detached node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        self.pending.push((id, DirtyKind::Style));
        id
    }

    /// Append a new node to `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, DomError> {
        let index = self.children(parent).len();
        self.insert_child_at(parent, index, data)
    }

    /// Insert a new node at `index` among `parent`'s children (clamped to
    /// the end).
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        data: NodeData,
    ) -> Result<NodeId, DomError> {
        if !self.nodes.contains_key(parent) {
            return Err(DomError::NodeNotFound(parent));
        }
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.attach(id, parent, index);
        self.pending.push((id, DirtyKind::Content));
        Ok(id)
    }

    /// Remove a node and its whole subtree, returning the node's data.
    pub fn remove(&mut self, id: NodeId) -> Result<NodeData, DomError> {
        if !self.nodes.contains_key(id) {
            return Err(DomError::NodeNotFound(id));
        }
        if let Some(parent) = self.detach(id) {
            self.pending.push((parent, DirtyKind::Content));
        }
        if self.root == Some(id) {
            self.root = None;
        }
        for descendant in self.walk_depth_first(id).into_iter().skip(1) {
            self.children.remove(descendant);
            self.parent.remove(descendant);
            self.widgets.remove(descendant);
            self.nodes.remove(descendant);
        }
        self.children.remove(id);
        self.widgets.remove(id);
        self.nodes.remove(id).ok_or(DomError::NodeNotFound(id))
    }

    /// Move `node` (with its subtree) to the end of `new_parent`'s children.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), DomError> {
        for id in [node, new_parent] {
            if !self.nodes.contains_key(id) {
                return Err(DomError::NodeNotFound(id));
            }
        }
        if node == new_parent || self.ancestors(new_parent).contains(&node) {
            return Err(DomError::Cycle { node, parent: new_parent });
        }
        if let Some(old_parent) = self.detach(node) {
            self.pending.push((old_parent, DirtyKind::Content));
        }
        if self.root == Some(node) {
            self.root = None;
        }
        let index = self.children(new_parent).len();
        self.attach(node, new_parent, index);
        self.pending.push((node, DirtyKind::Content));
        Ok(())
    }

    /// Move `node` to position `index` among its current siblings.
    pub fn move_to(&mut self, node: NodeId, index: usize) -> Result<(), DomError> {
        let parent = self.parent(node).ok_or(DomError::NodeNotFound(node))?;
        self.detach(node);
        self.attach(node, parent, index);
        self.pending.push((node, DirtyKind::Content));
        Ok(())
    }

    fn attach(&mut self, node: NodeId, parent: NodeId, index: usize) {
        self.parent.insert(node, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, node);
        }
        // Structural pseudo-classes of every sibling may change.
        self.pending.push((parent, DirtyKind::Style));
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent.remove(node)?;
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&child| child != node);
        }
        self.pending.push((parent, DirtyKind::Style));
        Some(parent)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map_or(NO_CHILDREN, Vec::as_slice)
    }

    /// Parent first, root last.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// `(index, sibling_count)` of a node among its parent's children. A
    /// parentless node is the only child of nothing: `(0, 1)`.
    pub fn sibling_position(&self, id: NodeId) -> (usize, usize) {
        match self.parent(id) {
            Some(parent) => {
                let siblings = self.children(parent);
                let index = siblings.iter().position(|&s| s == id).unwrap_or(0);
                (index, siblings.len())
            }
            None => (0, 1),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Raw mutable access. Changes made here are not tracked; follow up
    /// with [`mark_dirty`](Self::mark_dirty).
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
        self.pending.push((id, DirtyKind::Style));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }

    /// Pre-order traversal of the subtree rooted at `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    // -----------------------------------------------------------------------
    // Widgets
    // -----------------------------------------------------------------------

    /// Attach the content source for a node, replacing any previous one.
    pub fn set_widget(&mut self, id: NodeId, widget: Box<dyn Widget>) -> Result<(), DomError> {
        if !self.nodes.contains_key(id) {
            return Err(DomError::NodeNotFound(id));
        }
        self.widgets.insert(id, widget);
        self.mark_dirty(id, DirtyKind::Content);
        Ok(())
    }

    pub fn widget(&self, id: NodeId) -> Option<&dyn Widget> {
        self.widgets.get(id).map(|widget| &**widget)
    }

    /// Mutable widget access; the caller reports the change with
    /// [`mark_dirty`](Self::mark_dirty).
    pub fn widget_mut(&mut self, id: NodeId) -> Option<&mut (dyn Widget + 'static)> {
        self.widgets.get_mut(id).map(|widget| &mut **widget)
    }

    // -----------------------------------------------------------------------
    // Style-affecting mutations
    // -----------------------------------------------------------------------

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        if node.add_class(class) {
            self.mark_dirty(id, DirtyKind::Style);
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        if node.remove_class(class) {
            self.mark_dirty(id, DirtyKind::Style);
        }
        Ok(())
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        if !node.remove_class(class) {
            node.add_class(class);
        }
        self.mark_dirty(id, DirtyKind::Style);
        Ok(())
    }

    pub fn set_inline_style(&mut self, id: NodeId, styles: Styles) -> Result<(), DomError> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        if node.inline != styles {
            node.inline = styles;
            self.mark_dirty(id, DirtyKind::Style);
        }
        Ok(())
    }

    /// Set an interactive state. Focus changes also restyle every ancestor,
    /// since their `:focus-within` may flip.
    pub fn set_state(&mut self, id: NodeId, state: PseudoState, on: bool) -> Result<(), DomError> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        if !node.set_state(state, on) {
            return Ok(());
        }
        if state == PseudoState::Focus {
            for ancestor in self.ancestors(id).into_iter().rev() {
                self.mark_dirty(ancestor, DirtyKind::Style);
            }
        }
        self.mark_dirty(id, DirtyKind::Style);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dirty tracking
    // -----------------------------------------------------------------------

    /// Record that `id` changed. Unknown ids are ignored.
    pub fn mark_dirty(&mut self, id: NodeId, kind: DirtyKind) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.dirty |= match kind {
                DirtyKind::Style => DirtyFlags::STYLE,
                DirtyKind::Content => DirtyFlags::CONTENT,
            };
            self.pending.push((id, kind));
        }
    }

    /// Force the next arrangement of `id` to bypass the cache.
    pub(crate) fn mark_layout_dirty(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.dirty |= DirtyFlags::LAYOUT;
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain recorded changes, dropping entries for nodes removed since.
    pub(crate) fn take_pending(&mut self) -> Vec<(NodeId, DirtyKind)> {
        let mut pending = std::mem::take(&mut self.pending);
        pending.retain(|(id, _)| self.nodes.contains_key(*id));
        pending
    }

    pub(crate) fn bump_style_version(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.style_version += 1;
        }
    }

    /// Reset every node's flags after a frame has been produced.
    pub(crate) fn clear_dirty_flags(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.dirty = DirtyFlags::empty();
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    ///       root
    ///      /    \
    ///     a      b
    ///    / \
    ///   c   d
    fn build_tree() -> (Dom, [NodeId; 5]) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let a = dom.insert_child(root, NodeData::new("Container").with_id("a")).unwrap();
        let b = dom.insert_child(root, NodeData::new("Container").with_id("b")).unwrap();
        let c = dom.insert_child(a, NodeData::new("Static")).unwrap();
        let d = dom.insert_child(a, NodeData::new("Static")).unwrap();
        (dom, [root, a, b, c, d])
    }

    #[test]
    fn first_insert_becomes_root() {
        let (dom, [root, ..]) = build_tree();
        assert_eq!(dom.root(), Some(root));
        assert_eq!(dom.len(), 5);
    }

    #[test]
    fn insert_child_at_clamps_index() {
        let (mut dom, [root, a, b, ..]) = build_tree();
        let first = dom.insert_child_at(root, 0, NodeData::new("Static")).unwrap();
        let last = dom.insert_child_at(root, 99, NodeData::new("Static")).unwrap();
        assert_eq!(dom.children(root), &[first, a, b, last]);
    }

    #[test]
    fn insert_under_missing_parent_fails() {
        let (mut dom, [_, a, ..]) = build_tree();
        dom.remove(a).unwrap();
        assert_eq!(dom.insert_child(a, NodeData::new("Static")), Err(DomError::NodeNotFound(a)));
    }

    #[test]
    fn remove_takes_subtree() {
        let (mut dom, [root, a, b, c, d]) = build_tree();
        let data = dom.remove(a).unwrap();
        assert_eq!(data.id.as_deref(), Some("a"));
        assert!(!dom.contains(c) && !dom.contains(d));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let (mut dom, [root, a, b, c, _]) = build_tree();
        assert_eq!(dom.reparent(a, c), Err(DomError::Cycle { node: a, parent: c }));
        assert_eq!(dom.reparent(a, a), Err(DomError::Cycle { node: a, parent: a }));
        dom.reparent(c, b).unwrap();
        assert_eq!(dom.parent(c), Some(b));
        assert_eq!(dom.ancestors(c), vec![b, root]);
    }

    #[test]
    fn move_to_reorders_siblings() {
        let (mut dom, [root, a, b, ..]) = build_tree();
        dom.move_to(b, 0).unwrap();
        assert_eq!(dom.children(root), &[b, a]);
        assert_eq!(dom.sibling_position(a), (1, 2));
    }

    #[test]
    fn depth_first_order() {
        let (dom, [root, a, b, c, d]) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
    }

    #[test]
    fn class_changes_queue_style_dirt() {
        let (mut dom, [_, a, ..]) = build_tree();
        dom.take_pending();
        dom.add_class(a, "x").unwrap();
        dom.add_class(a, "x").unwrap();
        assert_eq!(dom.take_pending(), vec![(a, DirtyKind::Style)]);
        assert!(dom.get(a).unwrap().dirty().contains(DirtyFlags::STYLE));
    }

    #[test]
    fn focus_restyles_ancestors_outermost_first() {
        let (mut dom, [root, a, _, c, _]) = build_tree();
        dom.take_pending();
        dom.set_state(c, PseudoState::Hover, true).unwrap();
        assert_eq!(dom.take_pending(), vec![(c, DirtyKind::Style)]);

        dom.set_state(c, PseudoState::Focus, true).unwrap();
        assert_eq!(
            dom.take_pending(),
            vec![(root, DirtyKind::Style), (a, DirtyKind::Style), (c, DirtyKind::Style)]
        );
        dom.set_state(c, PseudoState::Focus, true).unwrap();
        assert!(dom.take_pending().is_empty());
    }

    #[test]
    fn pending_skips_removed_nodes() {
        let (mut dom, [root, a, _, c, _]) = build_tree();
        dom.take_pending();
        dom.mark_dirty(c, DirtyKind::Content);
        dom.remove(a).unwrap();
        let pending = dom.take_pending();
        assert!(pending.iter().all(|(id, _)| *id == root));
    }

    #[test]
    fn clear_flags() {
        let (mut dom, [root, ..]) = build_tree();
        dom.mark_layout_dirty(root);
        dom.clear_dirty_flags();
        assert!(dom.get(root).unwrap().dirty().is_empty());
    }
}
