//! Node types: NodeId, NodeData, dirty bookkeeping.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::css::styles::Styles;

new_key_type! {
    /// Stable handle to a node in the [`Dom`](super::Dom) arena.
    pub struct NodeId;
}

bitflags! {
    /// Invalidation state of one node since the last frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DirtyFlags: u8 {
        /// Selectors may match differently; re-run the cascade for the subtree.
        const STYLE = 1;
        /// Content changed; re-measure and repaint.
        const CONTENT = 1 << 1;
        /// This container must be re-arranged without consulting the cache.
        const LAYOUT = 1 << 2;
    }
}

/// What kind of change a caller is reporting through `mark_dirty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyKind {
    Style,
    Content,
}

/// Interactive states matched by `:hover`, `:focus` and `:disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoState {
    Hover,
    Focus,
    Disabled,
}

/// Everything the cascade needs to know about one node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Widget type name, matched by type selectors.
    pub widget_type: String,
    /// Matched by `#id`.
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Inline style, applied above every normal rule.
    pub inline: Styles,
    pub hover: bool,
    pub focus: bool,
    pub disabled: bool,
    pub(crate) style_version: u64,
    pub(crate) dirty: DirtyFlags,
}

impl NodeData {
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            id: None,
            classes: Vec::new(),
            inline: Styles::new(),
            hover: false,
            focus: false,
            disabled: false,
            style_version: 0,
            dirty: DirtyFlags::STYLE | DirtyFlags::CONTENT,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            self.add_class(&class.into());
        }
        self
    }

    pub fn with_inline(mut self, styles: Styles) -> Self {
        self.inline = styles;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Returns `true` if the class was not present.
    pub(crate) fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_owned());
        true
    }

    /// Returns `true` if the class was present.
    pub(crate) fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    pub fn state(&self, state: PseudoState) -> bool {
        match state {
            PseudoState::Hover => self.hover,
            PseudoState::Focus => self.focus,
            PseudoState::Disabled => self.disabled,
        }
    }

    pub(crate) fn set_state(&mut self, state: PseudoState, on: bool) -> bool {
        let slot = match state {
            PseudoState::Hover => &mut self.hover,
            PseudoState::Focus => &mut self.focus,
            PseudoState::Disabled => &mut self.disabled,
        };
        let changed = *slot != on;
        *slot = on;
        changed
    }

    /// Bumped whenever the node's resolved style actually changes.
    pub fn style_version(&self) -> u64 {
        self.style_version
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }
}
