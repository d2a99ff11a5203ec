//! Widget trait: the capability interface the engine needs from content.
//!
//! Layout asks a widget how big its content is ([`Widget::measure`]) and the
//! renderer asks it for one line at a time ([`Widget::render_strip`]). Box
//! decoration (border, padding, background) is drawn by the engine around
//! whatever the widget returns, so widgets only ever see their content box.

use std::any::Any;

use crate::geometry::Size;
use crate::render::strip::{CellStyle, Strip};

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Content attached to a DOM node.
///
/// Object-safe; the DOM stores widgets as `Box<dyn Widget>`.
pub trait Widget {
    /// The CSS type name for this widget (e.g. "Static", "Container").
    fn widget_type(&self) -> &str;

    /// Default CSS for this widget type, applied at the lowest priority.
    ///
    /// Registered once per widget type when the first instance is mounted.
    fn default_css(&self) -> &str {
        ""
    }

    /// Natural size of the content box when given `available` cells.
    ///
    /// Only consulted for `auto` dimensions. Containers whose size comes
    /// from their children return [`Size::ZERO`].
    fn measure(&self, _available: Size) -> Size {
        Size::ZERO
    }

    /// Line `y` of the content box, `width` cells wide.
    ///
    /// `style` is the node's resolved cell style. The result may be shorter
    /// or longer than `width`; the caller pads or truncates it.
    fn render_strip(&self, y: i32, width: i32, style: &CellStyle) -> Strip {
        let _ = y;
        Strip::blank(width, style.clone())
    }

    /// Downcast to `&dyn Any` for runtime type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any` for mutable runtime type inspection.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn Widget + 'a {
    /// The concrete widget, if it is a `W`.
    pub fn downcast_ref<W: Widget + 'static>(&self) -> Option<&W> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<W: Widget + 'static>(&mut self) -> Option<&mut W> {
        self.as_any_mut().downcast_mut()
    }
}
