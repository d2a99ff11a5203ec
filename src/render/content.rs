//! Content sources: where the renderer gets the cells of a node's line.
//!
//! [`DomContent`] draws the box decoration itself (border glyphs, padding and
//! background) and asks the node's widget only for the rows of its content
//! box.

use slotmap::SecondaryMap;

use crate::css::styles::{BorderKind, ResolvedStyle, TextAlign};
use crate::dom::{Dom, NodeId};
use crate::geometry::Size;

use super::strip::{CellStyle, Strip};

/// Produces one line of a node at a time.
pub trait ContentSource {
    /// Row `y` of `node`, whose border box is `size`. The strip should be
    /// `size.width` cells wide; the renderer pads or truncates it anyway.
    fn render_line(&self, node: NodeId, y: i32, size: Size) -> Strip;
}

// ---------------------------------------------------------------------------
// Border glyphs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BoxGlyphs {
    const fn new(corners: [char; 4], horizontal: char, vertical: char) -> Self {
        let [top_left, top_right, bottom_left, bottom_right] = corners;
        Self { top_left, top_right, bottom_left, bottom_right, horizontal, vertical }
    }

    /// Glyphs for a border kind, `None` for no border.
    pub fn for_kind(kind: BorderKind) -> Option<Self> {
        match kind {
            BorderKind::None => None,
            BorderKind::Ascii => Some(Self::new(['+', '+', '+', '+'], '-', '|')),
            BorderKind::Round => Some(Self::new(['╭', '╮', '╰', '╯'], '─', '│')),
            BorderKind::Solid => Some(Self::new(['┌', '┐', '└', '┘'], '─', '│')),
            BorderKind::Heavy => Some(Self::new(['┏', '┓', '┗', '┛'], '━', '┃')),
            BorderKind::Double => Some(Self::new(['╔', '╗', '╚', '╝'], '═', '║')),
        }
    }

    fn edge(&self, left: char, right: char, width: i32, style: &CellStyle) -> Strip {
        let mut strip = Strip::new();
        if width <= 0 {
            return strip;
        }
        strip.push(left, style.clone());
        for _ in 2..width {
            strip.push(self.horizontal, style.clone());
        }
        if width > 1 {
            strip.push(right, style.clone());
        }
        strip
    }
}

// ---------------------------------------------------------------------------
// DomContent
// ---------------------------------------------------------------------------

/// Renders nodes from the DOM with their resolved styles.
pub struct DomContent<'a> {
    dom: &'a Dom,
    styles: &'a SecondaryMap<NodeId, ResolvedStyle>,
    fallback: ResolvedStyle,
}

impl<'a> DomContent<'a> {
    pub fn new(dom: &'a Dom, styles: &'a SecondaryMap<NodeId, ResolvedStyle>) -> Self {
        Self { dom, styles, fallback: ResolvedStyle::default() }
    }

    fn style(&self, node: NodeId) -> &ResolvedStyle {
        self.styles.get(node).unwrap_or(&self.fallback)
    }
}

impl ContentSource for DomContent<'_> {
    fn render_line(&self, node: NodeId, y: i32, size: Size) -> Strip {
        let style = self.style(node);
        let base = CellStyle::from_resolved(style);
        let glyphs = BoxGlyphs::for_kind(style.border.kind);
        let border_style = base.with_fg(style.border.color.as_deref());

        if let Some(glyphs) = glyphs {
            if y == 0 {
                return glyphs.edge(glyphs.top_left, glyphs.top_right, size.width, &border_style);
            }
            if y == size.height - 1 {
                return glyphs.edge(glyphs.bottom_left, glyphs.bottom_right, size.width, &border_style);
            }
        }

        let gutter = style.gutter();
        let content_size = Size::new(size.width - gutter.width(), size.height - gutter.height()).clamp_non_negative();
        let content_y = y - gutter.top;

        let mut line = Strip::new();
        if let Some(glyphs) = glyphs {
            line.push(glyphs.vertical, border_style.clone());
        }
        line.extend(Strip::blank(style.padding.left, base.clone()));

        let content = if (0..content_size.height).contains(&content_y) {
            match self.dom.widget(node) {
                Some(widget) => widget.render_strip(content_y, content_size.width, &base),
                None => Strip::blank(content_size.width, base.clone()),
            }
        } else {
            Strip::blank(content_size.width, base.clone())
        };
        line.extend(align(content, content_size.width, style.text_align, &base));

        line.extend(Strip::blank(style.padding.right, base.clone()));
        if let Some(glyphs) = glyphs {
            if size.width > 1 {
                line.push(glyphs.vertical, border_style);
            }
        }
        line.fill(size.width, base);
        line
    }
}

/// Pad a widget line out to `width` according to `text-align`, or
/// truncate it if it is too long.
fn align(mut content: Strip, width: i32, text_align: TextAlign, style: &CellStyle) -> Strip {
    let spare = width - content.width();
    if spare <= 0 {
        content.fill(width, style.clone());
        return content;
    }
    let leading = match text_align {
        TextAlign::Left => 0,
        TextAlign::Center => spare / 2,
        TextAlign::Right => spare,
    };
    let mut aligned = Strip::blank(leading, style.clone());
    aligned.extend(content);
    aligned.fill(width, style.clone());
    aligned
}
