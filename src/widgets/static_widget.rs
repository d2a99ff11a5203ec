//! Static widget: text that only changes when the application says so.
//!
//! Lines are split on `'\n'` and never wrapped. The measured size is the
//! widest line by display width, times the number of lines, so an
//! `auto`-sized `Static` hugs its text.

use std::any::Any;

use unicode_width::UnicodeWidthStr;

use crate::geometry::Size;
use crate::render::strip::{CellStyle, Strip};
use crate::widget::Widget;

pub struct Static {
    text: String,
}

impl Static {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. The caller marks the node content-dirty.
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split('\n')
    }
}

impl Widget for Static {
    fn widget_type(&self) -> &str {
        "Static"
    }

    fn default_css(&self) -> &str {
        "Static { height: auto; }"
    }

    fn measure(&self, _available: Size) -> Size {
        if self.text.is_empty() {
            return Size::ZERO;
        }
        let width = self.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let height = self.lines().count();
        Size::new(i32::try_from(width).unwrap_or(i32::MAX), i32::try_from(height).unwrap_or(i32::MAX))
    }

    /// The line at `y`, unpadded. Text alignment is applied by the caller.
    fn render_strip(&self, y: i32, width: i32, style: &CellStyle) -> Strip {
        let mut strip = Strip::new();
        let line = usize::try_from(y).ok().and_then(|y| self.lines().nth(y));
        if let Some(line) = line {
            strip.push_str(line, style.clone());
            if strip.width() > width {
                strip.fill(width, style.clone());
            }
        }
        strip
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
