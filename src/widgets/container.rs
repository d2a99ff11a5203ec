//! Container widget: a node whose size and content come from its children.
//!
//! It paints nothing but its background; the engine draws its border and
//! arranges the children per its `layout` property.

use std::any::Any;

use crate::widget::Widget;

#[derive(Debug, Default)]
pub struct Container;

impl Container {
    pub fn new() -> Self {
        Self
    }
}

impl Widget for Container {
    fn widget_type(&self) -> &str {
        "Container"
    }

    fn default_css(&self) -> &str {
        "Container { overflow-y: auto; }"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_css;
    use crate::geometry::Size;
    use crate::render::strip::CellStyle;

    #[test]
    fn measures_nothing_and_paints_background() {
        let container = Container::new();
        assert_eq!(container.measure(Size::new(10, 10)), Size::ZERO);
        let strip = container.render_strip(0, 3, &CellStyle::default());
        assert_eq!(strip.text(), "   ");
    }

    #[test]
    fn default_css_parses() {
        let sheet = parse_css(Container.default_css());
        assert!(sheet.is_ok());
    }
}
