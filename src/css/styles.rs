//! Style values: the sparse [`Styles`] accumulator built during the cascade
//! and the fully populated [`ResolvedStyle`] handed to layout and rendering.
//!
//! `Styles` has one `Option<T>` per property; `None` means the cascade never
//! set it. [`ResolvedStyle::from_cascade`] fills the gaps from the default
//! table, except for the few properties on the inheritance allow-list
//! (`color`, `text-style`, `text-align`) which come from the parent.

use crate::css::scalar::Scalar;
use crate::geometry::Spacing;

// ---------------------------------------------------------------------------
// Enumerated property values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Hidden,
    Scroll,
    Auto,
}

/// Which arrangement procedure a container uses for its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Vertical,
    Horizontal,
    Grid,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dock {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignHorizontal {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignVertical {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    None,
    Ascii,
    Round,
    Solid,
    Heavy,
    Double,
}

/// A one-cell border drawn on all four edges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Border {
    pub kind: BorderKind,
    pub color: Option<String>,
}

impl Border {
    /// Cells taken by the border on each edge.
    pub fn thickness(&self) -> Spacing {
        match self.kind {
            BorderKind::None => Spacing::ZERO,
            _ => Spacing::all(1),
        }
    }
}

/// Text attributes from `text-style`. The property replaces the whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub reverse: bool,
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

macro_rules! styles_struct {
    ($( $(#[$meta:meta])* $field:ident : $ty:ty ),* $(,)?) => {
        /// Sparse property set: what one rule (or the whole cascade so far)
        /// declares for a node.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Styles {
            $( $(#[$meta])* pub $field: Option<$ty>, )*
        }

        impl Styles {
            /// Copy every property `other` sets onto `self`.
            pub fn overlay(&mut self, other: &Styles) {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field.clone();
                    }
                )*
            }

            /// `true` if no property is set.
            pub fn is_empty(&self) -> bool {
                true $( && self.$field.is_none() )*
            }

            /// Number of properties set.
            pub fn len(&self) -> usize {
                0 $( + usize::from(self.$field.is_some()) )*
            }
        }
    };
}

styles_struct! {
    display: Display,
    visibility: Visibility,
    layout: LayoutMode,
    dock: Dock,
    position: Position,
    offset_x: Scalar,
    offset_y: Scalar,
    overflow_x: Overflow,
    overflow_y: Overflow,

    width: Scalar,
    height: Scalar,
    min_width: Scalar,
    min_height: Scalar,
    max_width: Scalar,
    max_height: Scalar,

    margin: Spacing,
    padding: Spacing,
    border: Border,

    align_horizontal: AlignHorizontal,
    align_vertical: AlignVertical,

    layer: String,
    layers: Vec<String>,

    /// Column count from `grid-size`.
    grid_size_columns: i32,
    /// Row count from `grid-size`; zero means rows grow with content.
    grid_size_rows: i32,
    grid_columns: Vec<Scalar>,
    grid_rows: Vec<Scalar>,
    grid_gutter_horizontal: i32,
    grid_gutter_vertical: i32,
    column_span: i32,
    row_span: i32,

    color: String,
    background: String,
    text_align: TextAlign,
    text_style: TextStyle,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// `other` layered over a copy of `self`.
    pub fn merge(&self, other: &Styles) -> Styles {
        let mut merged = self.clone();
        merged.overlay(other);
        merged
    }
}

// ---------------------------------------------------------------------------
// ResolvedStyle
// ---------------------------------------------------------------------------

/// Grid parameters of a container.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStyle {
    pub columns: i32,
    /// `None` lets the grid add rows as children need them.
    pub rows: Option<i32>,
    pub column_tracks: Vec<Scalar>,
    pub row_tracks: Vec<Scalar>,
    /// Cells between columns.
    pub gutter_horizontal: i32,
    /// Rows between rows.
    pub gutter_vertical: i32,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            columns: 1,
            rows: None,
            column_tracks: Vec::new(),
            row_tracks: Vec::new(),
            gutter_horizontal: 0,
            gutter_vertical: 0,
        }
    }
}

/// Every property of one node after one cascade pass.
///
/// Never mutated once built; the cascade replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub layout: LayoutMode,
    pub dock: Option<Dock>,
    pub position: Position,
    pub offset_x: Option<Scalar>,
    pub offset_y: Option<Scalar>,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    /// `None` lets the layout pick: fill on the cross axis, `1fr` on the
    /// main axis.
    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,

    pub margin: Spacing,
    pub padding: Spacing,
    pub border: Border,

    pub align_horizontal: AlignHorizontal,
    pub align_vertical: AlignVertical,

    pub layer: Option<String>,
    pub layers: Vec<String>,

    pub grid: GridStyle,
    pub column_span: i32,
    pub row_span: i32,

    pub color: Option<String>,
    pub background: Option<String>,
    pub text_align: TextAlign,
    pub text_style: TextStyle,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self::from_cascade(&Styles::new(), None)
    }
}

impl ResolvedStyle {
    /// Fill every unset property of `styles` from the default table, or from
    /// `parent` for inherited properties.
    pub fn from_cascade(styles: &Styles, parent: Option<&ResolvedStyle>) -> Self {
        let inherited = |own: &Option<String>, pick: fn(&ResolvedStyle) -> Option<String>| {
            own.clone().or_else(|| parent.and_then(pick))
        };

        let grid = GridStyle {
            columns: styles.grid_size_columns.unwrap_or(1).max(1),
            rows: styles.grid_size_rows.filter(|rows| *rows > 0),
            column_tracks: styles.grid_columns.clone().unwrap_or_default(),
            row_tracks: styles.grid_rows.clone().unwrap_or_default(),
            gutter_horizontal: styles.grid_gutter_horizontal.unwrap_or(0).max(0),
            gutter_vertical: styles.grid_gutter_vertical.unwrap_or(0).max(0),
        };

        Self {
            display: styles.display.unwrap_or_default(),
            visibility: styles.visibility.unwrap_or_default(),
            layout: styles.layout.unwrap_or_default(),
            dock: styles.dock,
            position: styles.position.unwrap_or_default(),
            offset_x: styles.offset_x,
            offset_y: styles.offset_y,
            overflow_x: styles.overflow_x.unwrap_or_default(),
            overflow_y: styles.overflow_y.unwrap_or_default(),
            width: styles.width,
            height: styles.height,
            min_width: styles.min_width,
            min_height: styles.min_height,
            max_width: styles.max_width,
            max_height: styles.max_height,
            margin: styles.margin.unwrap_or_default().clamp_non_negative(),
            padding: styles.padding.unwrap_or_default().clamp_non_negative(),
            border: styles.border.clone().unwrap_or_default(),
            align_horizontal: styles.align_horizontal.unwrap_or_default(),
            align_vertical: styles.align_vertical.unwrap_or_default(),
            layer: styles.layer.clone(),
            layers: styles.layers.clone().unwrap_or_default(),
            grid,
            column_span: styles.column_span.unwrap_or(1).max(1),
            row_span: styles.row_span.unwrap_or(1).max(1),
            color: inherited(&styles.color, |p| p.color.clone()),
            background: styles.background.clone(),
            text_align: styles
                .text_align
                .or_else(|| parent.map(|p| p.text_align))
                .unwrap_or_default(),
            text_style: styles
                .text_style
                .or_else(|| parent.map(|p| p.text_style))
                .unwrap_or_default(),
        }
    }

    /// Padding plus border: the space between the region edge and content.
    pub fn gutter(&self) -> Spacing {
        self.padding + self.border.thickness()
    }

    pub fn is_displayed(&self) -> bool {
        self.display == Display::Block
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// `true` if children may be scrolled on either axis.
    pub fn is_scrollable(&self) -> bool {
        matches!(self.overflow_x, Overflow::Scroll | Overflow::Auto)
            || matches!(self.overflow_y, Overflow::Scroll | Overflow::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_styles() {
        let styles = Styles::new();
        assert!(styles.is_empty());
        assert_eq!(styles.len(), 0);
    }

    #[test]
    fn overlay_replaces_only_set_fields() {
        let mut base = Styles::new();
        base.color = Some("red".into());
        base.width = Some(Scalar::Cells(10.0));

        let mut top = Styles::new();
        top.color = Some("blue".into());
        top.dock = Some(Dock::Left);

        base.overlay(&top);
        assert_eq!(base.color.as_deref(), Some("blue"));
        assert_eq!(base.width, Some(Scalar::Cells(10.0)));
        assert_eq!(base.dock, Some(Dock::Left));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn merge_leaves_operands_untouched() {
        let mut a = Styles::new();
        a.layout = Some(LayoutMode::Grid);
        let mut b = Styles::new();
        b.layout = Some(LayoutMode::Horizontal);
        let merged = a.merge(&b);
        assert_eq!(merged.layout, Some(LayoutMode::Horizontal));
        assert_eq!(a.layout, Some(LayoutMode::Grid));
    }

    #[test]
    fn defaults_fill_unset_properties() {
        let style = ResolvedStyle::from_cascade(&Styles::new(), None);
        assert_eq!(style.layout, LayoutMode::Vertical);
        assert_eq!(style.position, Position::Relative);
        assert_eq!(style.margin, Spacing::ZERO);
        assert_eq!(style.grid.columns, 1);
        assert_eq!(style.column_span, 1);
        assert!(style.is_displayed());
        assert!(style.is_visible());
        assert_eq!(style.width, None);
    }

    #[test]
    fn only_allow_listed_properties_inherit() {
        let mut parent_styles = Styles::new();
        parent_styles.color = Some("green".into());
        parent_styles.background = Some("navy".into());
        parent_styles.layout = Some(LayoutMode::Horizontal);
        parent_styles.text_style = Some(TextStyle { bold: true, ..TextStyle::default() });
        let parent = ResolvedStyle::from_cascade(&parent_styles, None);

        let child = ResolvedStyle::from_cascade(&Styles::new(), Some(&parent));
        assert_eq!(child.color.as_deref(), Some("green"));
        assert!(child.text_style.bold);
        assert_eq!(child.background, None);
        assert_eq!(child.layout, LayoutMode::Vertical);
    }

    #[test]
    fn invalid_counts_are_clamped() {
        let mut styles = Styles::new();
        styles.column_span = Some(0);
        styles.grid_size_columns = Some(-2);
        styles.grid_size_rows = Some(0);
        let style = ResolvedStyle::from_cascade(&styles, None);
        assert_eq!(style.column_span, 1);
        assert_eq!(style.grid.columns, 1);
        assert_eq!(style.grid.rows, None);
    }

    #[test]
    fn gutter_includes_border() {
        let mut styles = Styles::new();
        styles.padding = Some(Spacing::symmetric(0, 1));
        styles.border = Some(Border { kind: BorderKind::Round, color: None });
        let style = ResolvedStyle::from_cascade(&styles, None);
        assert_eq!(style.gutter(), Spacing::new(1, 2, 1, 2));
    }
}
