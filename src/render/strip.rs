//! Strip: one row of styled terminal cells.
//!
//! Widgets and the border decorator produce one `Strip` per line of a node;
//! the renderer crops strips to the visible part of each chip and splices
//! them into a row buffer.

use unicode_width::UnicodeWidthChar;

use crate::css::styles::ResolvedStyle;

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Visual style for a single terminal cell.
///
/// Colours are kept as the strings the stylesheet used (`red`, `#ff0000`)
/// and only parsed by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub reverse: bool,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell style a node's resolved style paints with.
    pub fn from_resolved(style: &ResolvedStyle) -> Self {
        let text = style.text_style;
        CellStyle {
            fg: style.color.clone(),
            bg: style.background.clone(),
            bold: text.bold,
            dim: text.dim,
            italic: text.italic,
            underline: text.underline,
            strikethrough: text.strike,
            reverse: text.reverse,
        }
    }

    /// Same attributes with a different foreground. `None` keeps the
    /// current one.
    pub fn with_fg(&self, fg: Option<&str>) -> Self {
        let mut style = self.clone();
        if let Some(fg) = fg {
            style.fg = Some(fg.to_owned());
        }
        style
    }
}

// ---------------------------------------------------------------------------
// StyledCell
// ---------------------------------------------------------------------------

/// One terminal cell.
///
/// A double-width character occupies its own cell plus a continuation cell
/// holding `'\0'`, so cell indexes always equal screen columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledCell {
    pub ch: char,
    pub style: CellStyle,
}

impl StyledCell {
    pub const CONTINUATION: char = '\0';

    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { ch, style }
    }

    pub fn blank() -> Self {
        Self::blank_styled(CellStyle::default())
    }

    pub fn blank_styled(style: CellStyle) -> Self {
        Self { ch: ' ', style }
    }

    /// `true` for the second half of a double-width character.
    pub fn is_continuation(&self) -> bool {
        self.ch == Self::CONTINUATION
    }
}

impl Default for StyledCell {
    fn default() -> Self {
        Self::blank()
    }
}

// ---------------------------------------------------------------------------
// Strip
// ---------------------------------------------------------------------------

/// A horizontal run of cells, indexed from the left edge of whatever
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Strip {
    cells: Vec<StyledCell>,
}

impl Strip {
    pub fn new() -> Self {
        Self::default()
    }

    /// `width` spaces in `style`.
    pub fn blank(width: i32, style: CellStyle) -> Self {
        Self { cells: vec![StyledCell::blank_styled(style); width.max(0) as usize] }
    }

    pub fn from_cells(cells: Vec<StyledCell>) -> Self {
        Self { cells }
    }

    /// Push one character. Zero-width characters are dropped and wide ones
    /// take two cells.
    pub fn push(&mut self, ch: char, style: CellStyle) {
        match ch.width().unwrap_or(0) {
            0 => {}
            1 => self.cells.push(StyledCell::new(ch, style)),
            _ => {
                self.cells.push(StyledCell::new(ch, style.clone()));
                self.cells.push(StyledCell::new(StyledCell::CONTINUATION, style));
            }
        }
    }

    pub fn push_str(&mut self, text: &str, style: CellStyle) {
        for ch in text.chars() {
            self.push(ch, style.clone());
        }
    }

    /// Append another strip's cells.
    pub fn extend(&mut self, other: Strip) {
        self.cells.extend(other.cells);
    }

    pub fn width(&self) -> i32 {
        self.cells.len() as i32
    }

    pub fn cells(&self) -> &[StyledCell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<StyledCell> {
        self.cells
    }

    /// The cells in `[start, end)`, clamped to the strip. A wide character
    /// cut in half by either edge becomes a blank in its own style.
    pub fn crop(&self, start: i32, end: i32) -> Strip {
        let len = self.width();
        let start = start.clamp(0, len) as usize;
        let end = end.clamp(0, len) as usize;
        if start >= end {
            return Strip::new();
        }
        let mut cells = self.cells[start..end].to_vec();
        if cells[0].is_continuation() {
            cells[0].ch = ' ';
        }
        let cut_tail = self.cells.get(end).is_some_and(StyledCell::is_continuation);
        if cut_tail {
            if let Some(last) = cells.last_mut() {
                last.ch = ' ';
            }
        }
        Strip { cells }
    }

    /// Pad with blanks in `style` or truncate to exactly `width` cells.
    pub fn fill(&mut self, width: i32, style: CellStyle) {
        let width = width.max(0) as usize;
        if self.cells.len() > width {
            let cut_wide = self.cells.get(width).is_some_and(StyledCell::is_continuation);
            self.cells.truncate(width);
            if cut_wide {
                if let Some(last) = self.cells.last_mut() {
                    last.ch = ' ';
                }
            }
        } else {
            self.cells.resize(width, StyledCell::blank_styled(style));
        }
    }

    /// The characters of the strip, without continuation cells.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|cell| !cell.is_continuation())
            .map(|cell| cell.ch)
            .collect()
    }
}
