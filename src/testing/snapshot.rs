//! In-memory render sink for snapshot tests.
//!
//! [`MemorySink`] keeps a grid of the cells it was sent plus a log of every
//! span write, so tests can assert both on what the screen shows and on how
//! little was written to get there.

use std::io;

use crate::geometry::Size;
use crate::render::renderer::RenderSink;
use crate::render::strip::{Strip, StyledCell};

/// One `write_span` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanWrite {
    pub x: u16,
    pub y: u16,
    pub text: String,
}

/// A fake terminal.
#[derive(Debug, Clone)]
pub struct MemorySink {
    size: Size,
    grid: Vec<Vec<StyledCell>>,
    writes: Vec<SpanWrite>,
    flushes: usize,
}

impl MemorySink {
    pub fn new(width: u16, height: u16) -> Self {
        let size = Size::new(i32::from(width), i32::from(height));
        Self { size, grid: blank_grid(width, height), writes: Vec::new(), flushes: 0 }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Clear the grid and the write log for a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    /// Every row, full width. Wide characters count once.
    pub fn lines(&self) -> Vec<String> {
        self.grid.iter().map(|row| Strip::from_cells(row.clone()).text()).collect()
    }

    /// Rows with trailing blanks trimmed, joined by `'\n'`.
    pub fn text(&self) -> String {
        self.lines().iter().map(|line| line.trim_end()).collect::<Vec<_>>().join("\n")
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&StyledCell> {
        self.grid.get(usize::from(y))?.get(usize::from(x))
    }

    pub fn writes(&self) -> &[SpanWrite] {
        &self.writes
    }

    /// The write log so far, leaving it empty.
    pub fn take_writes(&mut self) -> Vec<SpanWrite> {
        std::mem::take(&mut self.writes)
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

fn blank_grid(width: u16, height: u16) -> Vec<Vec<StyledCell>> {
    vec![vec![StyledCell::blank(); usize::from(width)]; usize::from(height)]
}

impl RenderSink for MemorySink {
    fn write_span(&mut self, x: u16, y: u16, cells: &[StyledCell]) -> io::Result<usize> {
        let text = Strip::from_cells(cells.to_vec()).text();
        if let Some(row) = self.grid.get_mut(usize::from(y)) {
            for (cell, slot) in cells.iter().zip(row.iter_mut().skip(usize::from(x))) {
                *slot = cell.clone();
            }
        }
        let bytes = text.len();
        self.writes.push(SpanWrite { x, y, text });
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
