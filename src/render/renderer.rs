//! Row-diffing frame renderer.
//!
//! Every frame, each screen row is assembled from the chips crossing it and
//! compared with the row written last frame. Only contiguous runs of changed
//! cells reach the [`RenderSink`]. A row whose chips are laid out exactly as
//! before, and whose nodes were not repainted, is not even assembled.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::io;

use thiserror::Error;
use tracing::trace;

use crate::dom::NodeId;
use crate::geometry::Size;

use super::compositor::{Chip, RenderTree};
use super::content::ContentSource;
use super::strip::{Strip, StyledCell};

#[derive(Debug, Error)]
pub enum RenderError {
    /// The output stream is gone. Not recoverable by the renderer.
    #[error("render sink failed: {0}")]
    Sink(#[from] io::Error),
}

/// Where changed spans go.
pub trait RenderSink {
    /// Write `cells` starting at column `x` of row `y`, returning the number
    /// of bytes emitted.
    fn write_span(&mut self, x: u16, y: u16, cells: &[StyledCell]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()>;
}

/// What one frame cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Spans handed to the sink.
    pub writes: usize,
    pub bytes: usize,
    /// Rows assembled and diffed.
    pub rows_rendered: usize,
    /// Rows skipped because nothing on them could have changed.
    pub rows_skipped: usize,
}

// ---------------------------------------------------------------------------
// FrameRenderer
// ---------------------------------------------------------------------------

/// Owns the previous frame's rows.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    size: Size,
    /// Last row written, `None` when unknown (first frame, after a resize).
    previous: Vec<Option<Vec<StyledCell>>>,
    /// Layout fingerprint of the chips on each row last frame.
    signatures: Vec<u64>,
    /// Nodes whose content changed since the last frame.
    repaint: HashSet<NodeId>,
}

impl FrameRenderer {
    pub fn new(size: Size) -> Self {
        let mut renderer = Self::default();
        renderer.resize(size);
        renderer
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Forget the previous frame. The next frame redraws every row.
    pub fn resize(&mut self, size: Size) {
        self.size = size.clamp_non_negative();
        let rows = self.size.height as usize;
        self.previous = vec![None; rows];
        self.signatures = vec![0; rows];
    }

    /// Force a full redraw on the next frame.
    pub fn invalidate(&mut self) {
        self.previous.iter_mut().for_each(|row| *row = None);
    }

    /// Re-render every row `node` appears on next frame.
    pub fn repaint(&mut self, node: NodeId) {
        self.repaint.insert(node);
    }

    /// Row `y` as last written.
    pub fn row(&self, y: i32) -> Option<&[StyledCell]> {
        self.previous.get(usize::try_from(y).ok()?)?.as_deref()
    }

    /// The characters of the last frame, one string per row.
    pub fn text(&self) -> Vec<String> {
        self.previous
            .iter()
            .map(|row| row.as_ref().map(|cells| Strip::from_cells(cells.clone()).text()).unwrap_or_default())
            .collect()
    }

    /// Draw `tree` and send the differences from the last frame to `sink`.
    ///
    /// The stored rows are replaced whether or not anything was written, so
    /// the next diff is always against what this frame produced.
    pub fn render_frame(
        &mut self,
        tree: &RenderTree,
        source: &dyn ContentSource,
        sink: &mut dyn RenderSink,
    ) -> Result<FrameStats, RenderError> {
        if tree.size() != self.size {
            self.resize(tree.size());
        }
        let mut stats = FrameStats::default();
        let mut lines: HashMap<(NodeId, i32), Strip> = HashMap::new();
        let width = self.size.width as usize;

        for y in 0..self.size.height {
            let row_index = y as usize;
            let chips: Vec<&Chip> = tree.chips_in_row(y).collect();
            let signature = row_signature(&chips);
            let unchanged = self.previous[row_index].is_some()
                && self.signatures[row_index] == signature
                && !chips.iter().any(|chip| self.repaint.contains(&chip.node));
            if unchanged {
                stats.rows_skipped += 1;
                continue;
            }

            let mut row = vec![StyledCell::blank(); width];
            for chip in chips {
                let local_y = chip.local_row(y);
                let line = lines.entry((chip.node, local_y)).or_insert_with(|| {
                    let mut line = source.render_line(chip.node, local_y, chip.region.size());
                    line.fill(chip.region.width, Default::default());
                    line
                });
                let (start, end) = chip.local_columns();
                let piece = line.crop(start, end);
                let x = chip.paint.x.max(0) as usize;
                for (offset, cell) in piece.into_cells().into_iter().enumerate() {
                    if let Some(slot) = row.get_mut(x + offset) {
                        *slot = cell;
                    }
                }
            }

            let spans = match &self.previous[row_index] {
                Some(old) => changed_spans(old, &row),
                None => vec![(0, width)],
            };
            for (start, end) in spans {
                if start >= end {
                    continue;
                }
                stats.bytes += sink.write_span(clamp_u16(start), clamp_u16(row_index), &row[start..end])?;
                stats.writes += 1;
            }
            stats.rows_rendered += 1;
            self.previous[row_index] = Some(row);
            self.signatures[row_index] = signature;
        }

        sink.flush()?;
        self.repaint.clear();
        trace!(
            writes = stats.writes,
            bytes = stats.bytes,
            rows = stats.rows_rendered,
            skipped = stats.rows_skipped,
            "frame rendered"
        );
        Ok(stats)
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn row_signature(chips: &[&Chip]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for chip in chips {
        (chip.node, chip.region, chip.paint.x, chip.paint.width).hash(&mut hasher);
    }
    hasher.finish()
}

/// Half-open column ranges where `new` differs from `old`.
///
/// A range never starts on the continuation half of a wide character.
pub fn changed_spans(old: &[StyledCell], new: &[StyledCell]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for x in 0..new.len() {
        let differs = old.get(x) != Some(&new[x]);
        match (differs, start) {
            (true, None) => {
                let lead = if new[x].is_continuation() && x > 0 { x - 1 } else { x };
                start = Some(lead);
            }
            (false, Some(from)) => {
                spans.push((from, x));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(from) = start {
        spans.push((from, new.len()));
    }
    // A pulled-back start may now touch the previous span.
    spans.dedup_by(|next, prev| {
        if next.0 <= prev.1 {
            prev.1 = prev.1.max(next.1);
            true
        } else {
            false
        }
    });
    spans
}
