//! Grid layout.
//!
//! Children fill cells left to right, top to bottom, skipping cells already
//! covered by an earlier child's span. Track lengths cycle through
//! `grid-columns` / `grid-rows` (default `1fr`) and are resolved the same
//! way box layout resolves children: fixed tracks first, then `auto` tracks
//! from their widest (tallest) single-span child, then fractions share the
//! rest. Gutters sit between tracks, never around the edge.

use std::collections::HashSet;

use tracing::debug;

use crate::css::scalar::Scalar;
use crate::css::styles::GridStyle;
use crate::geometry::{Region, Size};

use super::arrange::{ArrangeContext, Child, Extent, Placement};
use super::box_model::{distribute, Axis};

/// A child's slot in the grid, in track indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    child: usize,
    column: usize,
    row: usize,
    column_span: usize,
    row_span: usize,
}

/// Arrange `children` on `grid` inside a content box of `size`.
///
/// With a fixed row count, children that find no free cell are left out
/// of the result.
pub fn arrange_grid(ctx: &ArrangeContext<'_>, grid: &GridStyle, children: &[Child<'_>], size: Size) -> Vec<Placement> {
    let columns = grid.columns.max(1) as usize;
    let fixed_rows = grid.rows.map(|rows| rows.max(1) as usize);
    let cells = place_cells(children, columns, fixed_rows);
    let rows = fixed_rows.unwrap_or_else(|| cells.iter().map(|cell| cell.row + cell.row_span).max().unwrap_or(0));
    if cells.is_empty() {
        return Vec::new();
    }

    let widths = track_lengths(
        ctx,
        &grid.column_tracks,
        columns,
        size.width,
        grid.gutter_horizontal,
        ctx.auto_width,
        |column, available| {
            cells
                .iter()
                .filter(|cell| cell.column == column && cell.column_span == 1)
                .map(|cell| natural(ctx, children[cell.child], Axis::Horizontal, Size::new(available, size.height)))
                .max()
                .unwrap_or(0)
        },
    );
    let heights = track_lengths(
        ctx,
        &grid.row_tracks,
        rows,
        size.height,
        grid.gutter_vertical,
        ctx.auto_height,
        |row, available| {
            cells
                .iter()
                .filter(|cell| cell.row == row && cell.row_span == 1)
                .map(|cell| {
                    let width = span_length(&widths, cell.column, 1, grid.gutter_horizontal);
                    natural(ctx, children[cell.child], Axis::Vertical, Size::new(width, available))
                })
                .max()
                .unwrap_or(0)
        },
    );

    let xs = track_starts(&widths, grid.gutter_horizontal);
    let ys = track_starts(&heights, grid.gutter_vertical);

    cells
        .iter()
        .map(|cell| {
            let child = children[cell.child];
            let region = Region::new(
                xs[cell.column],
                ys[cell.row],
                span_length(&widths, cell.column, cell.column_span, grid.gutter_horizontal),
                span_length(&heights, cell.row, cell.row_span, grid.gutter_vertical),
            );
            Placement::new(child.node, fit_to_cell(ctx, child, region), child.style.margin)
        })
        .collect()
}

/// Assign cells in document order. Column spans are clamped to the column
/// count; row spans to a fixed row count.
fn place_cells(children: &[Child<'_>], columns: usize, rows: Option<usize>) -> Vec<Cell> {
    let mut occupied: HashSet<(usize, usize)> = HashSet::new();
    let mut cells = Vec::with_capacity(children.len());
    let (mut row, mut column) = (0, 0);

    for (index, child) in children.iter().enumerate() {
        let column_span = (child.style.column_span.max(1) as usize).min(columns);
        let row_span = child.style.row_span.max(1) as usize;
        let row_span = rows.map_or(row_span, |rows| row_span.min(rows));

        loop {
            if rows.is_some_and(|rows| row >= rows) {
                debug!(node = ?child.node, "grid is full; child not placed");
                break;
            }
            if column + column_span > columns {
                row += 1;
                column = 0;
                continue;
            }
            let fits = rows.map_or(true, |rows| row + row_span <= rows)
                && (row..row + row_span)
                    .all(|r| (column..column + column_span).all(|c| !occupied.contains(&(c, r))));
            if fits {
                for r in row..row + row_span {
                    for c in column..column + column_span {
                        occupied.insert((c, r));
                    }
                }
                cells.push(Cell { child: index, column, row, column_span, row_span });
                column += column_span;
                break;
            }
            column += 1;
        }
    }
    cells
}

/// Resolve `count` track lengths sharing `space` minus gutters.
///
/// `auto_length(track, available)` measures an `auto` track. On an axis
/// sized from content, fractional tracks are measured too.
fn track_lengths(
    ctx: &ArrangeContext<'_>,
    tracks: &[Scalar],
    count: usize,
    space: i32,
    gutter: i32,
    auto_axis: bool,
    auto_length: impl Fn(usize, i32) -> i32,
) -> Vec<i32> {
    let available = (space - gutter * (count as i32 - 1).max(0)).max(0);
    let mut lengths = vec![0; count];
    let mut weights = vec![0.0; count];
    for i in 0..count {
        let track = if tracks.is_empty() { Scalar::Fraction(1.0) } else { tracks[i % tracks.len()] };
        match track {
            Scalar::Auto => lengths[i] = auto_length(i, available),
            Scalar::Fraction(_) if auto_axis => lengths[i] = auto_length(i, available),
            Scalar::Fraction(_) => weights[i] = track.fraction_weight(),
            fixed => lengths[i] = fixed.resolve(available, ctx.viewport).unwrap_or(0),
        }
    }
    if weights.iter().any(|w| *w > 0.0) {
        let remaining = available - lengths.iter().sum::<i32>();
        for (i, share) in distribute(remaining, &weights).into_iter().enumerate() {
            if weights[i] > 0.0 {
                lengths[i] = share;
            }
        }
    }
    lengths
}

fn track_starts(lengths: &[i32], gutter: i32) -> Vec<i32> {
    let mut position = 0;
    lengths
        .iter()
        .map(|length| {
            let start = position;
            position += length + gutter;
            start
        })
        .collect()
}

/// Length of `span` tracks from `start`, including the gutters inside.
fn span_length(lengths: &[i32], start: usize, span: usize, gutter: i32) -> i32 {
    let end = (start + span).min(lengths.len());
    let tracks = &lengths[start.min(end)..end];
    tracks.iter().sum::<i32>() + gutter * (tracks.len() as i32 - 1).max(0)
}

/// Margin-box length a child wants along `axis`, for `auto` tracks.
fn natural(ctx: &ArrangeContext<'_>, child: Child<'_>, axis: Axis, available: Size) -> i32 {
    let reference = axis.extent(available);
    let margin = axis.total(child.style.margin);
    let length = match ctx.extent(child.style, axis, reference) {
        Extent::Cells(cells) => cells,
        Extent::Auto | Extent::Fill | Extent::Fraction(_) => {
            let inner = Size::new(available.width - child.style.margin.width(), available.height - child.style.margin.height());
            ctx.measure_extent(child, axis, inner.clamp_non_negative())
        }
    };
    ctx.clamp(child.style, axis, length, reference) + margin
}

/// The child's border box inside `cell`: the cell minus margins, or a
/// smaller explicit size.
fn fit_to_cell(ctx: &ArrangeContext<'_>, child: Child<'_>, cell: Region) -> Region {
    let inner = cell.shrink(child.style.margin);
    let length = |axis: Axis| {
        let space = axis.extent(cell.size());
        let limit = axis.extent(inner.size());
        let value = match ctx.extent(child.style, axis, space) {
            Extent::Cells(cells) => cells,
            Extent::Auto => ctx.measure_extent(child, axis, inner.size()),
            Extent::Fill | Extent::Fraction(_) => limit,
        };
        ctx.clamp(child.style, axis, value, space).min(limit)
    };
    Region::new(inner.x, inner.y, length(Axis::Horizontal), length(Axis::Vertical))
}
