//! Spatial map for hit testing.
//!
//! Built from the compositor's chips after each frame. Chips never overlap,
//! so the cell under a point belongs to at most one chip; that chip's node
//! is the one the user sees there. Entries are bucketed per screen row.

use crate::dom::NodeId;
use crate::geometry::{Offset, Region, Size};

#[derive(Debug, Clone, Default)]
pub struct SpatialMap {
    /// `(node, visible region)` in paint order, bottom first.
    entries: Vec<(NodeId, Region)>,
    /// Indexes into `entries` for every chip touching each row.
    rows: Vec<Vec<usize>>,
}

impl SpatialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `entries` on a screen of `size`.
    pub fn update(&mut self, entries: impl IntoIterator<Item = (NodeId, Region)>, size: Size) {
        let screen = size.clamp_non_negative().to_region();
        self.entries.clear();
        self.rows.clear();
        self.rows.resize(screen.height as usize, Vec::new());
        for (node, region) in entries {
            let visible = region.intersection(screen);
            if visible.is_empty() {
                continue;
            }
            let index = self.entries.len();
            self.entries.push((node, visible));
            for y in visible.y..visible.bottom() {
                self.rows[y as usize].push(index);
            }
        }
    }

    /// The topmost node painted at `point`.
    pub fn node_at(&self, point: Offset) -> Option<NodeId> {
        let row = self.rows.get(usize::try_from(point.y).ok()?)?;
        row.iter()
            .rev()
            .map(|&index| self.entries[index])
            .find(|(_, region)| region.contains(point.x, point.y))
            .map(|(node, _)| node)
    }

    /// Nodes with a visible chip overlapping `region`, topmost first and
    /// each listed once.
    pub fn nodes_in_region(&self, region: Region) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = Vec::new();
        for (node, visible) in self.entries.iter().rev() {
            if visible.overlaps(region) && !found.contains(node) {
                found.push(*node);
            }
        }
        found
    }

    /// Number of chips in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::arrange::tests::ids;

    #[test]
    fn empty_map() {
        let map = SpatialMap::new();
        assert!(map.is_empty());
        assert_eq!(map.node_at(Offset::new(0, 0)), None);
    }

    #[test]
    fn finds_the_chip_under_a_point() {
        let nodes = ids(2);
        let mut map = SpatialMap::new();
        map.update([(nodes[0], Region::new(0, 0, 10, 5)), (nodes[1], Region::new(2, 1, 3, 2))], Size::new(20, 10));
        assert_eq!(map.node_at(Offset::new(3, 2)), Some(nodes[1]));
        assert_eq!(map.node_at(Offset::new(9, 4)), Some(nodes[0]));
        assert_eq!(map.node_at(Offset::new(15, 2)), None);
        assert_eq!(map.node_at(Offset::new(-1, 2)), None);
        assert_eq!(map.node_at(Offset::new(1, -1)), None);
    }

    #[test]
    fn off_screen_parts_are_clipped() {
        let nodes = ids(1);
        let mut map = SpatialMap::new();
        map.update([(nodes[0], Region::new(-5, 8, 10, 10))], Size::new(10, 10));
        assert_eq!(map.node_at(Offset::new(0, 9)), Some(nodes[0]));
        assert_eq!(map.node_at(Offset::new(6, 9)), None);
        assert_eq!(map.node_at(Offset::new(0, 10)), None);
    }

    #[test]
    fn nodes_in_region_are_unique_and_topmost_first() {
        let nodes = ids(2);
        let mut map = SpatialMap::new();
        map.update(
            [
                (nodes[0], Region::new(0, 0, 4, 4)),
                (nodes[1], Region::new(4, 0, 4, 4)),
                (nodes[0], Region::new(8, 0, 4, 4)),
            ],
            Size::new(20, 10),
        );
        assert_eq!(map.nodes_in_region(Region::new(0, 0, 20, 1)), vec![nodes[0], nodes[1]]);
        assert_eq!(map.nodes_in_region(Region::new(5, 0, 1, 1)), vec![nodes[1]]);
        assert!(map.nodes_in_region(Region::new(0, 5, 5, 5)).is_empty());
    }

    #[test]
    fn update_replaces_previous_entries() {
        let nodes = ids(2);
        let mut map = SpatialMap::new();
        map.update([(nodes[0], Region::new(0, 0, 5, 5))], Size::new(10, 10));
        map.update([(nodes[1], Region::new(0, 0, 5, 5))], Size::new(10, 10));
        assert_eq!(map.len(), 1);
        assert_eq!(map.node_at(Offset::new(1, 1)), Some(nodes[1]));
    }
}
