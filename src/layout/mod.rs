//! Layout: per-container arrangement (box, grid, docks), the arrangement
//! cache, the reflow engine and the hit-testing map.

pub mod arrange;
pub mod box_model;
pub mod grid;
pub mod cache;
pub mod engine;
pub mod spatial;

pub use arrange::{arrange, Arrangement, Measure, Placement};
pub use box_model::{distribute, Axis};
pub use cache::{ArrangementCache, ArrangementKey};
pub use engine::{LayoutEngine, LayoutNode, LayoutTree};
pub use spatial::SpatialMap;
