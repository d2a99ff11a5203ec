//! DOM arena: slotmap-backed widget tree, dirty tracking, queries.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{DirtyFlags, DirtyKind, NodeData, NodeId, PseudoState};
pub use tree::{Dom, DomError};
