//! Widget capability trait and per-container scroll state.

pub mod traits;
pub mod scroll;

pub use traits::Widget;
pub use scroll::ScrollState;
