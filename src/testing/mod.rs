//! Headless testing: a fake terminal and a pilot.
//!
//! [`MemorySink`] stands in for the terminal in any
//! [`RenderSink`](crate::render::RenderSink) position. [`Pilot`] wraps a
//! headless [`App`](crate::app::App) together with one.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{MemorySink, SpanWrite};
