//! Rendering pipeline: compositor, content, row-diffing renderer, crossterm driver.

pub mod compositor;
pub mod content;
pub mod driver;
pub mod renderer;
pub mod strip;

pub use compositor::{Chip, Compositor, RenderTree};
pub use content::{BoxGlyphs, ContentSource, DomContent};
pub use driver::{parse_color, Driver};
pub use renderer::{changed_spans, FrameRenderer, FrameStats, RenderError, RenderSink};
pub use strip::{CellStyle, Strip, StyledCell};
