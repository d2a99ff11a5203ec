//! # strata-tui
//!
//! A CSS-styled layout and compositing engine for terminal user interfaces.
//!
//! Widgets live in a retained DOM and are styled by a cascade of stylesheets.
//! Each frame, dirty nodes are restyled, containers whose inputs changed are
//! re-arranged (everything else comes from a cache), the visible parts of
//! every widget are composited into non-overlapping chips, and only the cells
//! that differ from the previous frame are written to the terminal.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** - Offset, Size, Region, Spacing primitives
//! - **[`css`]** - Tokenizer, parser, specificity and the style cascade
//! - **[`dom`]** - Slotmap-backed DOM arena with dirty tracking and selector matching
//! - **[`layout`]** - Box, fractional, grid and dock arrangement with an arrangement cache
//! - **[`render`]** - Compositor, row-diffing renderer and crossterm driver
//! - **[`widget`]** - Widget trait and scroll state
//! - **[`widgets`]** - Built-in widgets: Static, Container
//! - **[`screen`]** - The public surface: mount, mark dirty, query regions, render frames
//! - **[`app`]** - Configuration and the tokio event loop
//! - **[`testing`]** - Headless pilot and in-memory render sink

// Foundation
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;

// Widget system
pub mod widget;
pub mod widgets;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod screen;

// Headless testing
pub mod testing;

pub use app::{App, AppConfig, AppError};
pub use screen::{Screen, ScreenError};
