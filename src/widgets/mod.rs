//! Built-in widgets: Static and Container.

pub mod static_widget;
pub mod container;

pub use static_widget::Static;
pub use container::Container;
