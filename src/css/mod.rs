//! Styling: scalars, rule model, CSS front-end, cascade.

pub mod scalar;
pub mod tokenizer;
pub mod model;
pub mod parser;
pub mod styles;
pub mod properties;
pub mod specificity;
pub mod stylesheet;

pub use parser::{parse_css, ParseError};
pub use scalar::Scalar;
pub use specificity::{Origin, Specificity};
pub use styles::{ResolvedStyle, Styles};
pub use stylesheet::{PseudoClassQuery, StyleResolver};
