//! Structured rule sets: selectors, declarations, stylesheets.
//!
//! This is what the cascade consumes. [`parse_css`](crate::css::parser::parse_css)
//! builds it from text, but it can be assembled by hand as well.

use std::fmt;

/// One simple selector inside a compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Widget type name, e.g. `Static`.
    Type(String),
    /// `*`
    Universal,
    Class(String),
    Id(String),
    /// `:hover`, `:focus`, `:first-child`, ...
    PseudoClass(String),
}

/// Simple selectors that must all match the same node, e.g. `Static.title:hover`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub parts: Vec<SimpleSelector>,
}

impl Compound {
    pub fn new(parts: Vec<SimpleSelector>) -> Self {
        Self { parts }
    }

    pub fn of_type(name: &str) -> Self {
        Self::new(vec![SimpleSelector::Type(name.to_owned())])
    }

    pub fn class(name: &str) -> Self {
        Self::new(vec![SimpleSelector::Class(name.to_owned())])
    }

    pub fn id(name: &str) -> Self {
        Self::new(vec![SimpleSelector::Id(name.to_owned())])
    }

    pub fn with(mut self, part: SimpleSelector) -> Self {
        self.parts.push(part);
        self
    }
}

/// How a compound relates to the one on its right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
}

/// A complex selector stored right to left: the compound the rule applies to
/// (`subject`) and then each ancestor requirement, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub subject: Compound,
    pub ancestors: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn new(subject: Compound) -> Self {
        Self { subject, ancestors: Vec::new() }
    }

    /// Require the current leftmost compound to sit inside `compound`.
    pub fn inside(mut self, combinator: Combinator, compound: Compound) -> Self {
        self.ancestors.push((combinator, compound));
        self
    }

    /// All simple selectors, subject included.
    pub fn simple_selectors(&self) -> impl Iterator<Item = &SimpleSelector> {
        self.subject
            .parts
            .iter()
            .chain(self.ancestors.iter().flat_map(|(_, compound)| compound.parts.iter()))
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                SimpleSelector::Type(name) => write!(f, "{name}")?,
                SimpleSelector::Universal => f.write_str("*")?,
                SimpleSelector::Class(name) => write!(f, ".{name}")?,
                SimpleSelector::Id(name) => write!(f, "#{name}")?,
                SimpleSelector::PseudoClass(name) => write!(f, ":{name}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (combinator, compound) in self.ancestors.iter().rev() {
            match combinator {
                Combinator::Descendant => write!(f, "{compound} ")?,
                Combinator::Child => write!(f, "{compound} > ")?,
            }
        }
        write!(f, "{}", self.subject)
    }
}

/// One token of a declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    Ident(String),
    Number(f32),
    /// Number with a unit: `1fr`, `50%`, `80vw`.
    Dimension(f32, String),
    /// Hex colour without the leading `#`.
    Color(String),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, values: Vec<DeclarationValue>) -> Self {
        Self { property: property.into(), values, important: false }
    }

    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }
}

/// Selectors sharing one declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// Rule sets in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }
}
