//! Cascade ordering.
//!
//! ```text
//! (origin, important, inline, ids, classes, types, source_order)
//! ```
//!
//! Compared lexicographically, so the derived `Ord` is the cascade order:
//! any user rule beats any widget default rule, `!important` beats inline
//! styles, inline styles beat every normal selector, and source order breaks
//! the remaining ties.

use crate::css::model::{Selector, SimpleSelector};

/// Where a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Origin {
    /// Widget `default_css`.
    #[default]
    Default,
    /// Application stylesheets and inline styles.
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    pub origin: Origin,
    pub important: bool,
    pub inline: bool,
    pub ids: u16,
    /// Classes and pseudo-classes.
    pub classes: u16,
    pub types: u16,
    pub source_order: u32,
}

impl Specificity {
    pub fn from_selector(selector: &Selector, origin: Origin, important: bool, source_order: u32) -> Self {
        let mut specificity = Self { origin, important, source_order, ..Self::default() };
        for simple in selector.simple_selectors() {
            match simple {
                SimpleSelector::Id(_) => specificity.ids += 1,
                SimpleSelector::Class(_) | SimpleSelector::PseudoClass(_) => specificity.classes += 1,
                SimpleSelector::Type(_) => specificity.types += 1,
                SimpleSelector::Universal => {}
            }
        }
        specificity
    }

    /// Specificity of a node's inline style.
    pub fn inline() -> Self {
        Self { origin: Origin::User, inline: true, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::model::{Combinator, Compound};

    fn spec(selector: &Selector) -> Specificity {
        Specificity::from_selector(selector, Origin::User, false, 0)
    }

    #[test]
    fn counts_every_compound() {
        let selector = Selector::new(
            Compound::of_type("Static").with(SimpleSelector::PseudoClass("hover".into())),
        )
        .inside(Combinator::Descendant, Compound::id("main").with(SimpleSelector::Class("x".into())));
        let s = spec(&selector);
        assert_eq!((s.ids, s.classes, s.types), (1, 2, 1));
    }

    #[test]
    fn universal_counts_nothing() {
        let s = spec(&Selector::new(Compound::new(vec![SimpleSelector::Universal])));
        assert_eq!((s.ids, s.classes, s.types), (0, 0, 0));
    }

    #[test]
    fn id_beats_many_classes() {
        let id = spec(&Selector::new(Compound::id("a")));
        let classes = spec(&Selector::new(Compound::new(
            (0..5).map(|i| SimpleSelector::Class(format!("c{i}"))).collect(),
        )));
        assert!(id > classes);
    }

    #[test]
    fn user_beats_default_important() {
        let selector = Selector::new(Compound::of_type("Static"));
        let default_important = Specificity::from_selector(&selector, Origin::Default, true, 9);
        let user = Specificity::from_selector(&selector, Origin::User, false, 0);
        assert!(user > default_important);
    }

    #[test]
    fn inline_sits_between_normal_and_important() {
        let selector = Selector::new(Compound::id("deep")).inside(Combinator::Child, Compound::id("x"));
        let normal = Specificity::from_selector(&selector, Origin::User, false, 100);
        let important = Specificity::from_selector(&Selector::new(Compound::of_type("A")), Origin::User, true, 0);
        assert!(Specificity::inline() > normal);
        assert!(important > Specificity::inline());
    }

    #[test]
    fn source_order_breaks_ties() {
        let selector = Selector::new(Compound::class("a"));
        let early = Specificity::from_selector(&selector, Origin::User, false, 1);
        let late = Specificity::from_selector(&selector, Origin::User, false, 2);
        assert!(late > early);
    }
}
