//! Cascade: compile rule sets, match selectors, produce [`ResolvedStyle`]s.

use crate::css::model::{Combinator, Compound, RuleSet, Selector, SimpleSelector, StyleSheet};
use crate::css::parser::{parse_css, ParseError};
use crate::css::properties::{apply_declaration, PropertyError};
use crate::css::specificity::{Origin, Specificity};
use crate::css::styles::{ResolvedStyle, Styles};
use crate::dom::{Dom, NodeId};

/// Answers pseudo-class matches (`:hover`, `:focus`, `:first-child`, ...)
/// for a node.
pub trait PseudoClassQuery {
    fn has_state(&self, node: NodeId, state: &str) -> bool;
}

/// A selector with its specificity and the properties it sets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub selector: Selector,
    pub specificity: Specificity,
    pub styles: Styles,
}

/// A declaration dropped at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDiagnostic {
    pub selector: String,
    pub error: PropertyError,
}

/// Compiled rules from every stylesheet, in source order.
///
/// Declarations are validated once, when the stylesheet is added. A bad
/// declaration is logged, recorded in [`diagnostics`](Self::diagnostics)
/// and skipped; the rest of its rule still applies.
#[derive(Debug, Default)]
pub struct StyleResolver {
    rules: Vec<CompiledRule>,
    diagnostics: Vec<StyleDiagnostic>,
    next_order: u32,
    generation: u64,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parsed stylesheet. Later stylesheets win ties.
    pub fn add_stylesheet(&mut self, sheet: &StyleSheet, origin: Origin) {
        for rule in &sheet.rules {
            self.compile_rule(rule, origin);
        }
        self.generation += 1;
    }

    /// Parse and add CSS text with user origin.
    pub fn add_css(&mut self, css: &str) -> Result<(), ParseError> {
        let sheet = parse_css(css)?;
        self.add_stylesheet(&sheet, Origin::User);
        Ok(())
    }

    /// Parse and add a widget's default CSS.
    pub fn add_default_css(&mut self, css: &str) -> Result<(), ParseError> {
        let sheet = parse_css(css)?;
        self.add_stylesheet(&sheet, Origin::Default);
        Ok(())
    }

    fn compile_rule(&mut self, rule: &RuleSet, origin: Origin) {
        let order = self.next_order;
        self.next_order += 1;

        let mut normal = Styles::new();
        let mut important = Styles::new();
        for declaration in &rule.declarations {
            let target = if declaration.important { &mut important } else { &mut normal };
            if let Err(error) = apply_declaration(target, &declaration.property, &declaration.values) {
                let selector = rule
                    .selectors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                tracing::warn!(%selector, %error, "dropping CSS declaration");
                self.diagnostics.push(StyleDiagnostic { selector, error });
            }
        }

        for selector in &rule.selectors {
            for (styles, is_important) in [(&normal, false), (&important, true)] {
                if styles.is_empty() {
                    continue;
                }
                self.rules.push(CompiledRule {
                    selector: selector.clone(),
                    specificity: Specificity::from_selector(selector, origin, is_important, order),
                    styles: styles.clone(),
                });
            }
        }
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn diagnostics(&self) -> &[StyleDiagnostic] {
        &self.diagnostics
    }

    /// Bumped every time a stylesheet is added.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the cascade for `node`.
    ///
    /// `ancestors` is the chain from the parent up to the root. The parent's
    /// resolved style feeds the inherited properties. Unknown nodes resolve
    /// to the default table.
    pub fn resolve(
        &self,
        node: NodeId,
        ancestors: &[NodeId],
        dom: &Dom,
        parent_style: Option<&ResolvedStyle>,
    ) -> ResolvedStyle {
        let Some(data) = dom.get(node) else {
            return ResolvedStyle::from_cascade(&Styles::new(), parent_style);
        };

        let mut matched: Vec<&CompiledRule> = self
            .rules
            .iter()
            .filter(|rule| selector_matches(&rule.selector, node, ancestors, dom))
            .collect();
        matched.sort_by_key(|rule| rule.specificity);

        let inline_at = matched.partition_point(|rule| rule.specificity < Specificity::inline());
        let mut styles = Styles::new();
        for rule in &matched[..inline_at] {
            styles.overlay(&rule.styles);
        }
        styles.overlay(&data.inline);
        for rule in &matched[inline_at..] {
            styles.overlay(&rule.styles);
        }

        ResolvedStyle::from_cascade(&styles, parent_style)
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Right-to-left match of a complex selector, backtracking over
/// descendant combinators.
pub fn selector_matches(selector: &Selector, node: NodeId, ancestors: &[NodeId], dom: &Dom) -> bool {
    compound_matches(&selector.subject, node, dom) && ancestors_match(&selector.ancestors, ancestors, dom)
}

fn ancestors_match(requirements: &[(Combinator, Compound)], chain: &[NodeId], dom: &Dom) -> bool {
    let Some(((combinator, compound), rest)) = requirements.split_first() else {
        return true;
    };
    match combinator {
        Combinator::Child => match chain.split_first() {
            Some((&parent, above)) => {
                compound_matches(compound, parent, dom) && ancestors_match(rest, above, dom)
            }
            None => false,
        },
        Combinator::Descendant => (0..chain.len()).any(|i| {
            compound_matches(compound, chain[i], dom) && ancestors_match(rest, &chain[i + 1..], dom)
        }),
    }
}

fn compound_matches(compound: &Compound, node: NodeId, dom: &Dom) -> bool {
    let Some(data) = dom.get(node) else {
        return false;
    };
    compound.parts.iter().all(|part| match part {
        SimpleSelector::Type(name) => data.widget_type == *name,
        SimpleSelector::Universal => true,
        SimpleSelector::Class(name) => data.has_class(name),
        SimpleSelector::Id(name) => data.id.as_deref() == Some(name.as_str()),
        SimpleSelector::PseudoClass(state) => dom.has_state(node, state),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::scalar::Scalar;
    use crate::css::styles::{Dock, LayoutMode};
    use crate::dom::{NodeData, PseudoState};
    use pretty_assertions::assert_eq;

    ///        root (Screen)
    ///         |
    ///       main (Container #main .panel)
    ///       /     \
    ///   title     body
    ///  (Static    (Static .text)
    ///   .title)
    fn build() -> (Dom, [NodeId; 4]) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let main = dom
            .insert_child(root, NodeData::new("Container").with_id("main").with_class("panel"))
            .unwrap();
        let title = dom.insert_child(main, NodeData::new("Static").with_class("title")).unwrap();
        let body = dom.insert_child(main, NodeData::new("Static").with_class("text")).unwrap();
        (dom, [root, main, title, body])
    }

    fn resolve(resolver: &StyleResolver, dom: &Dom, node: NodeId) -> ResolvedStyle {
        resolver.resolve(node, &dom.ancestors(node), dom, None)
    }

    fn resolver(css: &str) -> StyleResolver {
        let mut resolver = StyleResolver::new();
        resolver.add_css(css).unwrap();
        resolver
    }

    #[test]
    fn descendant_and_child_combinators() {
        let (dom, [root, main, title, _]) = build();
        let sheet = parse_css("Screen Static { width: 3; } Screen > Static { width: 9; }").unwrap();
        let rule_sel = |i: usize| sheet.rules[i].selectors[0].clone();
        assert!(selector_matches(&rule_sel(0), title, &[main, root], &dom));
        assert!(!selector_matches(&rule_sel(1), title, &[main, root], &dom));
    }

    #[test]
    fn descendant_backtracks() {
        let (dom, [_, _, title, _]) = build();
        let sheet = parse_css("Screen > .panel .title { width: 1; }").unwrap();
        let selector = &sheet.rules[0].selectors[0];
        assert!(selector_matches(selector, title, &dom.ancestors(title), &dom));
    }

    #[test]
    fn specificity_beats_source_order() {
        let (dom, [.., title, body]) = build();
        let resolver = resolver("#main .title { width: 5; } Static { width: 7; }");
        assert_eq!(resolve(&resolver, &dom, title).width, Some(Scalar::Cells(5.0)));
        assert_eq!(resolve(&resolver, &dom, body).width, Some(Scalar::Cells(7.0)));
    }

    #[test]
    fn later_rule_wins_ties_property_by_property() {
        let (dom, [.., title, _]) = build();
        let resolver = resolver(
            ".title { width: 5; height: 2; } .title { width: 6; dock: top; }",
        );
        let style = resolve(&resolver, &dom, title);
        assert_eq!(style.width, Some(Scalar::Cells(6.0)));
        assert_eq!(style.height, Some(Scalar::Cells(2.0)));
        assert_eq!(style.dock, Some(Dock::Top));
    }

    #[test]
    fn important_is_per_declaration() {
        let (dom, [.., title, _]) = build();
        let resolver = resolver(
            "Static { width: 1 !important; height: 1; } #main .title { width: 2; height: 2; }",
        );
        let style = resolve(&resolver, &dom, title);
        assert_eq!(style.width, Some(Scalar::Cells(1.0)));
        assert_eq!(style.height, Some(Scalar::Cells(2.0)));
    }

    #[test]
    fn inline_styles_sit_below_important() {
        let (mut dom, [.., title, _]) = build();
        let mut inline = Styles::new();
        inline.width = Some(Scalar::Cells(11.0));
        inline.height = Some(Scalar::Cells(11.0));
        dom.set_inline_style(title, inline).unwrap();
        let resolver = resolver("#main .title { width: 2; } Static { height: 3 !important; }");
        let style = resolve(&resolver, &dom, title);
        assert_eq!(style.width, Some(Scalar::Cells(11.0)));
        assert_eq!(style.height, Some(Scalar::Cells(3.0)));
    }

    #[test]
    fn default_origin_loses_to_user() {
        let (dom, [.., title, _]) = build();
        let mut resolver = StyleResolver::new();
        resolver.add_default_css("Static.title { layout: grid !important; }").unwrap();
        resolver.add_css("Static { layout: horizontal; }").unwrap();
        assert_eq!(resolve(&resolver, &dom, title).layout, LayoutMode::Horizontal);
    }

    #[test]
    fn pseudo_classes_follow_node_state() {
        let (mut dom, [.., title, body]) = build();
        let resolver = resolver("Static:hover { width: 4; } Static:first-child { height: 1; }");
        assert_eq!(resolve(&resolver, &dom, title).width, None);
        dom.set_state(title, PseudoState::Hover, true).unwrap();
        assert_eq!(resolve(&resolver, &dom, title).width, Some(Scalar::Cells(4.0)));
        assert_eq!(resolve(&resolver, &dom, title).height, Some(Scalar::Cells(1.0)));
        assert_eq!(resolve(&resolver, &dom, body).height, None);
    }

    #[test]
    fn bad_declarations_degrade_to_defaults() {
        let (dom, [.., title, _]) = build();
        let resolver = resolver(".title { width: 4; colour: red; dock: sideways; height: 2; }");
        let style = resolve(&resolver, &dom, title);
        assert_eq!(style.width, Some(Scalar::Cells(4.0)));
        assert_eq!(style.height, Some(Scalar::Cells(2.0)));
        assert_eq!(style.dock, None);
        assert_eq!(resolver.diagnostics().len(), 2);
        assert_eq!(
            resolver.diagnostics()[0].error,
            PropertyError::UnknownProperty("colour".into())
        );
        assert_eq!(resolver.diagnostics()[0].selector, ".title");
    }

    #[test]
    fn inheritance_needs_parent_style() {
        let (dom, [root, main, ..]) = build();
        let resolver = resolver("Screen { color: red; background: blue; }");
        let parent = resolve(&resolver, &dom, root);
        let child = resolver.resolve(main, &[root], &dom, Some(&parent));
        assert_eq!(child.color.as_deref(), Some("red"));
        assert_eq!(child.background, None);
    }

    #[test]
    fn generation_counts_stylesheets() {
        let mut resolver = StyleResolver::new();
        assert_eq!(resolver.generation(), 0);
        resolver.add_css("Static { width: 1; }").unwrap();
        assert_eq!(resolver.generation(), 1);
    }
}
