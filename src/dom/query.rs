//! DOM queries and the pseudo-class capability used by the cascade.

use super::node::{NodeData, NodeId, PseudoState};
use super::tree::Dom;
use crate::css::stylesheet::PseudoClassQuery;

impl Dom {
    /// First node (in arena order) with the given `#id`.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_first(|data| data.id.as_deref() == Some(id))
    }

    pub fn query_by_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_class(class))
    }

    pub fn query_by_type(&self, widget_type: &str) -> Vec<NodeId> {
        self.query_all(|data| data.widget_type == widget_type)
    }

    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.iter().filter(|(_, data)| predicate(data)).map(|(id, _)| id).collect()
    }

    fn query_first(&self, predicate: impl Fn(&NodeData) -> bool) -> Option<NodeId> {
        self.iter().find(|(_, data)| predicate(data)).map(|(id, _)| id)
    }
}

impl PseudoClassQuery for Dom {
    /// Interactive states come from the node flags, structural ones from the
    /// node's position among its siblings. `:odd`/`:even` count from one.
    fn has_state(&self, node: NodeId, state: &str) -> bool {
        let Some(data) = self.get(node) else {
            return false;
        };
        match state {
            "hover" => data.state(PseudoState::Hover),
            "focus" => data.state(PseudoState::Focus),
            "disabled" => data.state(PseudoState::Disabled),
            "enabled" => !data.state(PseudoState::Disabled),
            "focus-within" => {
                data.focus
                    || self
                        .walk_depth_first(node)
                        .into_iter()
                        .any(|id| self.get(id).is_some_and(|d| d.focus))
            }
            "first-child" => self.sibling_position(node).0 == 0,
            "last-child" => {
                let (index, count) = self.sibling_position(node);
                index + 1 == count
            }
            "odd" => self.sibling_position(node).0 % 2 == 0,
            "even" => self.sibling_position(node).0 % 2 == 1,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (Dom, NodeId, [NodeId; 3]) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen").with_id("root"));
        let a = dom.insert_child(root, NodeData::new("Static").with_class("item")).unwrap();
        let b = dom.insert_child(root, NodeData::new("Static").with_class("item").with_id("b")).unwrap();
        let c = dom.insert_child(root, NodeData::new("Container").disabled(true)).unwrap();
        (dom, root, [a, b, c])
    }

    #[test]
    fn queries() {
        let (dom, root, [a, b, c]) = build();
        assert_eq!(dom.query_by_id("root"), Some(root));
        assert_eq!(dom.query_by_id("missing"), None);
        let mut items = dom.query_by_class("item");
        items.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(items, expected);
        assert_eq!(dom.query_by_type("Container"), vec![c]);
    }

    #[test]
    fn structural_states() {
        let (dom, _, [a, b, c]) = build();
        assert!(dom.has_state(a, "first-child"));
        assert!(dom.has_state(c, "last-child"));
        assert!(dom.has_state(a, "odd") && dom.has_state(c, "odd"));
        assert!(dom.has_state(b, "even"));
        assert!(!dom.has_state(b, "first-child"));
    }

    #[test]
    fn interactive_states() {
        let (mut dom, root, [a, _, c]) = build();
        assert!(dom.has_state(c, "disabled"));
        assert!(dom.has_state(a, "enabled"));
        assert!(!dom.has_state(a, "hover"));
        dom.set_state(a, PseudoState::Focus, true).unwrap();
        assert!(dom.has_state(a, "focus"));
        assert!(dom.has_state(root, "focus-within"));
        assert!(!dom.has_state(a, "no-such-state"));
    }
}
