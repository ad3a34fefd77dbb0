//! Selectors
//!
//! Compound selectors (`tag#id.class`) joined by child (`>`) and
//! descendant (whitespace) combinators. This is the subset scan targets
//! actually use; anything unparsable matches nothing.

use crate::node::ElementData;
use crate::tree::DomTree;
use crate::NodeId;

/// A parsed selector chain
#[derive(Debug, Clone)]
pub struct Selector {
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// Direct child (`>`)
    Child,
    /// Any descendant (whitespace)
    Descendant,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(token: &str) -> Option<Compound> {
        let mut compound = Compound::default();
        let mut rest = token;

        // Leading tag name
        let cut = rest.find(['#', '.']).unwrap_or(rest.len());
        if cut > 0 {
            compound.tag = Some(rest[..cut].to_ascii_lowercase());
        }
        rest = &rest[cut..];

        while !rest.is_empty() {
            let (marker, tail) = rest.split_at(1);
            let cut = tail.find(['#', '.']).unwrap_or(tail.len());
            let name = &tail[..cut];
            if name.is_empty() {
                return None;
            }
            match marker {
                "#" => compound.id = Some(name.to_string()),
                "." => compound.classes.push(name.to_string()),
                _ => return None,
            }
            rest = &tail[cut..];
        }

        if compound.tag.is_none() && compound.id.is_none() && compound.classes.is_empty() {
            return None;
        }
        Some(compound)
    }

    fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != elem.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| elem.classes.iter().any(|e| e == c))
    }
}

impl Selector {
    /// Parse a selector string. Returns None for anything outside the
    /// supported subset.
    pub fn parse(input: &str) -> Option<Selector> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        let mut pending = false;

        for token in input.split_whitespace() {
            if token == ">" {
                if parts.is_empty() || pending {
                    return None;
                }
                combinator = Combinator::Child;
                pending = true;
                continue;
            }
            parts.push((combinator, Compound::parse(token)?));
            combinator = Combinator::Descendant;
            pending = false;
        }

        if parts.is_empty() || pending {
            return None;
        }
        Some(Selector { parts })
    }

    /// Check whether `node` matches the full chain.
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.matches_at(tree, node, self.parts.len() - 1)
    }

    fn matches_at(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        let Some(elem) = tree.element(node) else {
            return false;
        };
        if !self.parts[index].1.matches(elem) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let combinator = self.parts[index].0;
        let mut ancestor = tree.parent(node);
        match combinator {
            Combinator::Child => {
                ancestor.is_valid() && self.matches_at(tree, ancestor, index - 1)
            }
            Combinator::Descendant => {
                while ancestor.is_valid() {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    ancestor = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        let card = tree.create_element("div");
        let button = tree.create_element("button");

        tree.set_attribute(section, "id", "content");
        tree.set_attribute(card, "class", "card wide");
        tree.set_attribute(button, "class", "cta");

        tree.append_child(tree.root(), section);
        tree.append_child(section, card);
        tree.append_child(card, button);

        (tree, section, card, button)
    }

    #[test]
    fn test_compound_match() {
        let (tree, section, card, button) = sample_tree();

        let sel = Selector::parse("#content").unwrap();
        assert!(sel.matches(&tree, section));
        assert!(!sel.matches(&tree, card));

        let sel = Selector::parse("div.card.wide").unwrap();
        assert!(sel.matches(&tree, card));

        let sel = Selector::parse("button.cta").unwrap();
        assert!(sel.matches(&tree, button));
        assert!(!Selector::parse("span.cta").unwrap().matches(&tree, button));
    }

    #[test]
    fn test_child_chain() {
        let (tree, _, card, button) = sample_tree();

        let sel = Selector::parse("#content > .card > button").unwrap();
        assert!(sel.matches(&tree, button));

        let sel = Selector::parse("#content > button").unwrap();
        assert!(!sel.matches(&tree, button));

        let sel = Selector::parse("section > div").unwrap();
        assert!(sel.matches(&tree, card));
    }

    #[test]
    fn test_descendant_chain() {
        let (tree, _, _, button) = sample_tree();

        let sel = Selector::parse("#content button").unwrap();
        assert!(sel.matches(&tree, button));

        let sel = Selector::parse("section .card .cta").unwrap();
        assert!(sel.matches(&tree, button));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse(">").is_none());
        assert!(Selector::parse("div >").is_none());
        assert!(Selector::parse("#").is_none());
        assert!(Selector::parse("div.").is_none());
    }
}
