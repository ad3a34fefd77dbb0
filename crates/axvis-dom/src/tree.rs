//! DOM Tree (arena-based allocation)

use crate::node::{Node, NodeData};
use crate::visibility::ElementLayout;
use crate::{ElementData, NodeId};

/// Arena-based DOM tree. Nodes are never freed; detached nodes simply
/// become unreachable from the root.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Root node ID
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Element data of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| n.as_element())
    }

    /// Mutable element data of a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| n.as_element_mut())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    /// Number of nodes ever allocated
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Allocate a new element node (unattached)
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Allocate a new text node (unattached)
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from
    /// any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.get(parent).is_none() || self.get(child).is_none() {
            tracing::debug!(?parent, ?child, "append_child on invalid node, ignored");
            return;
        }
        self.detach(child);

        let old_last = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = old_last;
            node.next_sibling = NodeId::NONE;
        }

        if old_last.is_valid() {
            self.nodes[old_last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
    }

    /// Unlink a node (and its subtree) from its parent. The subtree keeps
    /// its internal structure but is no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Set an attribute on an element node
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.element_mut(id) {
            elem.set_attribute(name, value);
        }
    }

    /// Look up an attribute on an element node
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    /// Set layout inputs on an element node
    pub fn set_layout(&mut self, id: NodeId, layout: ElementLayout) {
        if let Some(elem) = self.element_mut(id) {
            elem.layout = layout;
        }
    }

    /// Iterate direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next: first }
    }

    /// Iterate the subtree below `start` in document order (excluding
    /// `start` itself).
    pub fn descendants(&self, start: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if let Some(node) = self.get(start) {
            let mut child = node.last_child;
            while child.is_valid() {
                stack.push(child);
                child = self.nodes[child.0 as usize].prev_sibling;
            }
        }
        Descendants { tree: self, stack }
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Depth-first, document-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id)?;

        // Push children right-to-left so the leftmost pops first
        let mut child = node.last_child;
        while child.is_valid() {
            self.stack.push(child);
            child = self.tree.nodes[child.0 as usize].prev_sibling;
        }
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_children() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("span");
        let c = tree.create_element("p");

        tree.append_child(tree.root(), a);
        tree.append_child(a, b);
        tree.append_child(a, c);

        let kids: Vec<NodeId> = tree.children(a).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![b, c]);
        assert_eq!(tree.parent(b), a);
    }

    #[test]
    fn test_document_order() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        let d = tree.create_element("d");

        tree.append_child(tree.root(), a);
        tree.append_child(a, b);
        tree.append_child(b, c);
        tree.append_child(a, d);

        let order: Vec<NodeId> = tree.descendants(tree.root()).map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, b, c, d]);
    }

    #[test]
    fn test_detach_unlinks_subtree() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("span");
        tree.append_child(tree.root(), a);
        tree.append_child(a, b);

        tree.detach(a);

        assert!(tree.descendants(tree.root()).next().is_none());
        // Subtree structure survives detachment
        assert_eq!(tree.parent(b), a);

        // Detaching again is a no-op
        tree.detach(a);
        assert!(!tree.parent(a).is_valid());
    }

    #[test]
    fn test_reparenting() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        let child = tree.create_element("span");

        tree.append_child(tree.root(), a);
        tree.append_child(tree.root(), b);
        tree.append_child(a, child);
        tree.append_child(b, child);

        assert_eq!(tree.children(a).count(), 0);
        let b_kids: Vec<NodeId> = tree.children(b).map(|(id, _)| id).collect();
        assert_eq!(b_kids, vec![child]);
    }
}
