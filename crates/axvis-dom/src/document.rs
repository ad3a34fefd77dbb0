//! Document - High-level document API

use crate::geometry::Rect;
use crate::selector::Selector;
use crate::tree::DomTree;
use crate::visibility::ElementLayout;
use crate::{DomError, FrameId, NodeId};

/// One frame's document
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    /// Document URL
    url: String,
    /// Viewport in page coordinates
    viewport: Rect,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with html/head/body structure
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        let root = tree.root();
        tree.append_child(root, html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
            html_element: html,
            body_element: body,
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Current viewport
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Resize the viewport
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.tree.create_element(tag);
        self.tree.append_child(parent, id);
        id
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let id = self.tree.create_text(content);
        self.tree.append_child(parent, id);
        id
    }

    /// First element matching `selector`, in document order
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let sel = Selector::parse(selector)?;
        self.tree
            .descendants(self.tree.root())
            .find(|(id, node)| node.is_element() && sel.matches(&self.tree, *id))
            .map(|(id, _)| id)
    }

    /// All elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.tree
            .descendants(self.tree.root())
            .filter(|(id, node)| node.is_element() && sel.matches(&self.tree, *id))
            .map(|(id, _)| id)
            .collect()
    }

    /// All elements carrying attribute `name`, in document order
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .filter(|(_, node)| {
                node.as_element()
                    .is_some_and(|e| e.attribute(name).is_some())
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// All iframe elements currently in the document, in document order
    pub fn iframes(&self) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .filter(|(_, node)| node.as_element().is_some_and(|e| e.is_iframe()))
            .map(|(id, _)| id)
            .collect()
    }

    /// Content frame of an iframe element. None when the element is not
    /// an attached iframe or its content window is gone.
    pub fn content_frame(&self, node: NodeId) -> Option<FrameId> {
        self.tree.element(node).and_then(|e| {
            if e.is_iframe() {
                e.content_frame
            } else {
                None
            }
        })
    }

    /// Link or unlink an iframe element's content frame
    pub fn set_content_frame(
        &mut self,
        node: NodeId,
        frame: Option<FrameId>,
    ) -> Result<(), DomError> {
        let Some(elem) = self.tree.element_mut(node) else {
            return Err(DomError::InvalidNode(node));
        };
        if !elem.is_iframe() {
            return Err(DomError::NotAnIframe(elem.tag.clone()));
        }
        elem.content_frame = frame;
        Ok(())
    }

    /// Layout inputs of an element
    pub fn element_layout(&self, node: NodeId) -> Option<ElementLayout> {
        self.tree.element(node).map(|e| e.layout)
    }

    /// Set layout inputs of an element
    pub fn set_layout(&mut self, node: NodeId, layout: ElementLayout) {
        self.tree.set_layout(node, layout);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_structure() {
        let doc = Document::new("https://example.test/");
        assert_eq!(doc.url(), "https://example.test/");
        assert!(doc.body().is_valid());
        assert_eq!(doc.query_selector("body"), Some(doc.body()));
    }

    #[test]
    fn test_query_selector_order() {
        let mut doc = Document::default();
        let body = doc.body();
        let first = doc.append_element(body, "p");
        let second = doc.append_element(body, "p");
        doc.tree_mut().set_attribute(first, "class", "note");
        doc.tree_mut().set_attribute(second, "class", "note");

        assert_eq!(doc.query_selector(".note"), Some(first));
        assert_eq!(doc.query_selector_all(".note"), vec![first, second]);
    }

    #[test]
    fn test_iframes_and_content_frames() {
        let mut doc = Document::default();
        let body = doc.body();
        let frame_a = doc.append_element(body, "iframe");
        let div = doc.append_element(body, "div");
        let frame_b = doc.append_element(div, "iframe");

        assert_eq!(doc.iframes(), vec![frame_a, frame_b]);

        doc.set_content_frame(frame_a, Some(FrameId(7))).unwrap();
        assert_eq!(doc.content_frame(frame_a), Some(FrameId(7)));
        assert_eq!(doc.content_frame(frame_b), None);

        doc.set_content_frame(frame_a, None).unwrap();
        assert_eq!(doc.content_frame(frame_a), None);

        assert!(doc.set_content_frame(div, Some(FrameId(1))).is_err());
    }

    #[test]
    fn test_detached_iframe_disappears_from_enumeration() {
        let mut doc = Document::default();
        let body = doc.body();
        let frame = doc.append_element(body, "iframe");
        assert_eq!(doc.iframes().len(), 1);

        doc.tree_mut().detach(frame);
        assert!(doc.iframes().is_empty());
    }
}
