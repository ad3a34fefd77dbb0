//! axvis DOM - Frame-local document model
//!
//! Each browsing context owns one [`Document`]. Documents never reference
//! each other directly; an iframe element only carries the [`FrameId`] of
//! its content frame, and everything behind that id is reachable through
//! message passing alone.
//!
//! Features:
//! - Arena-based DOM tree
//! - Simple selector queries (tag, #id, .class, child/descendant chains)
//! - Per-element layout and visibility inputs
//! - Iframe enumeration and content-frame links

mod node;
mod tree;
mod document;
mod selector;

pub mod geometry;
pub mod visibility;

pub use node::{Node, NodeData, ElementData, TextData};
pub use tree::DomTree;
pub use document::Document;
pub use selector::Selector;
pub use geometry::Rect;
pub use visibility::{DisplayValue, ElementLayout, VisibilityState, VisibilityValue};

use serde::{Deserialize, Serialize};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check this id refers to a node
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::NONE
    }
}

/// Identifier of a browsing context (a frame's content window).
///
/// This is the only thing a document knows about another frame; it is an
/// address for message passing, never a handle to shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub u64);

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} is not in this document")]
    InvalidNode(NodeId),

    #[error("element <{0}> is not an iframe")]
    NotAnIframe(String),
}
