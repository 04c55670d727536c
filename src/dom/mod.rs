//! The tree representation consumed and produced by the sanitizer.
//!
//! The external HTML5 parser hands the sanitizer an already-built tree with
//! all character references decoded; the sanitizer mutates it in place and
//! hands the same tree on to the caller's serializer. Each node exclusively
//! owns its children, so the single-mutator rule is enforced by `&mut`
//! rather than locking.

pub mod node;

pub use node::{Attribute, Element, Node, NodeData};

/// A full document: a single root container holding at most one doctype
/// followed by element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The root node, always `NodeData::Document`.
    pub root: Node,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeData::Document),
        }
    }

    /// Creates a document with the given top-level children.
    pub fn from_children(children: Vec<Node>) -> Self {
        Self {
            root: Node::new(NodeData::Document).with_children(children),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.root.children
    }

    /// Maximum nesting depth below the document root.
    pub fn depth(&self) -> usize {
        subtree_depth(&self.root.children)
    }

    /// Concatenated text content of the document, in document order.
    pub fn text_content(&self) -> String {
        self.root.text_content()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A fragment: an ordered sequence of sibling nodes with no synthetic root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    pub children: Vec<Node>,
}

impl Fragment {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Maximum nesting depth of the fragment's nodes.
    pub fn depth(&self) -> usize {
        subtree_depth(&self.children)
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

/// Maximum nesting depth over a sibling list, computed iteratively so a
/// hostile deeply-nested tree cannot blow the stack before the depth guard
/// has a chance to reject it.
pub fn subtree_depth(children: &[Node]) -> usize {
    let mut max = 0;
    let mut stack: Vec<(&Node, usize)> = children.iter().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        if depth > max {
            max = depth;
        }
        stack.extend(node.children.iter().map(|c| (c, depth + 1)));
    }
    max
}
