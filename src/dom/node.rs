//! Defines the core Node structure and associated builders for the tree.

use std::fmt;

/// Represents a single attribute (name-value pair).
///
/// Attribute names are matched case-insensitively; the sanitizer
/// canonicalizes the names of retained attributes to lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Represents an HTML element within the tree.
///
/// `attributes` preserves insertion order; names are unique
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// The tag name canonicalized to lowercase for policy matching.
    pub fn local_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Sets an attribute, replacing any existing value under the same
    /// case-insensitive name while keeping its original position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        for attr in &mut self.attributes {
            if attr.name.eq_ignore_ascii_case(&name) {
                attr.value = value;
                return;
            }
        }
        self.attributes.push(Attribute::new(name, value));
    }

    /// Looks up an attribute value by case-insensitive name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }
}

/// Represents the different types of nodes in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root
    Document,
    /// An HTML element
    Element(Element),
    /// A text node
    Text(String),
    /// A comment node
    Comment(String),
    /// A doctype declaration
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// A node in the tree. Each node exclusively owns its children; the
/// sanitizer is the only mutator for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// The actual node data
    pub data: NodeData,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new node with the given data and no children.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    /// Create an element node.
    pub fn element(name: impl Into<String>) -> Self {
        Self::new(NodeData::Element(Element::new(name)))
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeData::Text(content.into()))
    }

    /// Create a comment node.
    pub fn comment(content: impl Into<String>) -> Self {
        Self::new(NodeData::Comment(content.into()))
    }

    /// Create a doctype node.
    pub fn doctype(
        name: impl Into<String>,
        public_id: impl Into<String>,
        system_id: impl Into<String>,
    ) -> Self {
        Self::new(NodeData::Doctype {
            name: name.into(),
            public_id: public_id.into(),
            system_id: system_id.into(),
        })
    }

    /// Builder-style: attach children.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Builder-style: set an attribute. No-op on non-element nodes.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeData::Element(element) = &mut self.data {
            element.set_attribute(name, value);
        }
        self
    }

    /// Check if this node is an element.
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// The lowercase tag name, if this is an element.
    pub fn tag_name(&self) -> Option<String> {
        match &self.data {
            NodeData::Element(element) => Some(element.local_name()),
            _ => None,
        }
    }

    /// Get element attributes if this is an element node.
    pub fn element_attributes(&self) -> Option<&Vec<Attribute>> {
        match &self.data {
            NodeData::Element(element) => Some(&element.attributes),
            _ => None,
        }
    }

    /// Concatenated text content of this node's subtree, in document order.
    /// Comments and doctypes contribute nothing.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let NodeData::Text(content) = &self.data {
            out.push_str(content);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            NodeData::Document => write!(f, "#document"),
            NodeData::Element(element) => write!(f, "<{}>", element.local_name()),
            NodeData::Text(_) => write!(f, "#text"),
            NodeData::Comment(_) => write!(f, "#comment"),
            NodeData::Doctype { name, .. } => write!(f, "<!DOCTYPE {}>", name),
        }
    }
}
