//! The tree-sanitization engine.
//!
//! A single pre-order pass over the tree, mutating it in place. For every
//! node the engine decides Keep, Unwrap (drop the node, splice its children
//! into its position), or Purge (drop the node with its whole subtree), then
//! continues at the position the mutation left behind, so spliced-in
//! children are each visited exactly once and nothing is revisited.

use std::borrow::Cow;
use std::sync::Arc;

use crate::dom::{Document, Element, Fragment, Node, NodeData};
use crate::error::{SanitizeError, SanitizeResult};
use crate::metrics::SanitizerMetrics;
use crate::policy::Policy;
use crate::protocol::allowed_protocol;

/// Tags that switch the parser into a raw-text or foreign content model.
/// When rejected they are always purged with their entire subtree, at every
/// nesting depth, regardless of policy: unwrapping them would re-admit
/// their contents as text that downstream consumers may reinterpret as
/// markup. This set is not configurable.
const FORCED_REMOVAL: &[&str] = &[
    "iframe", "math", "noembed", "noframes", "noscript", "plaintext", "script", "style", "svg",
    "xmp",
];

/// Sanitizes trees against a frozen policy.
///
/// One sanitization call owns its input tree exclusively and mutates it
/// destructively; the `Arc<Policy>` may be shared across any number of
/// concurrent `Sanitizer` instances.
pub struct Sanitizer {
    policy: Arc<Policy>,
    metrics: SanitizerMetrics,
}

enum Kind {
    Text,
    Comment,
    Doctype,
    Element(String),
    /// A nested document node; never produced by a conforming parser.
    Stray,
}

impl Sanitizer {
    pub fn new(policy: Arc<Policy>) -> Self {
        Self {
            policy,
            metrics: SanitizerMetrics::new(),
        }
    }

    /// A sanitizer over the built-in DEFAULT preset (text-only output).
    pub fn with_default_policy() -> Self {
        Self::new(Arc::clone(&crate::policy::presets::DEFAULT))
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn metrics(&self) -> &SanitizerMetrics {
        &self.metrics
    }

    /// Sanitizes a full document in place.
    ///
    /// A doctype is kept only as the document's first child and only when
    /// the policy allows it, and is always rewritten to the minimal HTML5
    /// doctype, so attacker-controlled identifiers never pass through.
    pub fn sanitize_document(&self, document: &mut Document) -> SanitizeResult<()> {
        self.guard_depth(document.depth())?;
        self.sanitize_nodes(&mut document.root.children, self.policy.allow_doctype());
        Ok(())
    }

    /// Sanitizes a fragment in place. Doctypes are stripped unconditionally.
    pub fn sanitize_fragment(&self, fragment: &mut Fragment) -> SanitizeResult<()> {
        self.guard_depth(fragment.depth())?;
        self.sanitize_nodes(&mut fragment.children, false);
        Ok(())
    }

    /// Rejects over-deep input before any mutation is performed.
    fn guard_depth(&self, depth: usize) -> SanitizeResult<()> {
        if let Some(limit) = self.policy.max_tree_depth() {
            if depth > limit {
                tracing::warn!(depth, limit, "rejecting over-deep tree");
                return Err(SanitizeError::ResourceLimit { depth, limit });
            }
        }
        Ok(())
    }

    /// The walk over one sibling list. `doctype_allowed` is true only for
    /// the top-level children of a document whose policy admits a doctype.
    fn sanitize_nodes(&self, children: &mut Vec<Node>, doctype_allowed: bool) {
        let mut i = 0;
        while i < children.len() {
            let kind = match &children[i].data {
                NodeData::Text(_) => Kind::Text,
                NodeData::Comment(_) => Kind::Comment,
                NodeData::Doctype { .. } => Kind::Doctype,
                NodeData::Element(element) => Kind::Element(element.local_name()),
                NodeData::Document => Kind::Stray,
            };

            match kind {
                Kind::Text => {
                    if let NodeData::Text(content) = &mut children[i].data {
                        if let Cow::Owned(clean) = scrub_text(content) {
                            *content = clean;
                        }
                    }
                    i += 1;
                }
                Kind::Comment => {
                    // Kept comments pass through unmodified; they are never
                    // re-parsed for nested markers.
                    if self.policy.allow_comments() {
                        i += 1;
                    } else {
                        children.remove(i);
                        self.metrics.increment_comments_removed();
                    }
                }
                Kind::Doctype => {
                    if doctype_allowed && i == 0 {
                        if let NodeData::Doctype {
                            name,
                            public_id,
                            system_id,
                        } = &mut children[i].data
                        {
                            "html".clone_into(name);
                            public_id.clear();
                            system_id.clear();
                        }
                        i += 1;
                    } else {
                        children.remove(i);
                        self.metrics.increment_doctypes_removed();
                    }
                }
                Kind::Stray => {
                    children.remove(i);
                }
                Kind::Element(tag) => {
                    if self.policy.allows_element(&tag) {
                        self.keep_element(children, &mut i, &tag);
                    } else {
                        self.reject_element(children, i, &tag);
                    }
                }
            }
        }
    }

    /// Processes an allowed element: attribute filtering, then recursion.
    /// Demoted to Unwrap when a required-attribute declaration is left
    /// unsatisfied by the surviving attributes.
    fn keep_element(&self, children: &mut Vec<Node>, i: &mut usize, tag: &str) {
        // A kept <iframe>'s contents are raw text to the parser and must
        // never survive.
        if tag == "iframe" && !children[*i].children.is_empty() {
            children[*i].children.clear();
        }

        let satisfied = match &mut children[*i].data {
            NodeData::Element(element) => self.sanitize_attributes(tag, element),
            _ => unreachable!("keep_element is only called on element nodes"),
        };

        if satisfied {
            self.sanitize_nodes(&mut children[*i].children, false);
            *i += 1;
        } else {
            tracing::debug!(tag, "unwrapping element with no required attribute");
            unwrap_at(children, *i, self.policy.pads_whitespace(tag));
            self.metrics.increment_elements_unwrapped();
        }
    }

    /// Removes a rejected element, purging its subtree when the policy or
    /// the forced-removal set says so. The decision is re-evaluated
    /// independently at every depth, so nested or oddly-cased occurrences
    /// of raw-text containers are each purged on their own.
    fn reject_element(&self, children: &mut Vec<Node>, i: usize, tag: &str) {
        let purge = self.policy.removes_contents(tag) || FORCED_REMOVAL.contains(&tag);
        let pad = self.policy.pads_whitespace(tag);

        if purge {
            tracing::debug!(tag, "purging element and its subtree");
            purge_at(children, i, pad);
            self.metrics.increment_elements_removed();
        } else {
            tracing::debug!(tag, "unwrapping element");
            unwrap_at(children, i, pad);
            self.metrics.increment_elements_unwrapped();
        }
    }

    /// Filters an element's attributes in place. Returns false when a
    /// required-attribute declaration is no longer satisfied.
    fn sanitize_attributes(&self, tag: &str, element: &mut Element) -> bool {
        let mut i = 0;
        while i < element.attributes.len() {
            let name = element.attributes[i].name.to_ascii_lowercase();
            let keep = self.should_keep_attribute(tag, &name, element, i);

            if !keep {
                tracing::debug!(tag, attribute = %name, "dropping attribute");
                element.attributes.remove(i);
                self.metrics.increment_attributes_removed();
                continue;
            }

            let attr = &mut element.attributes[i];
            attr.name = name;
            if let Cow::Owned(clean) = scrub_text(&attr.value) {
                attr.value = clean;
            }
            // Output is always UTF-8; never let a surviving <meta> claim
            // otherwise. Exact compare, so "UTF-8" is rewritten to the
            // canonical lowercase form too.
            if tag == "meta" && attr.name == "charset" && attr.value != "utf-8" {
                attr.value = "utf-8".to_string();
            }
            i += 1;
        }

        self.policy
            .satisfies_required_attributes(tag, element.attributes.iter().map(|a| a.name.as_str()))
    }

    fn should_keep_attribute(&self, tag: &str, name: &str, element: &mut Element, i: usize) -> bool {
        if !self.policy.allows_attribute(tag, name) {
            return false;
        }

        if let Some(allowed) = self.policy.protocols_for(tag, name) {
            if !allowed_protocol(allowed, &element.attributes[i].value) {
                return false;
            }
        }

        if name == "class" && self.policy.restricts_classes(tag) {
            match self.filter_class_list(tag, &element.attributes[i].value) {
                Some(kept) => element.attributes[i].value = kept,
                None => return false,
            }
        }

        true
    }

    /// The surviving class tokens, original order, single-space joined;
    /// `None` when no token survives and the attribute must go.
    fn filter_class_list(&self, tag: &str, value: &str) -> Option<String> {
        let kept: Vec<&str> = value
            .split_ascii_whitespace()
            .filter(|token| self.policy.allows_class(tag, token))
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join(" "))
        }
    }
}

/// Deletes the node at `i` together with its subtree.
fn purge_at(children: &mut Vec<Node>, i: usize, pad: bool) {
    children.remove(i);
    if pad {
        insert_space(children, i);
    }
}

/// Deletes the node at `i`, splicing its children into its position in
/// order. With `pad`, one space text node is placed before and after the
/// spliced span.
fn unwrap_at(children: &mut Vec<Node>, i: usize, pad: bool) {
    let node = children.remove(i);
    let count = node.children.len();
    children.splice(i..i, node.children);
    if pad {
        if count == 0 {
            insert_space(children, i);
        } else {
            // After-position first, so the before-insert cannot shift it.
            insert_space(children, i + count);
            insert_space(children, i);
        }
    }
}

/// Inserts a single space text node at `at` unless the position sits at
/// either end of the list or borders an existing whitespace-only text node
/// (never two adjacent space-only nodes).
fn insert_space(children: &mut Vec<Node>, at: usize) {
    if at == 0 || at >= children.len() {
        return;
    }
    if is_whitespace_text(&children[at - 1]) || is_whitespace_text(&children[at]) {
        return;
    }
    children.insert(at, Node::text(" "));
}

fn is_whitespace_text(node: &Node) -> bool {
    match &node.data {
        NodeData::Text(content) => {
            !content.is_empty() && content.chars().all(|c| c.is_ascii_whitespace())
        }
        _ => false,
    }
}

/// Strips ASCII control characters outside tab/LF/FF/space and Unicode
/// noncharacters (U+FDD0..=U+FDEF and the two final code points of every
/// plane) from text content and attribute values.
pub(crate) fn scrub_text(input: &str) -> Cow<'_, str> {
    if input.chars().all(is_retained_char) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.chars().filter(|&c| is_retained_char(c)).collect())
    }
}

fn is_retained_char(c: char) -> bool {
    if c.is_ascii_control() {
        return matches!(c, '\t' | '\n' | '\u{0C}');
    }
    let cp = c as u32;
    if (0x7F..=0x9F).contains(&cp) {
        return false;
    }
    if (0xFDD0..=0xFDEF).contains(&cp) {
        return false;
    }
    (cp & 0xFFFF) < 0xFFFE
}
