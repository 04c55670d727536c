//! Allowlist-based HTML tree sanitizer.
//!
//! Everything not explicitly allowed by a [`Policy`] is removed from the
//! tree: unknown elements are unwrapped or purged, unknown attributes are
//! dropped, URL-bearing attributes are checked against per-attribute
//! protocol allowlists, and control characters and Unicode noncharacters
//! are stripped from text. The engine operates on an already-parsed tree
//! ([`Document`] or [`Fragment`]); serialization back to markup is the
//! caller's concern.
//!
//! ```
//! use ramparts::{policy::presets, Fragment, Node, Sanitizer};
//!
//! let sanitizer = Sanitizer::new(presets::BASIC.clone());
//! let mut fragment = Fragment::new(vec![
//!     Node::element("b").with_children(vec![Node::text("bold")]),
//!     Node::element("script").with_children(vec![Node::text("evil()")]),
//! ]);
//! sanitizer.sanitize_fragment(&mut fragment).unwrap();
//! assert_eq!(fragment.text_content(), "bold");
//! ```

pub mod dom;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod protocol;
pub mod sanitize;

pub use dom::{Attribute, Document, Element, Fragment, Node, NodeData};
pub use error::{SanitizeError, SanitizeResult};
pub use metrics::SanitizerMetrics;
pub use policy::{merge, ConfigValue, Policy};
pub use protocol::{allowed_protocol, Protocol};
pub use sanitize::Sanitizer;
