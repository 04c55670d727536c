//! Policy representation: ingestion, normalization, and the frozen ruleset.
//!
//! A [`Policy`] is built once from a declarative [`ConfigValue`] (or JSON)
//! and never mutated afterwards; all fields are private and only reachable
//! through read-only accessors, so an `Arc<Policy>` can be shared by any
//! number of concurrent sanitization calls without locking.

pub mod presets;
pub mod value;

use std::collections::{BTreeMap, HashMap, HashSet};

pub use value::{merge, ConfigValue};

use crate::error::{SanitizeError, SanitizeResult};
use crate::protocol::Protocol;

/// Default bound on input tree nesting depth.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 400;

/// The `"all"` scope marker accepted in `attributes` and `allowed_classes`
/// maps.
const SCOPE_ALL: &str = "all";

/// The marker accepted in protocol lists meaning "URLs with no scheme
/// component are allowed".
const RELATIVE_MARKER: &str = "relative";

/// Marker in `required_attributes` lists meaning "any attribute".
const REQUIRED_ANY: &str = "*";

/// A frozen allowlist ruleset.
#[derive(Debug, Clone)]
pub struct Policy {
    elements: HashSet<String>,
    attributes_all: HashSet<String>,
    attributes: HashMap<String, HashSet<String>>,
    protocols: HashMap<String, HashMap<String, Vec<Protocol>>>,
    classes_all: HashSet<String>,
    classes: HashMap<String, HashSet<String>>,
    required_attributes: HashMap<String, HashSet<String>>,
    remove_contents_all: bool,
    remove_contents: HashSet<String>,
    whitespace_elements: HashSet<String>,
    allow_comments: bool,
    allow_doctype: bool,
    max_tree_depth: Option<usize>,
}

impl Default for Policy {
    /// An empty allowlist: every element is removed, comments are dropped,
    /// a document doctype is kept, and the default depth guard applies.
    fn default() -> Self {
        Self {
            elements: HashSet::new(),
            attributes_all: HashSet::new(),
            attributes: HashMap::new(),
            protocols: HashMap::new(),
            classes_all: HashSet::new(),
            classes: HashMap::new(),
            required_attributes: HashMap::new(),
            remove_contents_all: false,
            remove_contents: HashSet::new(),
            whitespace_elements: HashSet::new(),
            allow_comments: false,
            allow_doctype: true,
            max_tree_depth: Some(DEFAULT_MAX_TREE_DEPTH),
        }
    }
}

impl Policy {
    /// Builds a policy from a map-shaped configuration value, normalizing
    /// every key at ingestion: tag, attribute, and scheme names are
    /// lowercased, the `"all"` scope is split out of the per-element maps,
    /// and the `relative` marker becomes [`Protocol::Relative`].
    ///
    /// Unrecognized keys are ignored.
    pub fn from_value(config: &ConfigValue) -> SanitizeResult<Self> {
        let map = config
            .as_map()
            .ok_or_else(|| SanitizeError::Config("policy configuration must be a map".to_string()))?;

        let mut policy = Policy::default();

        for (key, val) in map {
            match key.as_str() {
                "elements" => policy.elements = tag_set(val, "elements")?,
                "attributes" => {
                    let (all, per_element) = scoped_sets(val, "attributes", true)?;
                    policy.attributes_all = all;
                    policy.attributes = per_element;
                }
                "protocols" => policy.protocols = protocol_map(val)?,
                "allowed_classes" => {
                    let (all, per_element) = scoped_sets(val, "allowed_classes", false)?;
                    policy.classes_all = all;
                    policy.classes = per_element;
                }
                "required_attributes" => {
                    let (all, per_element) = scoped_sets(val, "required_attributes", true)?;
                    if !all.is_empty() {
                        return Err(SanitizeError::Config(
                            "required_attributes does not accept the \"all\" scope".to_string(),
                        ));
                    }
                    policy.required_attributes = per_element;
                }
                "remove_contents" => match val {
                    ConfigValue::Bool(b) => policy.remove_contents_all = *b,
                    ConfigValue::List(_) => policy.remove_contents = tag_set(val, "remove_contents")?,
                    _ => {
                        return Err(SanitizeError::Config(
                            "remove_contents must be a boolean or a list of tag names".to_string(),
                        ))
                    }
                },
                "whitespace_elements" => {
                    policy.whitespace_elements = tag_set(val, "whitespace_elements")?
                }
                "allow_comments" => {
                    policy.allow_comments = expect_bool(val, "allow_comments")?;
                }
                "allow_doctype" => {
                    policy.allow_doctype = expect_bool(val, "allow_doctype")?;
                }
                "parser_options" => {
                    if let Some(depth) = val.get("max_tree_depth") {
                        let depth = depth.as_int().ok_or_else(|| {
                            SanitizeError::Config(
                                "parser_options.max_tree_depth must be an integer".to_string(),
                            )
                        })?;
                        policy.max_tree_depth = if depth < 0 { None } else { Some(depth as usize) };
                    }
                }
                other => {
                    tracing::debug!(key = other, "ignoring unrecognized policy key");
                }
            }
        }

        Ok(policy)
    }

    /// Builds a policy from a JSON document.
    pub fn from_json(json: &str) -> SanitizeResult<Self> {
        let config: ConfigValue = serde_json::from_str(json)
            .map_err(|e| SanitizeError::Config(format!("invalid policy JSON: {e}")))?;
        Self::from_value(&config)
    }

    /// Check if an element is allowed. Expects a lowercase tag name.
    pub fn allows_element(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    /// Check if an attribute is allowed on an element, either per-element
    /// or through the `"all"` scope. Expects lowercase names.
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        if let Some(set) = self.attributes.get(tag) {
            if set.contains(attribute) {
                return true;
            }
        }
        self.attributes_all.contains(attribute)
    }

    /// The allowed protocols configured for this element/attribute pair, if
    /// any. Attributes without an entry are not subject to protocol checks.
    pub fn protocols_for(&self, tag: &str, attribute: &str) -> Option<&[Protocol]> {
        self.protocols
            .get(tag)
            .and_then(|attrs| attrs.get(attribute))
            .map(|list| list.as_slice())
    }

    /// Whether any class allowlist applies to this element.
    pub fn restricts_classes(&self, tag: &str) -> bool {
        !self.classes_all.is_empty()
            || self.classes.get(tag).is_some_and(|set| !set.is_empty())
    }

    /// Check if a single class token survives the class allowlist.
    pub fn allows_class(&self, tag: &str, class: &str) -> bool {
        if self.classes_all.contains(class) {
            return true;
        }
        self.classes.get(tag).is_some_and(|set| set.contains(class))
    }

    /// The required-attribute set for an element, if it declares one.
    /// A set containing `"*"` means "any attribute".
    pub fn required_attributes(&self, tag: &str) -> Option<&HashSet<String>> {
        self.required_attributes.get(tag)
    }

    /// Whether a surviving attribute set satisfies the element's
    /// required-attribute declaration.
    pub fn satisfies_required_attributes<'a, I>(&self, tag: &str, mut surviving: I) -> bool
    where
        I: Iterator<Item = &'a str>,
    {
        match self.required_attributes(tag) {
            None => true,
            Some(required) if required.contains(REQUIRED_ANY) => surviving.next().is_some(),
            Some(required) => surviving.any(|name| required.contains(name)),
        }
    }

    /// Whether a rejected element's entire subtree must be purged.
    pub fn removes_contents(&self, tag: &str) -> bool {
        self.remove_contents_all || self.remove_contents.contains(tag)
    }

    /// Whether removing this element must be padded with space text.
    pub fn pads_whitespace(&self, tag: &str) -> bool {
        self.whitespace_elements.contains(tag)
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn allow_doctype(&self) -> bool {
        self.allow_doctype
    }

    /// The depth guard bound; `None` when the guard is disabled.
    pub fn max_tree_depth(&self) -> Option<usize> {
        self.max_tree_depth
    }
}

fn expect_bool(value: &ConfigValue, key: &str) -> SanitizeResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| SanitizeError::Config(format!("{key} must be a boolean")))
}

fn expect_map<'a>(
    value: &'a ConfigValue,
    key: &str,
) -> SanitizeResult<&'a BTreeMap<String, ConfigValue>> {
    value
        .as_map()
        .ok_or_else(|| SanitizeError::Config(format!("{key} must be a map")))
}

fn string_list<'a>(value: &'a ConfigValue, key: &str) -> SanitizeResult<Vec<&'a str>> {
    let list = value
        .as_list()
        .ok_or_else(|| SanitizeError::Config(format!("{key} must be a list of strings")))?;
    list.iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| SanitizeError::Config(format!("{key} must contain only strings")))
        })
        .collect()
}

/// A list of tag/attribute names, lowercased into a set.
fn tag_set(value: &ConfigValue, key: &str) -> SanitizeResult<HashSet<String>> {
    Ok(string_list(value, key)?
        .into_iter()
        .map(|s| s.to_ascii_lowercase())
        .collect())
}

/// Class names match case-sensitively, so no folding.
fn literal_set(value: &ConfigValue, key: &str) -> SanitizeResult<HashSet<String>> {
    Ok(string_list(value, key)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Parses a map of tag-or-"all" to name lists, splitting the `"all"` scope
/// out from the per-element entries.
fn scoped_sets(
    value: &ConfigValue,
    key: &str,
    fold_values: bool,
) -> SanitizeResult<(HashSet<String>, HashMap<String, HashSet<String>>)> {
    let map = expect_map(value, key)?;
    let mut all = HashSet::new();
    let mut per_element = HashMap::new();

    for (scope, names) in map {
        let set = if fold_values {
            tag_set(names, key)?
        } else {
            literal_set(names, key)?
        };
        if scope == SCOPE_ALL {
            all = set;
        } else {
            per_element.insert(scope.to_ascii_lowercase(), set);
        }
    }

    Ok((all, per_element))
}

fn protocol_map(
    value: &ConfigValue,
) -> SanitizeResult<HashMap<String, HashMap<String, Vec<Protocol>>>> {
    let map = expect_map(value, "protocols")?;
    let mut out = HashMap::new();

    for (tag, attrs) in map {
        let attrs = expect_map(attrs, "protocols entries")?;
        let mut per_attribute = HashMap::new();
        for (attribute, schemes) in attrs {
            let schemes = string_list(schemes, "protocol scheme lists")?;
            let mut list = Vec::with_capacity(schemes.len());
            for scheme in schemes {
                if scheme == RELATIVE_MARKER {
                    list.push(Protocol::Relative);
                } else {
                    list.push(Protocol::Scheme(scheme.to_ascii_lowercase()));
                }
            }
            per_attribute.insert(attribute.to_ascii_lowercase(), list);
        }
        out.insert(tag.to_ascii_lowercase(), per_attribute);
    }

    Ok(out)
}
