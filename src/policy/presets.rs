//! Built-in policy presets.
//!
//! The frozen `Arc<Policy>` values are derived once, at first use, by
//! deep-merging the raw configs and freezing the result; no mutation path
//! exists afterwards. The raw `*_config()` builders are public so callers
//! can use a preset as the base for their own [`merge`] overrides.

use std::sync::Arc;

use lazy_static::lazy_static;
use serde_json::json;

use super::{merge, ConfigValue, Policy};

/// Tags whose contents the default policy removes outright: the parser
/// treats their contents as raw text, so unwrapping them would re-admit
/// attacker payload.
const REMOVE_CONTENTS_ELEMENTS: &[&str] =
    &["iframe", "noembed", "noframes", "noscript", "script", "style"];

/// Block-level tags whose removal must not glue neighboring words together.
const WHITESPACE_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "nav", "ol", "p", "pre",
    "section", "ul",
];

/// Elements RELAXED permits beyond BASIC.
const RELAXED_EXTRA_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "bdi", "bdo", "body", "caption", "col", "colgroup", "data",
    "del", "div", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hgroup", "hr", "html", "img", "ins", "main", "nav", "rp", "rt", "ruby", "section",
    "span", "style", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "title",
    "tr", "wbr",
];

lazy_static! {
    /// Text-only output: no elements survive, raw-text containers are
    /// purged, block elements are space-padded on removal.
    pub static ref DEFAULT: Arc<Policy> = freeze(default_config());
    /// Inline and simple block markup with conservative link protocols.
    pub static ref BASIC: Arc<Policy> = freeze(basic_config());
    /// BASIC plus document structure, tables, and images.
    pub static ref RELAXED: Arc<Policy> = freeze(relaxed_config());
    /// Inline emphasis markup only.
    pub static ref RESTRICTED: Arc<Policy> = freeze(restricted_config());
}

fn freeze(config: ConfigValue) -> Arc<Policy> {
    Arc::new(Policy::from_value(&config).expect("built-in preset configuration is valid"))
}

fn config(value: serde_json::Value) -> ConfigValue {
    serde_json::from_value(value).expect("built-in preset configuration is well-formed")
}

pub fn default_config() -> ConfigValue {
    config(json!({
        "elements": [],
        "attributes": {},
        "protocols": {},
        "remove_contents": REMOVE_CONTENTS_ELEMENTS,
        "whitespace_elements": WHITESPACE_ELEMENTS,
        "allow_comments": false,
        "allow_doctype": true
    }))
}

pub fn basic_config() -> ConfigValue {
    config(json!({
        "elements": [
            "a", "abbr", "blockquote", "b", "br", "cite", "code", "dd", "dfn", "dl", "dt", "em",
            "i", "kbd", "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small", "strike",
            "strong", "sub", "sup", "time", "u", "ul", "var"
        ],
        "attributes": {
            "a": ["href"],
            "abbr": ["title"],
            "blockquote": ["cite"],
            "dfn": ["title"],
            "q": ["cite"],
            "time": ["datetime", "pubdate"]
        },
        "protocols": {
            "a": { "href": ["ftp", "http", "https", "mailto", "relative"] },
            "blockquote": { "cite": ["http", "https", "relative"] },
            "q": { "cite": ["http", "https", "relative"] }
        }
    }))
}

pub fn relaxed_config() -> ConfigValue {
    let base = basic_config();

    // Element allowance is additive over BASIC; merge alone would replace
    // the list, so concatenate first and let set semantics dedup.
    let mut elements = base
        .get("elements")
        .and_then(ConfigValue::as_list)
        .expect("basic preset carries an element list")
        .to_vec();
    elements.extend(
        RELAXED_EXTRA_ELEMENTS
            .iter()
            .map(|s| ConfigValue::Str(s.to_string())),
    );

    let mut overrides = config(json!({
        "allow_doctype": true,
        "attributes": {
            "all": ["class", "dir", "hidden", "id", "lang", "style", "tabindex", "title", "translate"],
            "a": ["href", "hreflang", "name", "rel"],
            "col": ["span", "width"],
            "colgroup": ["span", "width"],
            "data": ["value"],
            "del": ["cite", "datetime"],
            "img": ["align", "alt", "border", "height", "src", "srcset", "width"],
            "ins": ["cite", "datetime"],
            "li": ["value"],
            "ol": ["reversed", "start", "type"],
            "style": ["media", "scoped", "type"],
            "table": ["align", "bgcolor", "border", "cellpadding", "cellspacing", "frame",
                      "rules", "sortable", "summary", "width"],
            "td": ["abbr", "align", "axis", "colspan", "headers", "rowspan", "valign", "width"],
            "th": ["abbr", "align", "axis", "colspan", "headers", "rowspan", "scope", "sorted",
                   "valign", "width"],
            "ul": ["type"]
        },
        "protocols": {
            "del": { "cite": ["http", "https", "relative"] },
            "img": { "src": ["http", "https", "relative"] },
            "ins": { "cite": ["http", "https", "relative"] }
        }
    }));
    if let ConfigValue::Map(map) = &mut overrides {
        map.insert("elements".to_string(), ConfigValue::List(elements));
    }

    merge(&base, &overrides).expect("preset configs are map-shaped")
}

pub fn restricted_config() -> ConfigValue {
    config(json!({
        "elements": ["b", "em", "i", "strong", "u"],
        "whitespace_elements": WHITESPACE_ELEMENTS
    }))
}
