//! Policy construction: merging, JSON ingestion, validation errors, and
//! sharing a frozen policy across threads.

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use ramparts::policy::presets;
use ramparts::{merge, ConfigValue, Fragment, Node, Policy, SanitizeError, Sanitizer};

#[test]
fn test_preset_override_replaces_lists_and_merges_maps() {
    let overrides: ConfigValue = serde_json::from_value(serde_json::json!({
        "elements": ["a"],
        "attributes": { "a": ["href", "rel"] }
    }))
    .unwrap();
    let merged = merge(&presets::basic_config(), &overrides).unwrap();
    let policy = Policy::from_value(&merged).unwrap();

    // The override element list replaced BASIC's entirely.
    assert!(policy.allows_element("a"));
    assert!(!policy.allows_element("b"));
    // The attributes map merged per key: "a" replaced, "abbr" untouched.
    assert!(policy.allows_attribute("a", "rel"));
    assert!(policy.allows_attribute("abbr", "title"));
    // Untouched scalar settings carried over from the base.
    assert!(!policy.allow_comments());
}

#[test]
fn test_empty_preset_maps_accept_overrides() {
    let overrides: ConfigValue = serde_json::from_value(serde_json::json!({
        "elements": ["a"],
        "attributes": { "a": ["href"] },
        "protocols": { "a": { "href": ["https"] } }
    }))
    .unwrap();
    // DEFAULT's attributes and protocols maps are empty.
    let merged = merge(&presets::default_config(), &overrides).unwrap();
    let policy = Policy::from_value(&merged).unwrap();

    assert!(policy.allows_attribute("a", "href"));
    assert!(policy.protocols_for("a", "href").is_some());
    // DEFAULT's raw-text purge list survives untouched.
    assert!(policy.removes_contents("script"));
}

#[test]
fn test_json_policy_end_to_end() {
    let policy = Policy::from_json(
        r#"{
            "elements": ["p", "a"],
            "attributes": { "a": ["href"] },
            "protocols": { "a": { "href": ["https", "relative"] } },
            "allow_comments": false
        }"#,
    )
    .unwrap();
    let sanitizer = Sanitizer::new(policy.into());

    let mut fragment = Fragment::new(vec![Node::element("p").with_children(vec![
        Node::element("a")
            .with_attribute("href", "https://example.com/")
            .with_children(vec![Node::text("ok")]),
        Node::element("a")
            .with_attribute("href", "ftp://example.com/")
            .with_children(vec![Node::text("no scheme match")]),
    ])]);
    sanitizer.sanitize_fragment(&mut fragment).unwrap();

    let p = &fragment.children[0];
    assert_eq!(p.children[0].element_attributes().unwrap().len(), 1);
    assert!(p.children[1].element_attributes().unwrap().is_empty());
}

#[test]
fn test_unknown_keys_are_ignored() {
    let policy = Policy::from_json(r#"{ "bogus": 1, "elements": ["b"] }"#).unwrap();
    assert!(policy.allows_element("b"));
}

#[test]
fn test_malformed_configs_error() {
    assert!(matches!(
        Policy::from_json(r#"["not", "a", "map"]"#),
        Err(SanitizeError::Config(_))
    ));
    assert!(matches!(
        Policy::from_json(r#"{ "elements": "b" }"#),
        Err(SanitizeError::Config(_))
    ));
    assert!(matches!(
        Policy::from_json(r#"{ "remove_contents": "script" }"#),
        Err(SanitizeError::Config(_))
    ));
    assert!(matches!(
        Policy::from_json(r#"{ "required_attributes": { "all": ["href"] } }"#),
        Err(SanitizeError::Config(_))
    ));
    assert!(matches!(
        Policy::from_json(r#"{ "allow_comments": "yes" }"#),
        Err(SanitizeError::Config(_))
    ));
}

#[test]
fn test_depth_limit_is_configurable_and_disableable() {
    let deep = |levels: usize| {
        let mut node = Node::text("bottom");
        for _ in 0..levels {
            node = Node::element("div").with_children(vec![node]);
        }
        Fragment::new(vec![node])
    };

    let policy = Policy::from_json(r#"{ "parser_options": { "max_tree_depth": 3 } }"#).unwrap();
    let sanitizer = Sanitizer::new(policy.into());
    assert!(sanitizer.sanitize_fragment(&mut deep(2)).is_ok());
    assert_eq!(
        sanitizer.sanitize_fragment(&mut deep(3)).unwrap_err(),
        SanitizeError::ResourceLimit { depth: 4, limit: 3 }
    );

    let policy = Policy::from_json(r#"{ "parser_options": { "max_tree_depth": -1 } }"#).unwrap();
    let sanitizer = Sanitizer::new(policy.into());
    let mut fragment = deep(450);
    assert!(sanitizer.sanitize_fragment(&mut fragment).is_ok());
    assert_eq!(fragment.text_content(), "bottom");
}

#[test]
fn test_frozen_policy_is_shared_across_threads() {
    let policy = Arc::clone(&presets::BASIC);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                let sanitizer = Sanitizer::new(policy);
                let mut fragment = Fragment::new(vec![
                    Node::element("b").with_children(vec![Node::text("bold")]),
                    Node::element("script").with_children(vec![Node::text("evil()")]),
                ]);
                sanitizer.sanitize_fragment(&mut fragment).unwrap();
                fragment.text_content()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "bold");
    }
}
