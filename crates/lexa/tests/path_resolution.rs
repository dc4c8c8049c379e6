//! Integration tests for dotted-key traversal.

use lexa::catalog::{Branch, Node, build_root};
use lexa::interpreter::{resolve_path, split_key};
use lexa::{NestedValue, ResolveError};
use serde_json::json;

fn root(value: serde_json::Value) -> Branch {
    build_root(&NestedValue::from(value)).unwrap()
}

/// Build `{"s0": {"s1": ... {"s<depth-1>": "leaf"}}}`.
fn chain(depth: usize) -> serde_json::Value {
    (0..depth)
        .rev()
        .fold(json!("leaf"), |inner, i| json!({ format!("s{i}"): inner }))
}

fn key_of(depth: usize) -> String {
    (0..depth)
        .map(|i| format!("s{i}"))
        .collect::<Vec<_>>()
        .join(".")
}

// =========================================================================
// Key Splitting
// =========================================================================

#[test]
fn split_key_returns_segments() {
    assert_eq!(split_key("a.b.c").unwrap(), vec!["a", "b", "c"]);
    assert_eq!(split_key("single").unwrap(), vec!["single"]);
}

#[test]
fn empty_key_is_invalid() {
    assert!(matches!(split_key(""), Err(ResolveError::InvalidKey { .. })));
}

#[test]
fn empty_segments_are_invalid() {
    for key in ["a..b", ".a", "a.", "."] {
        assert!(
            matches!(split_key(key), Err(ResolveError::InvalidKey { .. })),
            "{key} should be invalid"
        );
    }
}

// =========================================================================
// Depth
// =========================================================================

#[test]
fn depth_n_key_resolves_to_leaf() {
    let tree = root(chain(6));
    let node = resolve_path(&tree, &key_of(6), "en").unwrap();
    assert_eq!(node, &Node::Leaf("leaf".to_string()));
}

#[test]
fn key_ending_on_branch_is_missing() {
    let tree = root(chain(6));
    let err = resolve_path(&tree, &key_of(5), "en").unwrap_err();
    assert!(matches!(err, ResolveError::MissingKey { .. }));
}

#[test]
fn key_walking_past_leaf_is_missing() {
    let tree = root(chain(6));
    let key = format!("{}.extra", key_of(6));
    let err = resolve_path(&tree, &key, "en").unwrap_err();
    assert!(matches!(err, ResolveError::MissingKey { .. }));
}

#[test]
fn deep_chain_resolves_without_recursion_limits() {
    let tree = root(chain(200));
    assert!(resolve_path(&tree, &key_of(200), "en").is_ok());
}

#[test]
fn conditional_is_a_terminal_node() {
    let tree = root(json!({
        "items": { "$conditional": [ { "when": "true", "text": "x" } ] }
    }));
    assert!(matches!(
        resolve_path(&tree, "items", "en"),
        Ok(Node::Conditional(_))
    ));
    assert!(matches!(
        resolve_path(&tree, "items.more", "en"),
        Err(ResolveError::MissingKey { .. })
    ));
}

// =========================================================================
// Suggestions
// =========================================================================

#[test]
fn missing_segment_suggests_full_keys() {
    let tree = root(json!({
        "messages": { "success": "Done!", "failure": "Failed" }
    }));
    let err = resolve_path(&tree, "messages.sucess", "en").unwrap_err();
    let ResolveError::MissingKey {
        key,
        locale,
        suggestions,
    } = err
    else {
        panic!("expected MissingKey");
    };
    assert_eq!(key, "messages.sucess");
    assert_eq!(locale, "en");
    assert_eq!(suggestions, vec!["messages.success".to_string()]);
}

#[test]
fn unrelated_names_get_no_suggestions() {
    let tree = root(json!({ "messages": { "success": "Done!" } }));
    let err = resolve_path(&tree, "zzz", "en").unwrap_err();
    assert!(matches!(
        err,
        ResolveError::MissingKey { suggestions, .. } if suggestions.is_empty()
    ));
}
