//! Integration tests for catalog validation.

use lexa::interpreter::{IssueKind, Severity};
use lexa::{Engine, NestedValue, SyntaxReason, validate_catalog};
use serde_json::json;

fn engine_with(value: serde_json::Value) -> Engine {
    let engine = Engine::new();
    engine.load_catalog("en", &NestedValue::from(value)).unwrap();
    engine
}

#[test]
fn clean_catalog_has_no_issues() {
    let engine = engine_with(json!({
        "hello": "Hello, {name}!",
        "items": {
            "$conditional": [ { "when": "n = 1", "text": "one" } ],
            "$default": "{n} items"
        }
    }));
    assert!(validate_catalog(&engine.catalog()).is_empty());
}

#[test]
fn reports_expression_syntax_with_offset() {
    let engine = engine_with(json!({
        "menu": {
            "label": { "$conditional": [ { "when": "(n > 1", "text": "many" } ], "$default": "x" }
        }
    }));
    let issues = validate_catalog(&engine.catalog());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].key, "menu.label");
    assert_eq!(issues[0].locale, "en");
    let IssueKind::ExpressionSyntax { arm, error } = &issues[0].kind else {
        panic!("expected expression syntax issue");
    };
    assert_eq!(*arm, 0);
    assert_eq!(error.offset, 6);
    assert_eq!(error.reason, SyntaxReason::UnbalancedParentheses);
}

#[test]
fn reports_malformed_templates_in_leaves_and_defaults() {
    let engine = engine_with(json!({
        "a": "broken {x",
        "b": { "$conditional": [ { "when": "true", "text": "ok" } ], "$default": "{y" }
    }));
    let keys: Vec<String> = validate_catalog(&engine.catalog())
        .into_iter()
        .map(|issue| issue.key)
        .collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn empty_conditional_is_an_error() {
    let engine = engine_with(json!({ "e": { "$conditional": [] } }));
    let issues = validate_catalog(&engine.catalog());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::EmptyConditional);
    assert!(issues[0].is_error());
}

#[test]
fn missing_default_is_a_warning() {
    let engine = engine_with(json!({
        "age": { "$conditional": [ { "when": "age >= 18", "text": "Adult" } ] }
    }));
    let issues = validate_catalog(&engine.catalog());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity(), Severity::Warning);
    assert_eq!(
        issues[0].to_string(),
        "en: 'age': conditional has no default and its last arm is not 'true'"
    );
}

#[test]
fn issues_cover_every_locale() {
    let engine = engine_with(json!({ "a": "{" }));
    engine
        .load_catalog("de", &NestedValue::from(json!({ "a": "{" })))
        .unwrap();
    let locales: Vec<String> = validate_catalog(&engine.catalog())
        .into_iter()
        .map(|issue| issue.locale)
        .collect();
    assert_eq!(locales, vec!["de", "en"]);
}
