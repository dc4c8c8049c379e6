//! Snapshot tests for human-readable error messages.

use std::collections::HashMap;

use insta::assert_snapshot;
use lexa::parser::compile_expression;
use lexa::{Engine, NestedValue, ResolveError, Value, params};
use serde_json::json;

fn engine() -> Engine {
    let engine = Engine::new();
    engine
        .load_catalog(
            "en",
            &NestedValue::from(json!({
                "messages": { "success": "Done!", "greeting": "Hi {name}" },
                "age": { "$conditional": [ { "when": "age >= 18", "text": "Adult" } ] },
                "bad": "Hello {name"
            })),
        )
        .unwrap();
    engine
}

fn message(key: &str, params: &HashMap<String, Value>) -> String {
    engine().resolve(key, "en", params).unwrap_err().to_string()
}

#[test]
fn missing_key_with_suggestion() {
    assert_snapshot!(
        message("messages.sucess", &params! {}),
        @"missing key 'messages.sucess' in locale 'en' (did you mean: messages.success)"
    );
}

#[test]
fn invalid_key() {
    assert_snapshot!(
        message("messages..success", &params! {}),
        @"invalid key 'messages..success': segment 1 is empty"
    );
}

#[test]
fn no_matching_branch() {
    assert_snapshot!(
        message("age", &params! { "age" => 3 }),
        @"no branch of 'age' in locale 'en' matched the given parameters"
    );
}

#[test]
fn unresolved_variable() {
    assert_snapshot!(
        message("messages.greeting", &params! {}),
        @"unresolved variable 'name'"
    );
}

#[test]
fn type_mismatch() {
    assert_snapshot!(
        message("age", &params! { "age" => "old" }),
        @"type mismatch: cannot apply '>=' to string and integer"
    );
}

#[test]
fn malformed_template() {
    assert_snapshot!(
        message("bad", &params! { "name" => "x" }),
        @"malformed template 'Hello {name': unterminated placeholder at byte 6"
    );
}

#[test]
fn expression_syntax() {
    let err = ResolveError::from(compile_expression("a = ").unwrap_err());
    assert_snapshot!(
        err.to_string(),
        @"invalid expression 'a = ' at byte 4: operator is missing an operand"
    );
}
