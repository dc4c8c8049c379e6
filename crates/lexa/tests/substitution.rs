//! Integration tests for template tokenizing and placeholder substitution.

use lexa::interpreter::{EscapeSet, substitute};
use lexa::parser::{Segment, parse_template};
use lexa::{ParamSnapshot, ResolveError, Value};

fn sub(template: &str, params: &ParamSnapshot) -> Result<String, ResolveError> {
    substitute(template, params, &EscapeSet::none())
}

fn name_alice() -> ParamSnapshot {
    ParamSnapshot::from_pairs([("name", "Alice")])
}

// =========================================================================
// Tokenizer
// =========================================================================

#[test]
fn placeholder_allows_surrounding_whitespace() {
    let template = parse_template("{  name }").unwrap();
    assert_eq!(template.segments, vec![Segment::Placeholder("name".into())]);
}

#[test]
fn placeholders_are_listed_in_order() {
    let template = parse_template("{b} and {a} and {b}").unwrap();
    assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["b", "a", "b"]);
}

#[test]
fn brace_escapes_collapse_into_literals() {
    let template = parse_template("{{name}}").unwrap();
    assert_eq!(template.segments, vec![Segment::Literal("{name}".into())]);
}

#[test]
fn unterminated_brace_reports_offset() {
    assert_eq!(parse_template("Hello {name").unwrap_err().offset, 6);
    assert_eq!(parse_template("{").unwrap_err().offset, 0);
}

#[test]
fn long_literal_runs_tokenize() {
    let text = "x".repeat(100_000);
    let template = parse_template(&text).unwrap();
    assert_eq!(template.segments, vec![Segment::Literal(text)]);
}

// =========================================================================
// Substitution
// =========================================================================

#[test]
fn substitutes_named_parameter() {
    assert_eq!(sub("Hello, {name}!", &name_alice()).unwrap(), "Hello, Alice!");
}

#[test]
fn missing_parameter_is_unresolved() {
    let err = sub("Hello, {name}!", &ParamSnapshot::empty()).unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnresolvedVariable {
            name: "name".to_string()
        }
    );
}

#[test]
fn non_ascii_placeholder_names_are_substituted() {
    let params = ParamSnapshot::from_pairs([("año", 3)]);
    assert_eq!(sub("Tienes {año} años", &params).unwrap(), "Tienes 3 años");

    let err = sub("Tienes {año} años", &ParamSnapshot::empty()).unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnresolvedVariable {
            name: "año".to_string()
        }
    );
}

#[test]
fn unmatched_braces_pass_through() {
    let params = name_alice();
    assert_eq!(sub("{not a name} {name}", &params).unwrap(), "{not a name} Alice");
    assert_eq!(sub("a } b", &params).unwrap(), "a } b");
    assert_eq!(sub("{1} {name}", &params).unwrap(), "{1} Alice");
}

#[test]
fn unterminated_placeholder_is_malformed() {
    let err = sub("Hello {name", &name_alice()).unwrap_err();
    assert_eq!(
        err,
        ResolveError::MalformedTemplate {
            template: "Hello {name".to_string(),
            offset: 6
        }
    );
}

#[test]
fn values_render_canonically() {
    let params = ParamSnapshot::from_pairs([
        ("i", Value::Integer(42)),
        ("f", Value::Float(2.5)),
        ("whole", Value::Float(3.0)),
        ("t", Value::Boolean(false)),
    ]);
    assert_eq!(sub("{i}|{f}|{whole}|{t}", &params).unwrap(), "42|2.5|3|false");
}

#[test]
fn values_are_not_rescanned() {
    let params = ParamSnapshot::from_pairs([("a", "{b}"), ("b", "nope")]);
    assert_eq!(sub("{a}", &params).unwrap(), "{b}");
}

#[test]
fn escape_set_applies_to_string_values_only() {
    let params = ParamSnapshot::from_pairs([("user", "<script>")]);
    let text = substitute("<b>{user}</b>", &params, &EscapeSet::html()).unwrap();
    assert_eq!(text, "<b>&lt;script&gt;</b>");
}

#[test]
fn custom_escape_set() {
    let params = ParamSnapshot::from_pairs([("path", "a/b")]);
    let escape = EscapeSet::none().with('/', "%2F");
    assert_eq!(substitute("{path}", &params, &escape).unwrap(), "a%2Fb");
}
