//! Integration tests for loading catalogs from files.

use std::io::{Seek, Write};

use lexa::catalog::Format;
use lexa::{Engine, LoadError, NestedValue, load_nested_file, params};
use tempfile::{Builder, NamedTempFile};

fn catalog_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{content}").unwrap();
    file
}

fn rewrite(file: &mut NamedTempFile, content: &str) {
    file.as_file_mut().set_len(0).unwrap();
    file.rewind().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
}

// =========================================================================
// Formats
// =========================================================================

#[test]
fn loads_json() {
    let file = catalog_file(".json", r#"{ "messages": { "success": "Done!" } }"#);
    let engine = Engine::new();
    assert_eq!(engine.load_catalog_file("en", file.path()).unwrap(), 1);
    assert_eq!(
        engine.resolve("messages.success", "en", &params! {}).unwrap(),
        "Done!"
    );
}

#[test]
fn loads_yaml_conditionals() {
    let file = catalog_file(
        ".yaml",
        r#"
age:
  $conditional:
    - when: "[age] >= 18"
      text: Adult
    - when: "[age] >= 0"
      text: Minor
  $default: Unknown
"#,
    );
    let engine = Engine::new();
    engine.load_catalog_file("en", file.path()).unwrap();
    let age = |n: i64| engine.resolve("age", "en", &params! { "age" => n }).unwrap();
    assert_eq!(age(30), "Adult");
    assert_eq!(age(3), "Minor");
    assert_eq!(age(-3), "Unknown");
}

#[test]
fn loads_toml() {
    let file = catalog_file(
        ".toml",
        r#"
[greeting]
hello = "Hello, {name}!"
"#,
    );
    let engine = Engine::new();
    engine.load_catalog_file("en", file.path()).unwrap();
    assert_eq!(
        engine
            .resolve("greeting.hello", "en", &params! { "name" => "Ada" })
            .unwrap(),
        "Hello, Ada!"
    );
}

#[test]
fn yaml_mappings_keep_document_order() {
    let file = catalog_file(".yml", "z: Z\na: A\nm: M\n");
    let value = load_nested_file(file.path()).unwrap();
    let NestedValue::Mapping(entries) = value else {
        panic!("expected mapping");
    };
    let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

// =========================================================================
// Errors
// =========================================================================

#[test]
fn unsupported_extension_is_rejected() {
    let file = catalog_file(".ini", "a = b");
    assert!(Format::from_path(file.path()).is_none());
    assert!(matches!(
        load_nested_file(file.path()),
        Err(LoadError::UnsupportedFormat { .. })
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert!(matches!(
        load_nested_file(&path),
        Err(LoadError::Io { .. })
    ));
}

#[test]
fn syntax_errors_are_parse_errors() {
    let file = catalog_file(".json", "{ \"a\": ");
    assert!(matches!(
        load_nested_file(file.path()),
        Err(LoadError::Parse { .. })
    ));
}

#[test]
fn structure_errors_name_the_path() {
    let file = catalog_file(".json", r#"{ "menu": { "items": [1, 2] } }"#);
    let err = Engine::new().load_catalog_file("en", file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Structure { ref path, .. } if path == "menu.items"));
}

// =========================================================================
// Hot Reload
// =========================================================================

#[test]
fn reload_picks_up_file_changes() {
    let mut file = catalog_file(".json", r#"{ "hi": "Hello" }"#);
    let engine = Engine::new();
    engine.load_catalog_file("en", file.path()).unwrap();
    assert_eq!(engine.resolve("hi", "en", &params! {}).unwrap(), "Hello");

    rewrite(&mut file, r#"{ "hi": "Howdy" }"#);
    engine.reload_catalog("en").unwrap();
    assert_eq!(engine.resolve("hi", "en", &params! {}).unwrap(), "Howdy");
}

#[test]
fn failed_reload_keeps_previous_tree() {
    let mut file = catalog_file(".json", r#"{ "hi": "Hello" }"#);
    let engine = Engine::new();
    engine.load_catalog_file("en", file.path()).unwrap();

    rewrite(&mut file, r#"{ "hi": "#);
    assert!(engine.reload_catalog("en").is_err());
    assert_eq!(engine.resolve("hi", "en", &params! {}).unwrap(), "Hello");
}

#[test]
fn reload_requires_a_file() {
    let engine = Engine::new();
    let value: NestedValue = serde_json::from_str(r#"{ "hi": "Hello" }"#).unwrap();
    engine.load_catalog("en", &value).unwrap();
    assert!(matches!(
        engine.reload_catalog("en"),
        Err(LoadError::NoPathForReload { .. })
    ));
}
