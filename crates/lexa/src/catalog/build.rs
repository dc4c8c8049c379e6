//! Interpretation of a [`NestedValue`] tree as a catalog tree.
//!
//! Structure convention:
//! - A mapping is a branch; its keys are path segments.
//! - A string is a leaf template.
//! - A mapping with a `$conditional` key is a conditional. Its value is either
//!   a sequence of `{ when, text }` mappings or an ordered mapping from
//!   expression source to template. `$default` may sit beside it.

use std::collections::HashSet;

use super::nested::NestedValue;
use super::node::{Arm, Branch, Conditional, Node};
use crate::interpreter::LoadError;

/// Reserved key marking a conditional node.
pub const CONDITIONAL_KEY: &str = "$conditional";

/// Reserved key holding a conditional node's default template.
pub const DEFAULT_KEY: &str = "$default";

const ARM_WHEN: &str = "when";
const ARM_TEXT: &str = "text";

/// Build a locale's root node from a nested value.
///
/// The root must be a mapping. Fails on the first structural problem, naming
/// the dotted path where it was found; nothing is returned partially built.
pub fn build_root(value: &NestedValue) -> Result<Branch, LoadError> {
    let mut path = Vec::new();
    match value {
        NestedValue::Mapping(entries) if !is_conditional(entries) => {
            build_branch(entries, &mut path)
        }
        NestedValue::Mapping(_) => Err(structure(&path, "the root cannot be a conditional")),
        other => Err(structure(
            &path,
            format!("the root must be a mapping, found {}", other.kind_name()),
        )),
    }
}

fn is_conditional(entries: &[(String, NestedValue)]) -> bool {
    entries.iter().any(|(k, _)| k == CONDITIONAL_KEY)
}

fn build_node(value: &NestedValue, path: &mut Vec<String>) -> Result<Node, LoadError> {
    match value {
        NestedValue::String(template) => Ok(Node::Leaf(template.clone())),
        NestedValue::Mapping(entries) if is_conditional(entries) => {
            build_conditional(entries, path).map(Node::Conditional)
        }
        NestedValue::Mapping(entries) => build_branch(entries, path).map(Node::Branch),
        other => Err(structure(
            path,
            format!("expected a string or mapping, found {}", other.kind_name()),
        )),
    }
}

fn build_branch(
    entries: &[(String, NestedValue)],
    path: &mut Vec<String>,
) -> Result<Branch, LoadError> {
    let mut branch = Branch::new();
    for (segment, child) in entries {
        if segment.is_empty() {
            return Err(structure(path, "empty key"));
        }
        if segment.contains('.') {
            return Err(structure(
                path,
                format!("key '{segment}' contains '.', which separates path segments"),
            ));
        }
        if segment == DEFAULT_KEY {
            return Err(structure(path, "'$default' is only allowed beside '$conditional'"));
        }
        if segment.starts_with('$') {
            return Err(structure(path, format!("unknown reserved key '{segment}'")));
        }
        if branch.contains(segment) {
            return Err(structure(path, format!("duplicate key '{segment}'")));
        }

        path.push(segment.clone());
        let node = build_node(child, path)?;
        path.pop();
        branch.upsert(segment.clone(), node);
    }
    Ok(branch)
}

fn build_conditional(
    entries: &[(String, NestedValue)],
    path: &mut Vec<String>,
) -> Result<Conditional, LoadError> {
    let mut conditional = Conditional::default();
    for (key, value) in entries {
        match key.as_str() {
            CONDITIONAL_KEY => conditional.arms = build_arms(value, path)?,
            DEFAULT_KEY => {
                let Some(template) = value.as_str() else {
                    return Err(structure(
                        path,
                        format!("'$default' must be a string, found {}", value.kind_name()),
                    ));
                };
                conditional.default = Some(template.to_string());
            }
            other => {
                return Err(structure(
                    path,
                    format!("unexpected key '{other}' beside '$conditional'"),
                ));
            }
        }
    }
    Ok(conditional)
}

fn build_arms(value: &NestedValue, path: &[String]) -> Result<Vec<Arm>, LoadError> {
    match value {
        NestedValue::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| build_arm(index, item, path))
            .collect(),
        NestedValue::Mapping(pairs) => {
            let mut seen = HashSet::new();
            pairs
                .iter()
                .enumerate()
                .map(|(index, (when, template))| {
                    if !seen.insert(when.as_str()) {
                        return Err(structure(
                            path,
                            format!("duplicate arm expression '{when}'"),
                        ));
                    }
                    let Some(template) = template.as_str() else {
                        return Err(structure(
                            path,
                            format!(
                                "arm {index} template must be a string, found {}",
                                template.kind_name()
                            ),
                        ));
                    };
                    Ok(Arm::new(when.as_str(), template))
                })
                .collect()
        }
        other => Err(structure(
            path,
            format!(
                "'$conditional' must be a sequence or mapping of arms, found {}",
                other.kind_name()
            ),
        )),
    }
}

fn build_arm(index: usize, item: &NestedValue, path: &[String]) -> Result<Arm, LoadError> {
    let NestedValue::Mapping(fields) = item else {
        return Err(structure(
            path,
            format!("arm {index} must be a mapping, found {}", item.kind_name()),
        ));
    };

    let mut when = None;
    let mut text = None;
    for (field, value) in fields {
        let slot = match field.as_str() {
            ARM_WHEN => &mut when,
            ARM_TEXT => &mut text,
            other => {
                return Err(structure(
                    path,
                    format!("arm {index} has unexpected field '{other}'"),
                ));
            }
        };
        let Some(s) = value.as_str() else {
            return Err(structure(
                path,
                format!(
                    "arm {index} field '{field}' must be a string, found {}",
                    value.kind_name()
                ),
            ));
        };
        *slot = Some(s.to_string());
    }

    let when = when.ok_or_else(|| structure(path, format!("arm {index} is missing '{ARM_WHEN}'")))?;
    let text = text.ok_or_else(|| structure(path, format!("arm {index} is missing '{ARM_TEXT}'")))?;
    Ok(Arm::new(when, text))
}

fn structure(path: &[String], message: impl Into<String>) -> LoadError {
    let path = if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    };
    LoadError::Structure {
        path,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<Branch, LoadError> {
        build_root(&NestedValue::from(value))
    }

    fn error_path(err: LoadError) -> String {
        match err {
            LoadError::Structure { path, .. } => path,
            other => panic!("expected structure error, got {other:?}"),
        }
    }

    #[test]
    fn sequence_arms_keep_declaration_order() {
        let root = build(json!({
            "age": {
                "$conditional": [
                    { "when": "age >= 18", "text": "Adult" },
                    { "when": "age >= 0", "text": "Minor" }
                ]
            }
        }))
        .unwrap();
        let Some(Node::Conditional(cond)) = root.get("age") else {
            panic!("expected conditional");
        };
        assert_eq!(cond.arms[0], Arm::new("age >= 18", "Adult"));
        assert_eq!(cond.arms[1], Arm::new("age >= 0", "Minor"));
        assert_eq!(cond.default, None);
    }

    #[test]
    fn mapping_arms_and_default() {
        let root = build(json!({
            "items": {
                "$conditional": { "[count] = 0": "No items", "[count] = 1": "One item" },
                "$default": "{count} items"
            }
        }))
        .unwrap();
        let Some(Node::Conditional(cond)) = root.get("items") else {
            panic!("expected conditional");
        };
        assert_eq!(cond.arms.len(), 2);
        assert_eq!(cond.arms[0].when, "[count] = 0");
        assert_eq!(cond.default.as_deref(), Some("{count} items"));
    }

    #[test]
    fn non_string_leaf_names_its_path() {
        let err = build(json!({ "a": { "b": 42 } })).unwrap_err();
        assert_eq!(error_path(err), "a.b");
    }

    #[test]
    fn arm_missing_expression_is_rejected() {
        let err = build(json!({
            "x": { "$conditional": [ { "text": "hi" } ] }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing 'when'"));
    }

    #[test]
    fn dotted_key_is_rejected() {
        let err = build(json!({ "a.b": "x" })).unwrap_err();
        assert!(err.to_string().contains("contains '.'"));
    }

    #[test]
    fn stray_default_is_rejected() {
        let err = build(json!({ "x": { "$default": "d", "y": "z" } })).unwrap_err();
        assert_eq!(error_path(err), "x");
    }

    #[test]
    fn root_must_be_mapping() {
        let err = build(json!("just text")).unwrap_err();
        assert_eq!(error_path(err), "<root>");
    }
}
