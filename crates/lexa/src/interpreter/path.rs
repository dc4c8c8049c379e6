//! Dotted-key traversal over a catalog tree.

use crate::catalog::{Branch, Node};
use crate::interpreter::ResolveError;
use crate::interpreter::error::compute_suggestions;

/// Split a dotted key into its path segments.
///
/// Fails with [`ResolveError::InvalidKey`] if the key is empty or any segment
/// is empty (`"a..b"`, `".a"`, `"a."`).
pub fn split_key(key: &str) -> Result<Vec<&str>, ResolveError> {
    if key.is_empty() {
        return Err(ResolveError::InvalidKey {
            key: key.to_string(),
            reason: "key is empty".to_string(),
        });
    }
    let segments: Vec<&str> = key.split('.').collect();
    if let Some(position) = segments.iter().position(|s| s.is_empty()) {
        return Err(ResolveError::InvalidKey {
            key: key.to_string(),
            reason: format!("segment {position} is empty"),
        });
    }
    Ok(segments)
}

/// Walk `key` from `root` to a leaf or conditional node.
///
/// Runs in O(depth): each segment is one hash lookup in the current branch.
///
/// # Errors
///
/// - [`ResolveError::InvalidKey`] if the key has an empty segment
/// - [`ResolveError::MissingKey`] if a segment is absent, if the path walks
///   past a leaf or conditional, or if it ends on a branch
pub fn resolve_path<'a>(
    root: &'a Branch,
    key: &str,
    locale: &str,
) -> Result<&'a Node, ResolveError> {
    let segments = split_key(key)?;
    walk_segments(root, &segments, key, locale)
}

pub(crate) fn walk_segments<'a>(
    root: &'a Branch,
    segments: &[&str],
    key: &str,
    locale: &str,
) -> Result<&'a Node, ResolveError> {
    let missing = |suggestions: Vec<String>| ResolveError::MissingKey {
        key: key.to_string(),
        locale: locale.to_string(),
        suggestions,
    };

    let mut current = root;
    let last = segments.len() - 1;
    for (depth, segment) in segments.iter().enumerate() {
        let Some(node) = current.get(segment) else {
            return Err(missing(sibling_suggestions(current, segments, depth)));
        };
        match node {
            Node::Branch(next) if depth < last => current = next,
            // A key that names a group is not translatable.
            Node::Branch(_) => return Err(missing(Vec::new())),
            Node::Leaf(_) | Node::Conditional(_) if depth == last => return Ok(node),
            // The path continues past a terminal node.
            Node::Leaf(_) | Node::Conditional(_) => return Err(missing(Vec::new())),
        }
    }
    Err(missing(Vec::new()))
}

/// Suggest full keys whose segment at `depth` is close to the missing one.
fn sibling_suggestions(branch: &Branch, segments: &[&str], depth: usize) -> Vec<String> {
    let siblings: Vec<String> = branch.segments().map(str::to_string).collect();
    let prefix = &segments[..depth];
    compute_suggestions(segments[depth], &siblings)
        .into_iter()
        .map(|candidate| {
            prefix
                .iter()
                .copied()
                .chain([candidate.as_str()])
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect()
}
