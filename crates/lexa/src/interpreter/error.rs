//! Error types for catalog loading and key resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ExpressionSyntaxError;

/// Errors that occur while building or loading a catalog.
///
/// A load error never installs anything: the previously loaded catalog stays
/// in place untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error when reading a catalog file.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The catalog file could not be parsed in its source format.
    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// The file extension does not name a supported format.
    #[error("unsupported catalog format '{path}': expected .json, .yaml, .yml or .toml")]
    UnsupportedFormat { path: PathBuf },

    /// The nested value does not follow the catalog structure convention.
    #[error("invalid catalog structure at '{path}': {message}")]
    Structure { path: String, message: String },

    /// Attempted to reload a locale that was not loaded from a file.
    #[error("cannot reload '{locale}': was not loaded from a file")]
    NoPathForReload { locale: String },
}

/// An error that occurred while resolving a key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The key does not name a translatable entry in the locale.
    #[error("missing key '{key}' in locale '{locale}'{}", format_suggestions(.suggestions))]
    MissingKey {
        key: String,
        locale: String,
        suggestions: Vec<String>,
    },

    /// The key is syntactically malformed.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// No conditional arm matched and the entry has no default.
    #[error("no branch of '{key}' in locale '{locale}' matched the given parameters")]
    NoMatchingBranch { key: String, locale: String },

    /// A placeholder or expression referenced a parameter that was not given.
    #[error("unresolved variable '{name}'")]
    UnresolvedVariable { name: String },

    /// Operands of an expression have incompatible types.
    #[error("type mismatch: cannot apply '{op}' to {}", .operands.join(" and "))]
    TypeMismatch {
        op: String,
        operands: Vec<&'static str>,
    },

    /// A conditional arm expression failed to parse.
    #[error(transparent)]
    ExpressionSyntax(#[from] ExpressionSyntaxError),

    /// A template contains an unterminated placeholder.
    #[error("malformed template '{template}': unterminated placeholder at byte {offset}")]
    MalformedTemplate { template: String, offset: usize },
}

impl ResolveError {
    /// Whether this error is recoverable by caller policy (`strict` or
    /// `fallback_locale`) rather than an authoring defect.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            ResolveError::MissingKey { .. } | ResolveError::InvalidKey { .. }
        )
    }

    /// Whether a resolution in the fallback locale should be attempted.
    pub fn allows_fallback(&self) -> bool {
        matches!(
            self,
            ResolveError::MissingKey { .. } | ResolveError::NoMatchingBranch { .. }
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {})", suggestions.join(", "))
    }
}

/// Compute "did you mean" suggestions for a mistyped name.
///
/// Returns up to three candidates within a Levenshtein distance of 1 (for
/// names of three characters or fewer) or 2 (longer names), closest first.
pub fn compute_suggestions(target: &str, available: &[String]) -> Vec<String> {
    let max_distance = if target.chars().count() <= 3 { 1 } else { 2 };
    let mut scored: Vec<(usize, &String)> = available
        .iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance && *distance > 0)
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(3)
        .map(|(_, candidate)| candidate.clone())
        .collect()
}
