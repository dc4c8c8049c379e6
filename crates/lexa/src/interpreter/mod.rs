//! Resolution of translation keys.
//!
//! This module ties the catalog and the parsers together: it walks dotted
//! keys through the catalog tree, evaluates conditional arms, substitutes
//! placeholders and caches the results.

mod cache;
mod compiler;
mod engine;
mod error;
mod evaluator;
mod lint;
mod path;
mod substitute;

pub use cache::{CacheKey, CacheStats, ResolutionCache};
pub use compiler::ExpressionCompiler;
pub use engine::{Engine, EngineConfig, ResolveOptions};
pub use error::{LoadError, ResolveError, compute_suggestions};
pub use evaluator::{evaluate, select_branch};
pub use lint::{CatalogIssue, IssueKind, Severity, validate_catalog};
pub use path::{resolve_path, split_key};
pub use substitute::{EscapeSet, render, substitute};
