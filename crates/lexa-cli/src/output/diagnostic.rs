//! Miette diagnostic wrapper for conditional expression errors.
//!
//! Note: This module has an exception for `unused_assignments` because miette
//! derive macros read struct fields in generated code that rustc cannot track.
#![expect(unused_assignments)]

use lexa::{ExpressionSyntaxError, SyntaxReason};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A miette-compatible diagnostic pointing into an expression's source.
///
/// Note: Fields are read by miette derive macros, not directly by code.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid expression: {reason}")]
#[diagnostic(code(lexa::expression))]
pub struct ExpressionDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{reason}")]
    span: SourceSpan,

    reason: SyntaxReason,

    #[help]
    help: Option<String>,
}

impl ExpressionDiagnostic {
    /// Create a diagnostic from an expression error. `origin` names where the
    /// expression came from, e.g. `en:items arm 0`.
    pub fn from_syntax_error(origin: &str, err: &ExpressionSyntaxError) -> Self {
        // Clamp offset to source length to avoid miette panic on out-of-bounds
        let offset = err.offset.min(err.expression.len());
        let len = usize::from(offset < err.expression.len());

        ExpressionDiagnostic {
            src: NamedSource::new(origin, err.expression.clone()),
            span: (offset, len).into(),
            reason: err.reason.clone(),
            help: help_for(&err.reason),
        }
    }
}

fn help_for(reason: &SyntaxReason) -> Option<String> {
    let help = match reason {
        SyntaxReason::UnbalancedParentheses => "every '(' needs a matching ')'",
        SyntaxReason::UnknownToken => {
            "expected a name, [name], number, quoted string, true or false"
        }
        SyntaxReason::MissingOperand => "comparison and boolean operators take two operands",
        SyntaxReason::TrailingInput => {
            "join conditions with 'and' or 'or'; comparisons do not chain"
        }
        SyntaxReason::Empty
        | SyntaxReason::NestingTooDeep { .. }
        | SyntaxReason::TooLong { .. } => return None,
    };
    Some(help.to_string())
}
