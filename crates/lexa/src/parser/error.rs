//! Parse error types for expressions and templates.

use thiserror::Error;

/// A conditional expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression '{expression}' at byte {offset}: {reason}")]
pub struct ExpressionSyntaxError {
    /// The full expression source.
    pub expression: String,
    /// Byte offset of the offending input.
    pub offset: usize,
    pub reason: SyntaxReason,
}

/// Why an expression failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxReason {
    #[error("expression is empty")]
    Empty,

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("unknown token")]
    UnknownToken,

    #[error("operator is missing an operand")]
    MissingOperand,

    #[error("unexpected input after a complete expression")]
    TrailingInput,

    #[error("parentheses nested deeper than {max} levels")]
    NestingTooDeep { max: usize },

    #[error("expression is {actual} bytes long (max {max})")]
    TooLong { max: usize, actual: usize },
}

/// A template contains an opening brace that is never closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unterminated placeholder at byte {offset}")]
pub struct TemplateError {
    /// Byte offset of the unterminated `{`.
    pub offset: usize,
}
