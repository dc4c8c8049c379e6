//! Parsers for conditional expressions and templates.
//!
//! Both parsers produce public AST types that can be used for evaluation or
//! by external tooling such as catalog linters.

pub mod ast;
pub mod error;
mod expression;
mod template;

pub use ast::*;
pub use error::{ExpressionSyntaxError, SyntaxReason, TemplateError};
pub use expression::{MAX_EXPRESSION_BYTES, MAX_NESTING, compile_expression};
pub use template::parse_template;
