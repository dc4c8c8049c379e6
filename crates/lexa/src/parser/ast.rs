//! Public AST types for conditional expressions and templates.
//!
//! These types are public to enable external tooling (linters, formatters, etc.).

use crate::types::Value;

/// A parsed template string containing segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

/// A segment within a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with brace escapes already collapsed.
    Literal(String),
    /// A placeholder naming a parameter: `{name}`.
    Placeholder(String),
}

impl Template {
    /// Names referenced by placeholders, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// A node in a conditional expression tree.
///
/// Each subtree is owned by exactly one parent; expressions are acyclic.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A constant: boolean, integer, float or string.
    Literal(Value),
    /// A reference to a parameter by name.
    Variable(String),
    /// A relational comparison between two operands.
    Comparison {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// A boolean connective. `Not` always has exactly one operand; `And` and
    /// `Or` have two or more.
    Logical { op: LogicalOp, operands: Vec<Expr> },
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Canonical source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// A parsed conditional expression together with the source it came from.
///
/// Compiled expressions are immutable and shared between threads behind an
/// `Arc` once they enter the expression cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    root: Expr,
}

impl CompiledExpression {
    pub(crate) fn new(source: impl Into<String>, root: Expr) -> Self {
        Self {
            source: source.into(),
            root,
        }
    }

    /// The exact source string this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root of the expression tree.
    pub fn root(&self) -> &Expr {
        &self.root
    }
}
