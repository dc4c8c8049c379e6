//! Conditional expression parser using winnow.
//!
//! Precedence, lowest to highest: `or`, `and`, `not`, comparison, atom.
//! - `or` / `||`, `and` / `&&`, `not` / `!`
//! - Comparisons: `=` `==` `!=` `≠` `<` `<=` `≤` `>` `>=` `≥`
//! - Atoms: quoted strings, numbers, `true`/`false`, identifiers, `[identifier]`
//! - Parentheses for grouping

use std::iter;

use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, fail, not, opt, preceded, repeat, terminated};
use winnow::error::{ContextError, ErrMode, StrContext};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use super::ast::{CompareOp, CompiledExpression, Expr, LogicalOp};
use super::error::{ExpressionSyntaxError, SyntaxReason};
use crate::types::Value;

/// Maximum accepted expression length in bytes.
pub const MAX_EXPRESSION_BYTES: usize = 4096;

/// Maximum parenthesis nesting depth.
pub const MAX_NESTING: usize = 64;

const RESERVED: [&str; 5] = ["and", "or", "not", "true", "false"];

const UNBALANCED: &str = "unbalanced";
const MISSING_OPERAND: &str = "missing operand";
const UNKNOWN_TOKEN: &str = "unknown token";

/// Parse a conditional expression into a compiled expression tree.
///
/// # Example
///
/// ```
/// use lexa::parser::{Expr, compile_expression};
///
/// let expr = compile_expression("[age] >= 18 and not banned").unwrap();
/// assert!(matches!(expr.root(), Expr::Logical { .. }));
/// ```
pub fn compile_expression(source: &str) -> Result<CompiledExpression, ExpressionSyntaxError> {
    let error = |offset: usize, reason: SyntaxReason| ExpressionSyntaxError {
        expression: source.to_string(),
        offset,
        reason,
    };

    if source.len() > MAX_EXPRESSION_BYTES {
        return Err(error(
            0,
            SyntaxReason::TooLong {
                max: MAX_EXPRESSION_BYTES,
                actual: source.len(),
            },
        ));
    }
    if source.trim().is_empty() {
        return Err(error(0, SyntaxReason::Empty));
    }
    if let Some(offset) = nesting_overflow(source) {
        return Err(error(offset, SyntaxReason::NestingTooDeep { max: MAX_NESTING }));
    }

    let mut remaining = source;
    match expression(&mut remaining) {
        Ok(root) => {
            let rest = remaining.trim_start();
            if rest.is_empty() {
                Ok(CompiledExpression::new(source, root))
            } else {
                let offset = source.len() - rest.len();
                let reason = if rest.starts_with(')') {
                    SyntaxReason::UnbalancedParentheses
                } else if starts_token(rest) {
                    SyntaxReason::TrailingInput
                } else {
                    SyntaxReason::UnknownToken
                };
                Err(error(offset, reason))
            }
        }
        Err(e) => Err(error(source.len() - remaining.len(), classify(&e))),
    }
}

/// Map the innermost labelled context of a parse failure to a reason.
fn classify(err: &ErrMode<ContextError>) -> SyntaxReason {
    let ctx = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => return SyntaxReason::UnknownToken,
    };
    for context in ctx.context() {
        if let StrContext::Label(label) = context {
            return match *label {
                UNBALANCED => SyntaxReason::UnbalancedParentheses,
                MISSING_OPERAND => SyntaxReason::MissingOperand,
                _ => SyntaxReason::UnknownToken,
            };
        }
    }
    SyntaxReason::UnknownToken
}

/// Returns the offset of the first `(` that exceeds [`MAX_NESTING`].
fn nesting_overflow(source: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, c) in source.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Some(offset);
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Fail at the current position with a labelled, non-recoverable error.
fn fault<O>(input: &mut &str, label: &'static str) -> ModalResult<O> {
    cut_err(fail.context(StrContext::Label(label))).parse_next(input)
}

/// Parse `and_expr (or and_expr)*`.
fn expression(input: &mut &str) -> ModalResult<Expr> {
    let first = and_expr(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded(or_op, and_expr)).parse_next(input)?;
    Ok(fold_logical(LogicalOp::Or, first, rest))
}

/// Parse `not_expr (and not_expr)*`.
fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let first = not_expr(input)?;
    let rest: Vec<Expr> = repeat(0.., preceded(and_op, not_expr)).parse_next(input)?;
    Ok(fold_logical(LogicalOp::And, first, rest))
}

fn fold_logical(op: LogicalOp, first: Expr, rest: Vec<Expr>) -> Expr {
    if rest.is_empty() {
        return first;
    }
    Expr::Logical {
        op,
        operands: iter::once(first).chain(rest).collect(),
    }
}

/// Parse any number of negations followed by a comparison.
///
/// Negations are counted rather than parsed recursively so that long `!!!!`
/// chains cannot exhaust the stack.
fn not_expr(input: &mut &str) -> ModalResult<Expr> {
    let negations: usize = repeat(0.., not_op).parse_next(input)?;
    let mut expr = comparison(input)?;
    for _ in 0..negations {
        expr = Expr::Logical {
            op: LogicalOp::Not,
            operands: vec![expr],
        };
    }
    Ok(expr)
}

/// Parse `operand (cmp_op operand)?`.
fn comparison(input: &mut &str) -> ModalResult<Expr> {
    let left = operand(input)?;
    let Some(op) = opt(preceded(ws, compare_op)).parse_next(input)? else {
        return Ok(left);
    };
    let right = operand(input)?;
    Ok(Expr::Comparison {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Parse an atom or a parenthesized sub-expression.
fn operand(input: &mut &str) -> ModalResult<Expr> {
    ws(input)?;
    if at_operand_boundary(input) {
        return fault(input, MISSING_OPERAND);
    }
    let start = *input;
    match alt((parenthesized, atom)).parse_next(input) {
        Err(ErrMode::Backtrack(_)) => {
            *input = start;
            fault(input, UNKNOWN_TOKEN)
        }
        other => other,
    }
}

fn parenthesized(input: &mut &str) -> ModalResult<Expr> {
    '('.parse_next(input)?;
    let inner = expression(input)?;
    ws(input)?;
    if input.is_empty() {
        return fault(input, UNBALANCED);
    }
    if !input.starts_with(')') {
        return fault(input, UNKNOWN_TOKEN);
    }
    ')'.parse_next(input)?;
    Ok(inner)
}

fn atom(input: &mut &str) -> ModalResult<Expr> {
    alt((
        string_literal.map(|s| Expr::Literal(Value::String(s))),
        number_literal.map(Expr::Literal),
        (|i: &mut &str| keyword(i, "true")).value(Expr::Literal(Value::Boolean(true))),
        (|i: &mut &str| keyword(i, "false")).value(Expr::Literal(Value::Boolean(false))),
        bracketed_variable,
        variable_name.map(Expr::Variable),
    ))
    .parse_next(input)
}

/// Parse a quoted string with `\` escapes.
fn string_literal(input: &mut &str) -> ModalResult<String> {
    let quote: char = one_of(['"', '\'']).parse_next(input)?;
    let mut out = String::new();
    loop {
        let c: char = any.parse_next(input)?;
        match c {
            '\\' => {
                let escaped: char = any.parse_next(input)?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
            }
            c if c == quote => return Ok(out),
            other => out.push(other),
        }
    }
}

/// Parse `-?digits(.digits)?` into an integer or float value.
fn number_literal(input: &mut &str) -> ModalResult<Value> {
    let text: &str = (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .parse_next(input)?;
    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().map(Value::Float)
    } else {
        text.parse::<i64>().ok().map(Value::Integer)
    };
    parsed.ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

/// Parse `[name]`, the bracketed variable form.
fn bracketed_variable(input: &mut &str) -> ModalResult<Expr> {
    delimited(('[', ws), variable_name, (ws, ']'))
        .map(Expr::Variable)
        .parse_next(input)
}

/// Parse an identifier that is not a reserved word.
fn variable_name(input: &mut &str) -> ModalResult<String> {
    (one_of(is_ident_start), take_while(0.., is_ident_cont))
        .take()
        .verify(|name: &str| !RESERVED.contains(&name))
        .map(str::to_string)
        .parse_next(input)
}

fn compare_op(input: &mut &str) -> ModalResult<CompareOp> {
    alt((
        "==".value(CompareOp::Eq),
        "!=".value(CompareOp::Ne),
        "≠".value(CompareOp::Ne),
        "<=".value(CompareOp::Le),
        "≤".value(CompareOp::Le),
        ">=".value(CompareOp::Ge),
        "≥".value(CompareOp::Ge),
        "<".value(CompareOp::Lt),
        ">".value(CompareOp::Gt),
        "=".value(CompareOp::Eq),
    ))
    .parse_next(input)
}

fn or_op(input: &mut &str) -> ModalResult<()> {
    ws(input)?;
    alt(((|i: &mut &str| keyword(i, "or")), "||".void())).parse_next(input)
}

fn and_op(input: &mut &str) -> ModalResult<()> {
    ws(input)?;
    alt(((|i: &mut &str| keyword(i, "and")), "&&".void())).parse_next(input)
}

fn not_op(input: &mut &str) -> ModalResult<()> {
    ws(input)?;
    alt((
        (|i: &mut &str| keyword(i, "not")),
        terminated('!', not('=')).void(),
    ))
    .parse_next(input)
}

/// Match a reserved word that is not the prefix of a longer identifier.
fn keyword(input: &mut &str, word: &'static str) -> ModalResult<()> {
    terminated(word, not(one_of(is_ident_cont)))
        .void()
        .parse_next(input)
}

/// Parse optional whitespace.
fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Whether the input cannot start an operand: end of input, a closing
/// parenthesis, a binary operator or a binary keyword.
fn at_operand_boundary(input: &str) -> bool {
    input.is_empty()
        || input.starts_with([')', '=', '<', '>', '&', '|', '≠', '≤', '≥'])
        || input.starts_with("!=")
        || starts_with_word(input, "and")
        || starts_with_word(input, "or")
}

/// Characters other than identifier characters that can begin a token.
const TOKEN_STARTS: [char; 14] = [
    '"', '\'', '[', '(', '-', '!', '=', '<', '>', '&', '|', '≠', '≤', '≥',
];

/// Whether the input begins with something the tokenizer recognizes.
fn starts_token(input: &str) -> bool {
    input.starts_with(|c: char| is_ident_cont(c) || TOKEN_STARTS.contains(&c))
}

fn starts_with_word(input: &str, word: &str) -> bool {
    input
        .strip_prefix(word)
        .is_some_and(|rest| !rest.starts_with(is_ident_cont))
}

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier.
fn is_ident_cont(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
