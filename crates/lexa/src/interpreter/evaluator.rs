//! Evaluation of compiled conditional expressions.
//!
//! Semantics:
//! - Variables are looked up in the parameter snapshot; a missing variable is
//!   an error, never silently false.
//! - string vs string compares lexicographically, numeric vs numeric
//!   numerically, booleans only support `=` and `!=`.
//! - `and`/`or` short-circuit left to right.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::catalog::Conditional;
use crate::interpreter::{ExpressionCompiler, ResolveError};
use crate::parser::{CompareOp, CompiledExpression, Expr, LogicalOp};
use crate::types::{ParamSnapshot, Value};

/// Evaluate a compiled expression to a boolean.
///
/// # Errors
///
/// - [`ResolveError::UnresolvedVariable`] if a referenced parameter is absent
/// - [`ResolveError::TypeMismatch`] if operands have incompatible types or the
///   expression does not produce a boolean
pub fn evaluate(expr: &CompiledExpression, params: &ParamSnapshot) -> Result<bool, ResolveError> {
    eval_bool(expr.root(), params, "condition")
}

/// Pick the template of the first arm whose expression is true.
///
/// Returns `Ok(None)` when no arm matches and there is no default. Arms after
/// the first true one are never compiled or evaluated.
pub fn select_branch<'a>(
    conditional: &'a Conditional,
    params: &ParamSnapshot,
    compiler: &ExpressionCompiler,
) -> Result<Option<&'a str>, ResolveError> {
    for arm in &conditional.arms {
        let expr = compiler.compile(&arm.when)?;
        if evaluate(&expr, params)? {
            return Ok(Some(&arm.template));
        }
    }
    Ok(conditional.default.as_deref())
}

fn eval_bool(expr: &Expr, params: &ParamSnapshot, context: &str) -> Result<bool, ResolveError> {
    // Peel `not` chains in a loop so their depth does not cost stack.
    let mut expr = expr;
    let mut context = context;
    let mut negate = false;
    while let Expr::Logical {
        op: LogicalOp::Not,
        operands,
    } = expr
    {
        let [operand] = operands.as_slice() else {
            break;
        };
        expr = operand;
        context = "not";
        negate = !negate;
    }
    match eval_node(expr, params)?.as_ref() {
        Value::Boolean(b) => Ok(*b != negate),
        other => Err(ResolveError::TypeMismatch {
            op: context.to_string(),
            operands: vec![other.type_name()],
        }),
    }
}

fn eval_node<'a>(
    expr: &'a Expr,
    params: &'a ParamSnapshot,
) -> Result<Cow<'a, Value>, ResolveError> {
    match expr {
        Expr::Literal(value) => Ok(Cow::Borrowed(value)),
        Expr::Variable(name) => params
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| ResolveError::UnresolvedVariable { name: name.clone() }),
        Expr::Comparison { op, left, right } => {
            let left = eval_node(left, params)?;
            let right = eval_node(right, params)?;
            compare(*op, &left, &right).map(|b| Cow::Owned(Value::Boolean(b)))
        }
        Expr::Logical { op, operands } => {
            eval_logical(*op, operands, params).map(|b| Cow::Owned(Value::Boolean(b)))
        }
    }
}

fn eval_logical(
    op: LogicalOp,
    operands: &[Expr],
    params: &ParamSnapshot,
) -> Result<bool, ResolveError> {
    match op {
        LogicalOp::And => {
            for operand in operands {
                if !eval_bool(operand, params, "and")? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        LogicalOp::Or => {
            for operand in operands {
                if eval_bool(operand, params, "or")? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        LogicalOp::Not => match operands {
            [operand] => Ok(!eval_bool(operand, params, "not")?),
            _ => Err(ResolveError::TypeMismatch {
                op: "not".to_string(),
                operands: operands.iter().map(|_| "expression").collect(),
            }),
        },
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, ResolveError> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(holds(op, a.cmp(b))),
        (Value::Boolean(a), Value::Boolean(b)) => match op {
            CompareOp::Eq => Ok(a == b),
            CompareOp::Ne => Ok(a != b),
            _ => Err(mismatch(op, left, right)),
        },
        _ if left.is_numeric() && right.is_numeric() => Ok(match left.numeric_cmp(right) {
            Some(ordering) => holds(op, ordering),
            // NaN is unordered: only `!=` holds.
            None => op == CompareOp::Ne,
        }),
        _ => Err(mismatch(op, left, right)),
    }
}

fn holds(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}

fn mismatch(op: CompareOp, left: &Value, right: &Value) -> ResolveError {
    ResolveError::TypeMismatch {
        op: op.symbol().to_string(),
        operands: vec![left.type_name(), right.type_name()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_and_ge_include_equality() {
        assert!(holds(CompareOp::Le, Ordering::Equal));
        assert!(holds(CompareOp::Ge, Ordering::Equal));
        assert!(!holds(CompareOp::Lt, Ordering::Equal));
        assert!(!holds(CompareOp::Gt, Ordering::Equal));
    }

    #[test]
    fn nan_is_only_unequal() {
        let nan = Value::Float(f64::NAN);
        assert!(compare(CompareOp::Ne, &nan, &nan).unwrap());
        assert!(!compare(CompareOp::Eq, &nan, &nan).unwrap());
        assert!(!compare(CompareOp::Lt, &nan, &Value::Integer(1)).unwrap());
    }
}
