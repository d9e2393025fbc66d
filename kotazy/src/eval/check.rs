//! Allow-list check over a whole expression tree

use super::node::{Arg, Expr, ALLOWED_BINOPS, ALLOWED_NODES, ALLOWED_UNARY};
use crate::interp::{InterpResult, RuntimeError};
use crate::util::{STACK_GROW_SIZE, STACK_RED_ZONE};

/// Reject the tree if any node falls outside the allow-lists
///
/// Runs before evaluation, so a rejected expression has no effects.
pub fn check(expr: &Expr) -> InterpResult<()> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || check_node(expr))
}

fn check_node(expr: &Expr) -> InterpResult<()> {
    let kind = expr.kind();
    if !ALLOWED_NODES.contains(&kind) {
        return Err(RuntimeError::unsafe_expression(kind.describe()));
    }

    match expr {
        Expr::Number(_) | Expr::Name(_) => Ok(()),
        Expr::BinOp { op, left, right } => {
            if !ALLOWED_BINOPS.contains(op) {
                return Err(RuntimeError::unsafe_expression(&format!("operator `{op}`")));
            }
            check(left)?;
            check(right)
        }
        Expr::UnaryOp { op, operand } => {
            if !ALLOWED_UNARY.contains(op) {
                return Err(RuntimeError::unsafe_expression(&format!("unary `{op}`")));
            }
            check(operand)
        }
        Expr::Call { func, args } => {
            if !matches!(func.as_ref(), Expr::Name(_)) {
                return Err(RuntimeError::unsafe_expression("call of a computed callee"));
            }
            for arg in args {
                match arg {
                    Arg::Positional(value) => check(value)?,
                    other => return Err(RuntimeError::unsafe_expression(other.describe())),
                }
            }
            Ok(())
        }
        Expr::Subscript { value, index } => {
            check(value)?;
            check(index)
        }
        other => Err(RuntimeError::unsafe_expression(other.kind().describe())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::parser::parse_expression;
    use crate::interp::ErrorKind;

    fn verdict(source: &str) -> InterpResult<()> {
        check(&parse_expression(source).expect("parse"))
    }

    fn rejected(source: &str) -> bool {
        verdict(source).is_err_and(|e| e.kind == ErrorKind::UnsafeExpression)
    }

    #[test]
    fn test_allowed_forms() {
        for source in [
            "1",
            "a",
            "2 + 3 * 4 - 1 / 2",
            "2 ** 8",
            "3 ^ 5",
            "a @ b",
            "-x",
            "f(1, a)",
            "a[0]",
            "m[k][0]",
        ] {
            assert!(verdict(source).is_ok(), "{source}");
        }
    }

    #[test]
    fn test_string_literal_rejected() {
        assert!(rejected("open('x')"));
    }

    #[test]
    fn test_disallowed_operators_rejected() {
        for source in ["7 // 2", "7 % 2", "1 | 2", "1 & 2", "1 << 2", "+1", "~1", "not a"] {
            assert!(rejected(source), "{source}");
        }
    }

    #[test]
    fn test_disallowed_nodes_rejected() {
        for source in [
            "a.b",
            "a.b()",
            "a < b",
            "a and b",
            "1 if a else 2",
            "lambda: 1",
            "[1]",
            "(1, 2)",
            "{}",
            "[x for x in a]",
            "x = 1",
            "True",
            "None",
            "a[1:2]",
        ] {
            assert!(rejected(source), "{source}");
        }
    }

    #[test]
    fn test_call_argument_forms_rejected() {
        assert!(rejected("f(k=1)"));
        assert!(rejected("f(*a)"));
        assert!(rejected("f(**a)"));
        assert!(rejected("f(1)(2)"));
    }

    #[test]
    fn test_nested_violation_found() {
        assert!(rejected("1 + f(2, g('x'))"));
    }

    #[test]
    fn test_message_names_the_form() {
        let err = verdict("a.b").err().map(|e| e.message);
        assert_eq!(err.as_deref(), Some("unsafe expression: attribute access is not allowed"));
    }
}
