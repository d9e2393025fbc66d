//! Operator semantics for evaluated values

use super::node::{BinOp, UnaryOp};
use crate::interp::{InterpResult, RuntimeError, Value};

/// Largest string (in bytes) or list a repetition may produce
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

pub fn binary(op: BinOp, left: Value, right: Value) -> InterpResult<Value> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => arithmetic(op, left, right, |a, b| Ok(a - b)),
        BinOp::Mul => multiply(left, right),
        BinOp::Div => arithmetic(op, left, right, |a, b| {
            if b == 0.0 {
                Err(RuntimeError::division_by_zero())
            } else {
                Ok(a / b)
            }
        }),
        BinOp::Pow => arithmetic(op, left, right, power),
        BinOp::BitXor => arithmetic(op, left, right, |a, b| {
            match (integral(a), integral(b)) {
                (Some(a), Some(b)) => Ok((a ^ b) as f64),
                _ => Err(RuntimeError::type_error(
                    "unsupported operand for ^: operands must be integral",
                )),
            }
        }),
        BinOp::MatMul => matmul(&left, &right),
        other => Err(RuntimeError::unsafe_expression(&format!("operator `{other}`"))),
    }
}

pub fn unary(op: UnaryOp, operand: Value) -> InterpResult<Value> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Neg, other) => Err(RuntimeError::type_error(format!(
            "bad operand type for unary -: '{}'",
            other.type_name()
        ))),
        (other, _) => Err(RuntimeError::unsafe_expression(&format!("unary `{other}`"))),
    }
}

/// `value[index]`
pub fn subscript(value: Value, index: Value) -> InterpResult<Value> {
    match (value, index) {
        (Value::List(items), Value::Number(n)) => {
            let at = resolve_index(n, items.len())?;
            Ok(items[at].clone())
        }
        (Value::Str(s), Value::Number(n)) => {
            let chars: Vec<char> = s.chars().collect();
            let at = resolve_index(n, chars.len())?;
            Ok(Value::Str(chars[at].to_string()))
        }
        (Value::Map(bindings), Value::Str(key)) => bindings
            .get(&key)
            .cloned()
            .ok_or_else(|| RuntimeError::key_not_found(&key)),
        (Value::Env(env), Value::Str(key)) => env
            .borrow()
            .get(&key)
            .ok_or_else(|| RuntimeError::key_not_found(&key)),
        (value, index) => Err(RuntimeError::type_error(format!(
            "'{}' cannot be indexed by '{}'",
            value.type_name(),
            index.type_name()
        ))),
    }
}

fn arithmetic(
    op: BinOp,
    left: Value,
    right: Value,
    f: impl Fn(f64, f64) -> InterpResult<f64>,
) -> InterpResult<Value> {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => f(*a, *b).map(Value::Number),
        _ => Err(unsupported(op, &left, &right)),
    }
}

fn add(left: Value, right: Value) -> InterpResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (left, right) => Err(unsupported(BinOp::Add, &left, &right)),
    }
}

fn multiply(left: Value, right: Value) -> InterpResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (Value::Str(s), Value::Number(n)) | (Value::Number(n), Value::Str(s)) => {
            let count = repeat_count(n, s.len())?;
            Ok(Value::Str(s.repeat(count)))
        }
        (Value::List(items), Value::Number(n)) | (Value::Number(n), Value::List(items)) => {
            let count = repeat_count(n, items.len())?;
            if items.is_empty() {
                return Ok(Value::List(items));
            }
            let mut out = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::List(out))
        }
        (left, right) => Err(unsupported(BinOp::Mul, &left, &right)),
    }
}

fn power(base: f64, exp: f64) -> InterpResult<f64> {
    if base == 0.0 && exp < 0.0 {
        return Err(RuntimeError::division_by_zero());
    }
    if base < 0.0 && exp.fract() != 0.0 {
        return Err(RuntimeError::type_error(
            "negative number cannot be raised to a fractional power",
        ));
    }
    Ok(base.powf(exp))
}

/// `@` over nested lists: vector·vector, matrix×vector, vector×matrix,
/// matrix×matrix
fn matmul(left: &Value, right: &Value) -> InterpResult<Value> {
    match (as_matrix(left), as_matrix(right)) {
        (Some(a), Some(b)) => {
            let inner = b.len();
            if a.iter().any(|row| row.len() != inner) {
                return Err(shape_mismatch());
            }
            let cols = b.first().map_or(0, Vec::len);
            let rows = a
                .iter()
                .map(|row| {
                    let out = (0..cols)
                        .map(|j| Value::Number(row.iter().zip(&b).map(|(x, r)| x * r[j]).sum()))
                        .collect();
                    Value::List(out)
                })
                .collect();
            return Ok(Value::List(rows));
        }
        (Some(a), None) => {
            if let Some(v) = as_vector(right) {
                if a.iter().any(|row| row.len() != v.len()) {
                    return Err(shape_mismatch());
                }
                return Ok(Value::List(a.iter().map(|row| Value::Number(dot(row, &v))).collect()));
            }
        }
        (None, Some(b)) => {
            if let Some(v) = as_vector(left) {
                if v.len() != b.len() {
                    return Err(shape_mismatch());
                }
                let cols = b.first().map_or(0, Vec::len);
                let out = (0..cols)
                    .map(|j| Value::Number(v.iter().zip(&b).map(|(x, r)| x * r[j]).sum()))
                    .collect();
                return Ok(Value::List(out));
            }
        }
        (None, None) => {
            if let (Some(a), Some(b)) = (as_vector(left), as_vector(right)) {
                if a.len() != b.len() {
                    return Err(shape_mismatch());
                }
                return Ok(Value::Number(dot(&a, &b)));
            }
        }
    }
    Err(unsupported(BinOp::MatMul, left, right))
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn as_vector(value: &Value) -> Option<Vec<f64>> {
    value.as_list()?.iter().map(Value::as_number).collect()
}

/// Non-empty list of equally long numeric rows
fn as_matrix(value: &Value) -> Option<Vec<Vec<f64>>> {
    let rows = value.as_list()?;
    if rows.is_empty() {
        return None;
    }
    let matrix: Vec<Vec<f64>> = rows.iter().map(as_vector).collect::<Option<_>>()?;
    let width = matrix[0].len();
    matrix.iter().all(|row| row.len() == width).then_some(matrix)
}

fn shape_mismatch() -> RuntimeError {
    RuntimeError::type_error("matmul: operand shapes are not aligned")
}

fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

/// Repetition count for a sequence of `len` items, bounded by `MAX_SEQUENCE_LEN`
fn repeat_count(n: f64, len: usize) -> InterpResult<usize> {
    let count = integral(n)
        .ok_or_else(|| RuntimeError::type_error("can't multiply sequence by non-integral count"))?;
    let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
    match len.checked_mul(count) {
        Some(total) if total <= MAX_SEQUENCE_LEN => Ok(count),
        _ => Err(RuntimeError::sequence_too_large(MAX_SEQUENCE_LEN)),
    }
}

fn resolve_index(n: f64, len: usize) -> InterpResult<usize> {
    let index =
        integral(n).ok_or_else(|| RuntimeError::type_error("indices must be integral numbers"))?;
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(RuntimeError::index_out_of_bounds(index, len));
    }
    Ok(resolved as usize)
}

fn unsupported(op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "unsupported operand types for {op}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Bindings, ErrorKind};

    fn n(x: f64) -> Value {
        Value::Number(x)
    }

    fn list(xs: &[f64]) -> Value {
        Value::List(xs.iter().map(|x| n(*x)).collect())
    }

    fn kind(result: InterpResult<Value>) -> Option<ErrorKind> {
        result.err().map(|e| e.kind)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(binary(BinOp::Add, n(2.0), n(3.0)).ok(), Some(n(5.0)));
        assert_eq!(binary(BinOp::Sub, n(2.0), n(3.0)).ok(), Some(n(-1.0)));
        assert_eq!(binary(BinOp::Div, n(7.0), n(2.0)).ok(), Some(n(3.5)));
        assert_eq!(binary(BinOp::Pow, n(2.0), n(-1.0)).ok(), Some(n(0.5)));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(kind(binary(BinOp::Div, n(1.0), n(0.0))), Some(ErrorKind::DivisionByZero));
        assert_eq!(kind(binary(BinOp::Pow, n(0.0), n(-1.0))), Some(ErrorKind::DivisionByZero));
    }

    #[test]
    fn test_xor_requires_integral() {
        assert_eq!(binary(BinOp::BitXor, n(6.0), n(3.0)).ok(), Some(n(5.0)));
        assert_eq!(kind(binary(BinOp::BitXor, n(1.5), n(3.0))), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_sequence_concat_and_repeat() {
        assert_eq!(
            binary(BinOp::Add, Value::from("ab"), Value::from("c")).ok(),
            Some(Value::from("abc"))
        );
        assert_eq!(
            binary(BinOp::Mul, Value::from("ab"), n(2.0)).ok(),
            Some(Value::from("abab"))
        );
        assert_eq!(
            binary(BinOp::Mul, n(2.0), list(&[1.0])).ok(),
            Some(list(&[1.0, 1.0]))
        );
        assert_eq!(binary(BinOp::Add, list(&[1.0]), list(&[2.0])).ok(), Some(list(&[1.0, 2.0])));
    }

    #[test]
    fn test_huge_repeat_is_an_error() {
        for (left, right) in [
            (Value::from("ab"), n(9e18)),
            (list(&[1.0, 2.0]), n(9e18)),
            (n(9e18), Value::from("ab")),
        ] {
            let err = binary(BinOp::Mul, left, right).err();
            assert_eq!(err.map(|e| e.kind), Some(ErrorKind::SequenceTooLarge));
        }
        let limit = MAX_SEQUENCE_LEN as f64;
        assert!(binary(BinOp::Mul, Value::from("a"), n(limit)).is_ok());
        assert!(binary(BinOp::Mul, Value::from("a"), n(limit + 1.0)).is_err());
    }

    #[test]
    fn test_empty_sequence_repeat() {
        assert_eq!(binary(BinOp::Mul, Value::from(""), n(9e18)).ok(), Some(Value::from("")));
        assert_eq!(binary(BinOp::Mul, list(&[]), n(9e18)).ok(), Some(list(&[])));
    }

    #[test]
    fn test_mixed_types_rejected() {
        assert_eq!(kind(binary(BinOp::Add, n(1.0), Value::from("a"))), Some(ErrorKind::TypeError));
        assert_eq!(kind(binary(BinOp::Sub, Value::from("a"), n(1.0))), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_matmul() {
        let m = Value::List(vec![list(&[1.0, 2.0]), list(&[3.0, 4.0])]);
        assert_eq!(binary(BinOp::MatMul, list(&[1.0, 2.0]), list(&[3.0, 4.0])).ok(), Some(n(11.0)));
        assert_eq!(binary(BinOp::MatMul, m.clone(), list(&[1.0, 1.0])).ok(), Some(list(&[3.0, 7.0])));
        assert_eq!(binary(BinOp::MatMul, list(&[1.0, 1.0]), m.clone()).ok(), Some(list(&[4.0, 6.0])));
        assert_eq!(
            binary(BinOp::MatMul, m.clone(), m).ok(),
            Some(Value::List(vec![list(&[7.0, 10.0]), list(&[15.0, 22.0])]))
        );
        assert_eq!(
            kind(binary(BinOp::MatMul, list(&[1.0]), list(&[1.0, 2.0]))),
            Some(ErrorKind::TypeError)
        );
    }

    #[test]
    fn test_disallowed_op_fails_closed() {
        assert_eq!(
            kind(binary(BinOp::FloorDiv, n(1.0), n(2.0))),
            Some(ErrorKind::UnsafeExpression)
        );
        assert_eq!(kind(unary(UnaryOp::Not, n(1.0))), Some(ErrorKind::UnsafeExpression));
    }

    #[test]
    fn test_subscript_lists_and_strings() {
        let xs = list(&[10.0, 20.0, 30.0]);
        assert_eq!(subscript(xs.clone(), n(0.0)).ok(), Some(n(10.0)));
        assert_eq!(subscript(xs.clone(), n(-1.0)).ok(), Some(n(30.0)));
        assert_eq!(kind(subscript(xs.clone(), n(3.0))), Some(ErrorKind::IndexOutOfBounds));
        assert_eq!(kind(subscript(xs, n(0.5))), Some(ErrorKind::TypeError));
        assert_eq!(subscript(Value::from("héllo"), n(1.0)).ok(), Some(Value::from("é")));
    }

    #[test]
    fn test_subscript_mappings() {
        let mut bindings = Bindings::new();
        bindings.insert("k".into(), n(1.0));
        let map = Value::Map(bindings);
        assert_eq!(subscript(map.clone(), Value::from("k")).ok(), Some(n(1.0)));
        assert_eq!(kind(subscript(map, Value::from("z"))), Some(ErrorKind::KeyNotFound));
    }
}
