//! Scalar expression evaluation shared by [`super::runner::PhysicalPlanRunner`]
//! and [`super::pull::PullExecutor`].
//!
//! Both execution strategies walk the same `Expr` tree down to a leaf value,
//! but they disagree on how a `Column` leaf resolves to a value: the runner
//! goes through `EvalContext` to handle join column reordering, while the
//! pull operators only ever see their child's already-concrete output row.
//! That one case is left to each caller; everything below a column lookup
//! (binary/unary ops, arithmetic, builtin functions, LIKE/MATCH) is identical
//! regardless of execution strategy and lives here once.
//!
//! Comparisons and division are fallible: a cross-type comparison (`'x' < 3`)
//! is a `TypeError` and a zero divisor is an `EvaluationError`, both fatal to
//! the query rather than silently folding to `NULL`.

use core::cmp::Ordering;

use cynos_core::{pattern_match, Error, Value};

use crate::ast::{BinaryOp, UnaryOp};

/// Coerces a numeric `Value` to `f64` for arithmetic. Non-numeric values
/// (including `Null`) yield `None`, which arithmetic ops turn into `Value::Null`.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int32(i) => Some(*i as f64),
        Value::Int64(i) => Some(*i as f64),
        Value::UInt64(u) => Some(*u as f64),
        Value::Float64(f) => Some(*f),
        Value::Decimal(d) => Some(d.to_f64()),
        _ => None,
    }
}

pub fn eval_arithmetic<F: Fn(f64, f64) -> f64>(left: &Value, right: &Value, op: F) -> Value {
    let (Some(l), Some(r)) = (value_as_f64(left), value_as_f64(right)) else {
        return Value::Null;
    };
    let result = op(l, r);
    match (left, right) {
        (Value::Int64(_), Value::Int64(_)) => Value::Int64(result as i64),
        (Value::Int32(_), Value::Int32(_)) => Value::Int32(result as i32),
        _ => Value::Float64(result),
    }
}

/// Evaluates one binary operator over two already-evaluated operands.
///
/// Errors are fatal to the current query: `TypeError` for a cross-type
/// comparison that [`Value::try_compare`] refuses to order, `EvaluationError`
/// for division or modulo by zero. Everything else that can't be computed
/// (e.g. arithmetic over non-numeric operands) folds to `Value::Null`.
pub fn eval_binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Error> {
    if left.is_null() || right.is_null() {
        return Ok(match op {
            BinaryOp::And => {
                if matches!(left, Value::Boolean(false)) || matches!(right, Value::Boolean(false)) {
                    Value::Boolean(false)
                } else {
                    Value::Null
                }
            }
            BinaryOp::Or => {
                if matches!(left, Value::Boolean(true)) || matches!(right, Value::Boolean(true)) {
                    Value::Boolean(true)
                } else {
                    Value::Null
                }
            }
            _ => Value::Null,
        });
    }
    match op {
        BinaryOp::Eq => left.try_compare(right).map(|o| Value::Boolean(o == Ordering::Equal)),
        BinaryOp::Ne => left.try_compare(right).map(|o| Value::Boolean(o != Ordering::Equal)),
        BinaryOp::Lt => left.try_compare(right).map(|o| Value::Boolean(o == Ordering::Less)),
        BinaryOp::Le => left.try_compare(right).map(|o| Value::Boolean(o != Ordering::Greater)),
        BinaryOp::Gt => left.try_compare(right).map(|o| Value::Boolean(o == Ordering::Greater)),
        BinaryOp::Ge => left.try_compare(right).map(|o| Value::Boolean(o != Ordering::Less)),
        BinaryOp::And => {
            Ok(Value::Boolean(matches!(left, Value::Boolean(true)) && matches!(right, Value::Boolean(true))))
        }
        BinaryOp::Or => {
            Ok(Value::Boolean(matches!(left, Value::Boolean(true)) || matches!(right, Value::Boolean(true))))
        }
        BinaryOp::Add => Ok(eval_arithmetic(left, right, |a, b| a + b)),
        BinaryOp::Sub => Ok(eval_arithmetic(left, right, |a, b| a - b)),
        BinaryOp::Mul => Ok(eval_arithmetic(left, right, |a, b| a * b)),
        BinaryOp::Div => match value_as_f64(right) {
            Some(r) if r == 0.0 => Err(Error::evaluation("division by zero")),
            _ => Ok(eval_arithmetic(left, right, |a, b| a / b)),
        },
        BinaryOp::Mod => match (left, right) {
            (Value::Int64(_), Value::Int64(0)) | (Value::Int32(_), Value::Int32(0)) => {
                Err(Error::evaluation("division by zero"))
            }
            (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a % b)),
            (Value::Int32(a), Value::Int32(b)) => Ok(Value::Int32(a % b)),
            _ => Ok(Value::Null),
        },
        // Handled by the caller, which has the full Expr variant (list/bounds) in scope.
        BinaryOp::Like | BinaryOp::In | BinaryOp::Between => Ok(Value::Null),
    }
}

pub fn eval_unary_op(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => match value {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Null,
        },
        UnaryOp::Neg => match value {
            Value::Int32(i) => Value::Int32(-i),
            Value::Int64(i) => Value::Int64(-i),
            Value::Float64(f) => Value::Float64(-f),
            _ => Value::Null,
        },
        UnaryOp::IsNull => Value::Boolean(value.is_null()),
        UnaryOp::IsNotNull => Value::Boolean(!value.is_null()),
    }
}

/// Builtin scalar functions available to `Expr::Function`. Unknown names and
/// argument-type mismatches both evaluate to `Value::Null` rather than erroring.
pub fn eval_function(name: &str, args: &[Value]) -> Value {
    match name.to_uppercase().as_str() {
        "ABS" => match args.first() {
            Some(Value::Int32(i)) => Value::Int32(i.abs()),
            Some(Value::Int64(i)) => Value::Int64(i.abs()),
            Some(Value::Float64(f)) => Value::Float64(f.abs()),
            _ => Value::Null,
        },
        "UPPER" => match args.first() {
            Some(Value::Text(s)) => Value::Text(s.to_uppercase().into()),
            _ => Value::Null,
        },
        "LOWER" => match args.first() {
            Some(Value::Text(s)) => Value::Text(s.to_lowercase().into()),
            _ => Value::Null,
        },
        "LENGTH" => match args.first() {
            Some(Value::Text(s)) => Value::Int64(s.len() as i64),
            _ => Value::Null,
        },
        "COALESCE" => args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

pub fn eval_like(value: &Value, pattern: &str) -> bool {
    match value {
        Value::Text(s) => pattern_match::like(s, pattern),
        _ => false,
    }
}

pub fn eval_regex_match(value: &Value, pattern: &str) -> bool {
    match value {
        Value::Text(s) => pattern_match::regex(s, pattern),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_binary_op_null_propagation_and_short_circuit() {
        assert_eq!(eval_binary_op(BinaryOp::And, &Value::Null, &Value::Boolean(false)).unwrap(), Value::Boolean(false));
        assert_eq!(eval_binary_op(BinaryOp::And, &Value::Null, &Value::Boolean(true)).unwrap(), Value::Null);
        assert_eq!(eval_binary_op(BinaryOp::Or, &Value::Null, &Value::Boolean(true)).unwrap(), Value::Boolean(true));
        assert_eq!(eval_binary_op(BinaryOp::Eq, &Value::Null, &Value::Int64(1)).unwrap(), Value::Null);
    }

    #[test]
    fn test_eval_binary_op_div_and_mod_by_zero_is_fatal() {
        assert!(matches!(
            eval_binary_op(BinaryOp::Div, &Value::Int64(10), &Value::Int64(0)),
            Err(Error::EvaluationError { .. })
        ));
        assert!(matches!(
            eval_binary_op(BinaryOp::Div, &Value::Float64(1.0), &Value::Float64(0.0)),
            Err(Error::EvaluationError { .. })
        ));
        assert!(matches!(
            eval_binary_op(BinaryOp::Mod, &Value::Int64(10), &Value::Int64(0)),
            Err(Error::EvaluationError { .. })
        ));
    }

    #[test]
    fn test_eval_binary_op_cross_type_comparison_is_type_error() {
        let err = eval_binary_op(BinaryOp::Lt, &Value::Text("a".into()), &Value::Int64(1)).unwrap_err();
        assert!(matches!(err, Error::TypeError { .. }));
    }

    #[test]
    fn test_eval_binary_op_numeric_comparison_widens_across_tags() {
        assert_eq!(eval_binary_op(BinaryOp::Lt, &Value::Int32(1), &Value::Int64(2)).unwrap(), Value::Boolean(true));
        assert_eq!(eval_binary_op(BinaryOp::Eq, &Value::UInt64(3), &Value::Float64(3.0)).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_eval_arithmetic_preserves_integer_type() {
        assert_eq!(eval_binary_op(BinaryOp::Add, &Value::Int64(2), &Value::Int64(3)).unwrap(), Value::Int64(5));
        assert_eq!(eval_binary_op(BinaryOp::Add, &Value::Int64(2), &Value::Float64(1.5)).unwrap(), Value::Float64(3.5));
    }

    #[test]
    fn test_eval_arithmetic_accepts_decimal_and_uint64() {
        let decimal = Value::Decimal(cynos_core::Decimal::new(150, 1)); // 15.0
        assert_eq!(eval_binary_op(BinaryOp::Add, &decimal, &Value::Int64(5)).unwrap(), Value::Float64(20.0));
        assert_eq!(eval_binary_op(BinaryOp::Add, &Value::UInt64(3), &Value::UInt64(4)).unwrap(), Value::Float64(7.0));
    }

    #[test]
    fn test_eval_function_builtins() {
        assert_eq!(eval_function("abs", &[Value::Int64(-5)]), Value::Int64(5));
        assert_eq!(eval_function("UPPER", &[Value::Text("hi".into())]), Value::Text("HI".into()));
        assert_eq!(eval_function("coalesce", &[Value::Null, Value::Int64(7)]), Value::Int64(7));
        assert_eq!(eval_function("unknown_fn", &[Value::Int64(1)]), Value::Null);
    }

    #[test]
    fn test_eval_like_and_regex_delegate_to_core_pattern_match() {
        assert!(eval_like(&Value::Text("hello".into()), "h%o"));
        assert!(!eval_like(&Value::Text("hello".into()), "world"));
        assert!(!eval_like(&Value::Int64(1), "1"));
        assert!(eval_regex_match(&Value::Text("abc123".into()), "\\d+"));
    }
}
