//! Arithmetic and comparison operators over [`Value`]s
//!
//! Operators are total: applying one never fails, it produces a
//! [`Value::Error`] instead. Comparison is defined across every pair of
//! non-error variants through a fixed type ordering (numbers and times
//! compare numerically, text outranks numeric types, booleans outrank
//! everything).

use crate::time::to_excel;
use crate::value::{CellError, Value};
use std::cmp::Ordering;
use std::fmt;

/// A comparison or arithmetic operator in an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Gt,
    Lt,
    Geq,
    Leq,
    Eq,
    Neq,
}

impl Operator {
    /// The operator's source form
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Geq => ">=",
            Operator::Leq => "<=",
            Operator::Eq => "=",
            Operator::Neq => "<>",
        }
    }

    /// Check if this is one of the arithmetic operators (`+ - * / ^`)
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Power
        )
    }

    /// Check if this is one of the comparison operators (`> < >= <= = <>`)
    pub fn is_comparison(&self) -> bool {
        !self.is_arithmetic()
    }

    /// Apply the operator to two values, returning the result.
    ///
    /// An error operand short-circuits the result to that error, the left
    /// operand first.
    pub fn apply(&self, v1: &Value, v2: &Value) -> Value {
        if let Value::Error(err) = v1 {
            return Value::Error(err.clone());
        }

        if let Value::Error(err) = v2 {
            return Value::Error(err.clone());
        }

        if self.is_arithmetic() {
            return self.apply_arithmetic(v1, v2);
        }

        match compare_values(v1, v2) {
            Ok(ord) => Value::Bool(self.holds(ord)),
            Err(err) => Value::Error(err),
        }
    }

    fn apply_arithmetic(&self, v1: &Value, v2: &Value) -> Value {
        let (n1, n2) = match (v1.to_number(), v2.to_number()) {
            (Ok(n1), Ok(n2)) => (n1, n2),
            (Err(err), _) | (_, Err(err)) => return Value::Error(err),
        };

        match self {
            Operator::Add => Value::Number(n1 + n2),
            Operator::Subtract => Value::Number(n1 - n2),
            Operator::Multiply => Value::Number(n1 * n2),
            Operator::Divide => {
                if n2 == 0.0 {
                    Value::Error(CellError::DivideByZero)
                } else {
                    Value::Number(n1 / n2)
                }
            }
            Operator::Power => Value::Number(n1.powf(n2)),
            _ => Value::Error(CellError::Name(format!(
                "'{}' is not an arithmetic operator",
                self
            ))),
        }
    }

    fn holds(&self, ord: Ordering) -> bool {
        match self {
            Operator::Eq => ord == Ordering::Equal,
            Operator::Neq => ord != Ordering::Equal,
            Operator::Lt => ord == Ordering::Less,
            Operator::Leq => ord != Ordering::Greater,
            Operator::Gt => ord == Ordering::Greater,
            Operator::Geq => ord != Ordering::Less,
            // Arithmetic operators never reach the comparison path
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order two values under the cross-type comparison lattice.
///
/// Numbers and times are numerically comparable (times through their Excel
/// fractional form), text sorts above both, and booleans sort above
/// everything with `false < true`. Error operands fail the comparison with
/// their own error.
pub fn compare_values(v1: &Value, v2: &Value) -> Result<Ordering, CellError> {
    match v1 {
        Value::Number(n1) => compare_number(*n1, v2),
        Value::Text(s1) => compare_text(s1, v2),
        Value::Time(t1) => compare_number(to_excel(*t1), v2),
        Value::Bool(b1) => compare_bool(*b1, v2),
        Value::Error(err) => Err(err.clone()),
    }
}

fn compare_number(n1: f64, v2: &Value) -> Result<Ordering, CellError> {
    match v2 {
        Value::Text(_) | Value::Bool(_) => Ok(Ordering::Less),
        Value::Number(n2) => Ok(cmp_f64(n1, *n2)),
        Value::Time(t2) => Ok(cmp_f64(n1, to_excel(*t2))),
        Value::Error(err) => Err(err.clone()),
    }
}

fn compare_text(s1: &str, v2: &Value) -> Result<Ordering, CellError> {
    match v2 {
        Value::Number(_) | Value::Time(_) => Ok(Ordering::Greater),
        Value::Bool(_) => Ok(Ordering::Less),
        Value::Text(s2) => Ok(s1.cmp(s2.as_str())),
        Value::Error(err) => Err(err.clone()),
    }
}

fn compare_bool(b1: bool, v2: &Value) -> Result<Ordering, CellError> {
    match v2 {
        Value::Number(_) | Value::Text(_) | Value::Time(_) => Ok(Ordering::Greater),
        Value::Bool(b2) => Ok(b1.cmp(b2)),
        Value::Error(err) => Err(err.clone()),
    }
}

fn cmp_f64(n1: f64, n2: f64) -> Ordering {
    if n1 == n2 {
        Ordering::Equal
    } else if n1 < n2 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use Operator::*;

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    fn convert_err(s: &str) -> Value {
        Value::Error(CellError::Value(format!(
            "unable to convert '{}' to float",
            s
        )))
    }

    fn check(first: Value, second: Value, cases: &[(Operator, Value)]) {
        for (op, expected) in cases {
            let actual = op.apply(&first, &second);
            assert_eq!(
                &actual, expected,
                "{} {} {}",
                first, op, second
            );
        }
    }

    #[test]
    fn test_string_against_same_string() {
        check(
            text("A"),
            text("A"),
            &[
                (Eq, Value::Bool(true)),
                (Neq, Value::Bool(false)),
                (Gt, Value::Bool(false)),
                (Geq, Value::Bool(true)),
                (Lt, Value::Bool(false)),
                (Leq, Value::Bool(true)),
                (Add, convert_err("A")),
                (Subtract, convert_err("A")),
                (Multiply, convert_err("A")),
                (Divide, convert_err("A")),
            ],
        );
    }

    #[test]
    fn test_string_against_greater_string() {
        check(
            text("A"),
            text("B"),
            &[
                (Eq, Value::Bool(false)),
                (Neq, Value::Bool(true)),
                (Gt, Value::Bool(false)),
                (Geq, Value::Bool(false)),
                (Lt, Value::Bool(true)),
                (Leq, Value::Bool(true)),
            ],
        );
    }

    #[test]
    fn test_string_against_float() {
        // Strings outrank numbers even when the number is bigger
        check(
            text("A"),
            Value::Number(10.5),
            &[
                (Eq, Value::Bool(false)),
                (Neq, Value::Bool(true)),
                (Gt, Value::Bool(true)),
                (Geq, Value::Bool(true)),
                (Lt, Value::Bool(false)),
                (Leq, Value::Bool(false)),
                (Add, convert_err("A")),
            ],
        );

        check(
            text("zzz"),
            Value::Number(1e9),
            &[(Gt, Value::Bool(true))],
        );
    }

    #[test]
    fn test_float_against_string() {
        check(
            Value::Number(10.5),
            text("A"),
            &[
                (Eq, Value::Bool(false)),
                (Neq, Value::Bool(true)),
                (Gt, Value::Bool(false)),
                (Geq, Value::Bool(false)),
                (Lt, Value::Bool(true)),
                (Leq, Value::Bool(true)),
                (Add, convert_err("A")),
            ],
        );
    }

    #[test]
    fn test_float_against_float() {
        check(
            Value::Number(20.5),
            Value::Number(10.5),
            &[
                (Eq, Value::Bool(false)),
                (Neq, Value::Bool(true)),
                (Gt, Value::Bool(true)),
                (Geq, Value::Bool(true)),
                (Lt, Value::Bool(false)),
                (Leq, Value::Bool(false)),
                (Add, Value::Number(31.0)),
                (Subtract, Value::Number(10.0)),
                (Multiply, Value::Number(20.5 * 10.5)),
                (Divide, Value::Number(20.5 / 10.5)),
                (Power, Value::Number(20.5_f64.powf(10.5))),
            ],
        );
    }

    #[test]
    fn test_bool_outranks_everything() {
        check(
            Value::Bool(false),
            Value::Number(1e12),
            &[(Gt, Value::Bool(true)), (Lt, Value::Bool(false))],
        );
        check(
            Value::Bool(false),
            text("zzz"),
            &[(Gt, Value::Bool(true))],
        );
        check(
            Value::Bool(false),
            Value::Bool(true),
            &[
                (Lt, Value::Bool(true)),
                (Eq, Value::Bool(false)),
                (Neq, Value::Bool(true)),
            ],
        );
        check(
            Value::Bool(true),
            Value::Bool(true),
            &[(Eq, Value::Bool(true)), (Geq, Value::Bool(true))],
        );
    }

    #[test]
    fn test_time_compares_as_excel_number() {
        let day1 = Value::Time(Utc.with_ymd_and_hms(1899, 12, 31, 0, 0, 0).unwrap());
        check(
            day1.clone(),
            Value::Number(1.0),
            &[(Eq, Value::Bool(true)), (Neq, Value::Bool(false))],
        );
        check(
            Value::Number(0.5),
            day1.clone(),
            &[(Lt, Value::Bool(true))],
        );
        check(
            day1.clone(),
            Value::Time(Utc.with_ymd_and_hms(1900, 3, 1, 0, 0, 0).unwrap()),
            &[(Lt, Value::Bool(true))],
        );

        // Arithmetic coerces the time through its fractional form
        check(day1, Value::Number(1.0), &[(Add, Value::Number(2.0))]);
    }

    #[test]
    fn test_divide_by_zero() {
        check(
            Value::Number(20.5),
            Value::Number(0.0),
            &[(Divide, Value::Error(CellError::DivideByZero))],
        );

        // A value that coerces to zero divides by zero too
        check(
            Value::Number(20.5),
            Value::Bool(false),
            &[(Divide, Value::Error(CellError::DivideByZero))],
        );
        check(
            Value::Number(20.5),
            text("0"),
            &[(Divide, Value::Error(CellError::DivideByZero))],
        );
    }

    #[test]
    fn test_error_short_circuits() {
        let left = Value::Error(CellError::Name("invalid name 'foo'".into()));
        let right = Value::Error(CellError::DivideByZero);

        for op in [Add, Subtract, Multiply, Divide, Power, Gt, Lt, Geq, Leq, Eq, Neq] {
            // The first error operand wins
            assert_eq!(op.apply(&left, &right), left, "{}", op);
            assert_eq!(op.apply(&right, &left), right, "{}", op);
            assert_eq!(op.apply(&Value::Number(1.0), &right), right, "{}", op);
        }
    }

    #[test]
    fn test_comparison_is_total() {
        let values = [
            Value::Number(1.5),
            Value::Number(-3.0),
            text("abc"),
            text(""),
            Value::Bool(false),
            Value::Bool(true),
            Value::Time(Utc.with_ymd_and_hms(2024, 4, 19, 6, 14, 9).unwrap()),
        ];

        for a in &values {
            for b in &values {
                let lt = Lt.apply(a, b);
                let eq = Eq.apply(a, b);
                let gt = Gt.apply(a, b);
                let holds = [lt, eq, gt]
                    .iter()
                    .filter(|v| **v == Value::Bool(true))
                    .count();
                assert_eq!(holds, 1, "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_numeric_looking_string_is_still_a_string() {
        check(
            Value::Number(1.75),
            text("1.5"),
            &[(Eq, Value::Bool(false)), (Lt, Value::Bool(true))],
        );
    }
}
