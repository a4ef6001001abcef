//! Binary and unary operator implementations.
//!
//! Direct dispatch on the operand values. Units follow the static rules:
//! `+ - %` and comparisons need identical units, `· ÷` compose them, and
//! `^` raises the unit by an integral exponent.

use lumen_ir::{BinaryOp, UnaryOp};
use lumen_types::Unit;

use crate::errors::{division_by_zero, type_mismatch, EvalResult};
use crate::value::Number;
use crate::Value;

/// Evaluate `left op right`.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if op.is_equality() {
        let equal = left == right;
        return Ok(Value::Boolean(if op == BinaryOp::Eq { equal } else { !equal }));
    }
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_binary(op, a, b),
        (Value::Boolean(a), Value::Boolean(b)) if op.is_logical() => {
            Ok(Value::Boolean(if op == BinaryOp::And { *a && *b } else { *a || *b }))
        }
        (Value::Text(a), Value::Text(b)) if op == BinaryOp::Add => {
            Ok(Value::text(&format!("{a}{b}")))
        }
        (Value::Text(a), Value::Text(b)) if op.is_comparison() => {
            Ok(Value::Boolean(compare(op, a.as_ref().cmp(b.as_ref()))))
        }
        _ if op.is_logical() => Err(type_mismatch("?", mismatched(left, right, "?"))),
        _ => Err(type_mismatch(left.type_label(), right.type_label())),
    }
}

fn mismatched(left: &Value, right: &Value, expected: &str) -> String {
    if left.type_label() == expected {
        right.type_label()
    } else {
        left.type_label()
    }
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::LtEq => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::GtEq => ordering != Less,
        _ => ordering == Equal,
    }
}

fn same_unit(a: &Number, b: &Number) -> EvalResult<()> {
    if a.unit == b.unit {
        Ok(())
    } else {
        Err(type_mismatch(format!("#{}", a.unit), format!("#{}", b.unit)))
    }
}

/// Composing the units would overflow an exponent.
fn unit_overflow(a: &Number, b: &Number) -> crate::Exception {
    type_mismatch(format!("#{}", a.unit), format!("#{}", b.unit))
}

fn number_binary(op: BinaryOp, a: &Number, b: &Number) -> EvalResult {
    let (x, y) = (a.magnitude, b.magnitude);
    match op {
        BinaryOp::Add => {
            same_unit(a, b)?;
            Ok(Value::number(x + y, a.unit.clone()))
        }
        BinaryOp::Sub => {
            same_unit(a, b)?;
            Ok(Value::number(x - y, a.unit.clone()))
        }
        BinaryOp::Rem => {
            same_unit(a, b)?;
            if y == 0.0 {
                return Err(division_by_zero());
            }
            Ok(Value::number(x % y, a.unit.clone()))
        }
        BinaryOp::Mul => {
            let unit = a.unit.product(&b.unit).ok_or_else(|| unit_overflow(a, b))?;
            Ok(Value::number(x * y, unit))
        }
        BinaryOp::Div => {
            if y == 0.0 {
                return Err(division_by_zero());
            }
            let unit = a.unit.quotient(&b.unit).ok_or_else(|| unit_overflow(a, b))?;
            Ok(Value::number(x / y, unit))
        }
        BinaryOp::Pow => power(a, b),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            same_unit(a, b)?;
            let ordering = x.partial_cmp(&y).ok_or_else(|| type_mismatch("#", "NaN"))?;
            Ok(Value::Boolean(compare(op, ordering)))
        }
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            Err(type_mismatch("?", format!("#{}", a.unit)))
        }
    }
}

fn power(base: &Number, exponent: &Number) -> EvalResult {
    if !exponent.unit.is_unitless() {
        return Err(type_mismatch("#", format!("#{}", exponent.unit)));
    }
    let magnitude = base.magnitude.powf(exponent.magnitude);
    if base.unit.is_unitless() {
        return Ok(Value::number(magnitude, Unit::unitless()));
    }
    let integral = exponent.magnitude.fract() == 0.0 && exponent.magnitude.abs() < 1e6;
    if !integral {
        return Err(type_mismatch("#", format!("#{}", base.unit)));
    }
    let unit = base
        .unit
        .power(exponent.magnitude as i32)
        .ok_or_else(|| unit_overflow(base, exponent))?;
    Ok(Value::number(magnitude, unit))
}

/// Evaluate a unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Negate, Value::Number(number)) => {
            Ok(Value::number(-number.magnitude, number.unit.clone()))
        }
        (UnaryOp::Not, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        (UnaryOp::Negate, other) => Err(type_mismatch("#", other.type_label())),
        (UnaryOp::Not, other) => Err(type_mismatch("?", other.type_label())),
    }
}

#[cfg(test)]
mod tests;
