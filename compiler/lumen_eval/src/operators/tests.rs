#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn meters(magnitude: f64) -> Value {
    Value::number(magnitude, Unit::base("m"))
}

#[test]
fn subtraction_is_plain() {
    let two = Value::unitless(2.0);
    let three = Value::unitless(3.0);
    assert_eq!(
        evaluate_binary(BinaryOp::Sub, &two, &three),
        Ok(Value::unitless(-1.0))
    );
}

#[test]
fn multiplication_composes_units() {
    let area = evaluate_binary(BinaryOp::Mul, &meters(2.0), &meters(3.0));
    assert_eq!(area, Ok(Value::number(6.0, Unit::base("m").power(2).unwrap())));
}

#[test]
fn overflowing_units_are_a_mismatch() {
    let huge = Value::number(1.0, Unit::parse("m^2147483647").unwrap());
    let product = evaluate_binary(BinaryOp::Mul, &huge, &meters(1.0));
    assert_eq!(product.map_err(|e| e.kind), Err(crate::ExceptionKind::TypeMismatch));
    let quotient = evaluate_binary(BinaryOp::Div, &meters(1.0), &Value::number(2.0, Unit::parse("m^-2147483648").unwrap()));
    assert_eq!(quotient.map_err(|e| e.kind), Err(crate::ExceptionKind::TypeMismatch));
    let squared = evaluate_binary(BinaryOp::Pow, &huge, &Value::unitless(2.0));
    assert_eq!(squared.map_err(|e| e.kind), Err(crate::ExceptionKind::TypeMismatch));
}

#[test]
fn addition_requires_identical_units() {
    let result = evaluate_binary(BinaryOp::Add, &meters(1.0), &Value::unitless(1.0));
    let kind = result.map_err(|e| e.kind);
    assert_eq!(kind, Err(crate::ExceptionKind::TypeMismatch));
}

#[test]
fn division_by_zero_is_an_exception() {
    let result = evaluate_binary(BinaryOp::Div, &Value::unitless(1.0), &Value::unitless(0.0));
    assert_eq!(result.map_err(|e| e.kind), Err(crate::ExceptionKind::DivisionByZero));
    let result = evaluate_binary(BinaryOp::Rem, &Value::unitless(1.0), &Value::unitless(0.0));
    assert_eq!(result.map_err(|e| e.kind), Err(crate::ExceptionKind::DivisionByZero));
}

#[test]
fn power_raises_units() {
    let squared = evaluate_binary(BinaryOp::Pow, &meters(3.0), &Value::unitless(2.0));
    assert_eq!(squared, Ok(Value::number(9.0, Unit::base("m").power(2).unwrap())));
    let fractional = evaluate_binary(BinaryOp::Pow, &meters(4.0), &Value::unitless(0.5));
    assert!(fractional.is_err());
}

#[test]
fn equality_works_across_kinds() {
    assert_eq!(
        evaluate_binary(BinaryOp::Eq, &Value::text("a"), &Value::unitless(1.0)),
        Ok(Value::Boolean(false))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::NotEq, &meters(1.0), &meters(2.0)),
        Ok(Value::Boolean(true))
    );
}

#[test]
fn text_concatenates_and_compares() {
    assert_eq!(
        evaluate_binary(BinaryOp::Add, &Value::text("ab"), &Value::text("c")),
        Ok(Value::text("abc"))
    );
    assert_eq!(
        evaluate_binary(BinaryOp::Lt, &Value::text("a"), &Value::text("b")),
        Ok(Value::Boolean(true))
    );
}

#[test]
fn logic_needs_booleans() {
    assert_eq!(
        evaluate_binary(BinaryOp::And, &Value::Boolean(true), &Value::Boolean(false)),
        Ok(Value::Boolean(false))
    );
    assert!(evaluate_binary(BinaryOp::Or, &Value::Boolean(true), &Value::unitless(1.0)).is_err());
}

#[test]
fn unary_operators() {
    assert_eq!(evaluate_unary(UnaryOp::Negate, &meters(2.0)), Ok(meters(-2.0)));
    assert_eq!(
        evaluate_unary(UnaryOp::Not, &Value::Boolean(true)),
        Ok(Value::Boolean(false))
    );
    assert!(evaluate_unary(UnaryOp::Not, &meters(1.0)).is_err());
}
