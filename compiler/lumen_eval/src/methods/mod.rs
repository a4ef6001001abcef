//! Builtin members and conversions.
//!
//! Members that take a function input (`translate`, `filter`, ...) need
//! nested evaluations and run as loop frames in the interpreter; every
//! other member is computed here in one native step.

use lumen_types::{split_number, BuiltinConversion, BuiltinMember, Type, Unit};

use crate::errors::{type_mismatch, EvalResult, Exception};
use crate::value::TableValue;
use crate::Value;

/// Input `index`, or a mismatch naming what was expected.
fn input<'a>(inputs: &'a [Value], index: usize, expected: &str) -> EvalResult<&'a Value> {
    inputs.get(index).ok_or_else(|| type_mismatch(expected, "ø"))
}

fn number_input(inputs: &[Value], index: usize) -> EvalResult<f64> {
    let value = input(inputs, index, "#")?;
    value
        .as_number()
        .map(|number| number.magnitude)
        .ok_or_else(|| type_mismatch("#", value.type_label()))
}

fn receiver_mismatch(member: BuiltinMember, receiver: &Value) -> Exception {
    type_mismatch(member.name(), receiver.type_label())
}

/// Position of a 1-based index in a sequence of `len` items.
fn position(index: f64, len: usize) -> Option<usize> {
    if index.fract() != 0.0 || index < 1.0 || index > len as f64 {
        return None;
    }
    Some(index as usize - 1)
}

/// Evaluate a first-order member on `receiver`.
pub fn call_member(member: BuiltinMember, receiver: &Value, inputs: &[Value]) -> EvalResult {
    use BuiltinMember as M;

    match (member, receiver) {
        (M::Sqrt, Value::Number(n)) => Ok(Value::unitless(n.magnitude.sqrt())),
        (M::Abs, Value::Number(n)) => Ok(Value::number(n.magnitude.abs(), n.unit.clone())),
        (M::Round, Value::Number(n)) => Ok(Value::number(n.magnitude.round(), n.unit.clone())),
        (M::NumberText, Value::Number(n)) => Ok(Value::text(&n.to_string())),

        (M::TextLength, Value::Text(text)) => Ok(Value::unitless(text.chars().count() as f64)),
        (M::TextHas, Value::Text(text)) => {
            let part = input(inputs, 0, "''")?;
            let part = part.as_text().ok_or_else(|| type_mismatch("''", part.type_label()))?;
            Ok(Value::Boolean(text.contains(part)))
        }
        (M::Repeat, Value::Text(text)) => {
            let count = number_input(inputs, 0)?.max(0.0).floor() as usize;
            Ok(Value::text(&text.repeat(count)))
        }

        (M::ListLength, Value::List(items)) => Ok(Value::unitless(items.len() as f64)),
        (M::First, Value::List(items)) => Ok(items.first().cloned().unwrap_or(Value::None)),
        (M::Last, Value::List(items)) => Ok(items.last().cloned().unwrap_or(Value::None)),
        (M::Get, Value::List(items)) => {
            let index = number_input(inputs, 0)?;
            Ok(position(index, items.len())
                .and_then(|i| items.get(i).cloned())
                .unwrap_or(Value::None))
        }
        (M::Reverse, Value::List(items)) => {
            Ok(Value::list(items.iter().rev().cloned().collect()))
        }
        (M::ListHas, Value::List(items)) | (M::SetHas, Value::Set(items)) => {
            let item = input(inputs, 0, "any")?;
            Ok(Value::Boolean(items.contains(item)))
        }
        (M::ListAdd, Value::List(items)) => {
            let mut items = items.to_vec();
            items.push(input(inputs, 0, "any")?.clone());
            Ok(Value::list(items))
        }

        (M::SetSize, Value::Set(items)) => Ok(Value::unitless(items.len() as f64)),
        (M::SetAdd, Value::Set(items)) => {
            let mut items = items.to_vec();
            items.push(input(inputs, 0, "any")?.clone());
            Ok(Value::set(items))
        }
        (M::SetRemove, Value::Set(items)) => {
            let removed = input(inputs, 0, "any")?;
            Ok(Value::set(items.iter().filter(|i| *i != removed).cloned().collect()))
        }
        (M::SetList, Value::Set(items)) => Ok(Value::list(items.to_vec())),

        (M::MapSize, Value::Map(pairs)) => Ok(Value::unitless(pairs.len() as f64)),
        (M::MapGet, Value::Map(pairs)) => {
            let key = input(inputs, 0, "any")?;
            Ok(pairs
                .iter()
                .find(|(k, _)| k == key)
                .map_or(Value::None, |(_, v)| v.clone()))
        }
        (M::MapHas, Value::Map(pairs)) => {
            let key = input(inputs, 0, "any")?;
            Ok(Value::Boolean(pairs.iter().any(|(k, _)| k == key)))
        }
        (M::MapSet, Value::Map(pairs)) => {
            let mut pairs = pairs.to_vec();
            pairs.push((input(inputs, 0, "any")?.clone(), input(inputs, 1, "any")?.clone()));
            Ok(Value::map(pairs))
        }
        (M::Keys, Value::Map(pairs)) => Ok(Value::list(pairs.iter().map(|(k, _)| k.clone()).collect())),
        (M::Values, Value::Map(pairs)) => {
            Ok(Value::list(pairs.iter().map(|(_, v)| v.clone()).collect()))
        }

        (M::TableSize, Value::Table(table)) => Ok(Value::unitless(table.rows.len() as f64)),

        _ => Err(receiver_mismatch(member, receiver)),
    }
}

/// Apply a builtin conversion to `value`, producing a value of type `to`.
pub fn convert(conversion: BuiltinConversion, value: &Value, to: &Type) -> EvalResult {
    match (conversion, value) {
        (BuiltinConversion::NumberToText, Value::Number(number)) => {
            Ok(Value::text(&number.to_string()))
        }
        (BuiltinConversion::TextToNumber, Value::Text(text)) => {
            match split_number(text.trim()) {
                Some((magnitude, unit)) if unit.is_unitless() => Ok(Value::unitless(magnitude)),
                _ => Ok(Value::unitless(f64::NAN)),
            }
        }
        (BuiltinConversion::BooleanToText, Value::Boolean(value)) => {
            Ok(Value::text(if *value { "⊤" } else { "⊥" }))
        }
        (BuiltinConversion::ListToSet, Value::List(items)) => Ok(Value::set(items.to_vec())),
        (BuiltinConversion::SetToList, Value::Set(items)) => Ok(Value::list(items.to_vec())),
        (BuiltinConversion::Scale(factor), Value::Number(number)) => {
            let unit = to.as_number().cloned().unwrap_or_else(Unit::unitless);
            Ok(Value::number(number.magnitude * factor, unit))
        }
        _ => Err(type_mismatch(to, value.type_label())),
    }
}

/// Build a table value, checking every row has one cell per column.
pub fn table(columns: Vec<lumen_ir::Name>, rows: Vec<Vec<Value>>) -> EvalResult {
    let width = columns.len();
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(type_mismatch(format!("{width} cells"), format!("{} cells", row.len())));
    }
    Ok(Value::Table(std::sync::Arc::new(TableValue {
        columns,
        rows: rows.into_iter().map(Into::into).collect(),
    })))
}

#[cfg(test)]
mod tests;
