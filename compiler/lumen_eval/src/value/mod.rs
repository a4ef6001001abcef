//! Runtime values.
//!
//! Values are immutable. Containers are `Arc`-shared, so copying a value
//! onto a value stack, into a binding or into a back-stepping snapshot is
//! a reference-count bump, the same structural sharing the syntax tree
//! uses.

use std::fmt;
use std::sync::Arc;

use lumen_ir::{Name, Node, NodeKind};
use lumen_types::{
    function_type, structure_creator, split_number, BuiltinMember, Column, Context,
    StreamKind, StructureType, Type, Unit,
};

use crate::environment::Scope;
use crate::errors::Exception;

/// A number with its unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Number {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Number {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Number { magnitude, unit }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit)
    }
}

/// A table: column names and rows of cells in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct TableValue {
    pub columns: Vec<Name>,
    pub rows: Vec<Arc<[Value]>>,
}

impl TableValue {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.as_str() == name)
    }
}

/// An instance of a user-defined structure.
///
/// Inputs, binds and functions of the body all live in `scope`; methods
/// are closures over it.
#[derive(Clone, Debug)]
pub struct StructureValue {
    pub name: Name,
    pub definition: Node,
    pub scope: Scope,
}

impl StructureValue {
    /// Names of the structure's inputs, in declaration order.
    pub fn input_names(&self) -> Vec<Name> {
        match self.definition.kind() {
            NodeKind::StructureDefinition(definition) => definition
                .inputs
                .iter()
                .filter_map(|input| match input.kind() {
                    NodeKind::Bind(bind) => bind.primary_name(),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.scope.get_here(name)
    }
}

/// A function or structure definition together with the scope it was
/// evaluated in.
#[derive(Clone, Debug)]
pub struct Closure {
    pub definition: Node,
    pub scope: Scope,
}

impl Closure {
    pub fn name(&self) -> Option<Name> {
        match self.definition.kind() {
            NodeKind::FunctionDefinition(function) => function.name_text(),
            NodeKind::StructureDefinition(structure) => structure.name_text(),
            _ => None,
        }
    }
}

/// A builtin member bound to the value it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMember {
    pub member: BuiltinMember,
    pub receiver: Value,
}

/// Anything that can be evaluated with inputs.
#[derive(Clone, Debug)]
pub enum FunctionValue {
    Closure(Arc<Closure>),
    /// A structure definition; evaluating it creates an instance.
    Creator(Arc<Closure>),
    Member(Arc<BoundMember>),
    /// A builtin stream name such as `Time`.
    Stream(StreamKind),
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FunctionValue::Closure(a), FunctionValue::Closure(b))
            | (FunctionValue::Creator(a), FunctionValue::Creator(b)) => Arc::ptr_eq(a, b),
            (FunctionValue::Member(a), FunctionValue::Member(b)) => a == b,
            (FunctionValue::Stream(a), FunctionValue::Stream(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionValue::Closure(closure) => match closure.name() {
                Some(name) => write!(f, "ƒ {name}"),
                None => f.write_str("ƒ"),
            },
            FunctionValue::Creator(closure) => match closure.name() {
                Some(name) => write!(f, "•{name}"),
                None => f.write_str("•"),
            },
            FunctionValue::Member(bound) => write!(f, "ƒ {}", bound.member.name()),
            FunctionValue::Stream(kind) => write!(f, "ƒ {}", kind.name()),
        }
    }
}

/// A runtime datum.
#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    None,
    Text(Arc<str>),
    Number(Number),
    List(Arc<[Value]>),
    /// Insertion-ordered, without duplicates.
    Set(Arc<[Value]>),
    /// Insertion-ordered pairs with unique keys.
    Map(Arc<[(Value, Value)]>),
    Table(Arc<TableValue>),
    Structure(Arc<StructureValue>),
    Function(FunctionValue),
    /// A reference to a stream, before it is resolved to its latest value.
    Stream(StreamKind),
    Exception(Arc<Exception>),
}

impl Value {
    pub fn number(magnitude: f64, unit: Unit) -> Value {
        Value::Number(Number::new(magnitude, unit))
    }

    pub fn unitless(magnitude: f64) -> Value {
        Value::number(magnitude, Unit::unitless())
    }

    pub fn text(text: &str) -> Value {
        Value::Text(Arc::from(text))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(items.into())
    }

    /// A set of `items`, keeping the first of any duplicates.
    pub fn set(items: Vec<Value>) -> Value {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique.into())
    }

    /// A map of `pairs`; a later pair replaces an earlier one's value.
    pub fn map(pairs: Vec<(Value, Value)>) -> Value {
        let mut unique: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            match unique.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => unique.push((key, value)),
            }
        }
        Value::Map(unique.into())
    }

    pub fn exception(exception: Exception) -> Value {
        Value::Exception(Arc::new(exception))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_exception(&self) -> Option<&Exception> {
        match self {
            Value::Exception(exception) => Some(exception),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Short type text used in exception messages, e.g. `#m` or `[]`.
    pub fn type_label(&self) -> String {
        match self {
            Value::Boolean(_) => "?".to_string(),
            Value::None => "ø".to_string(),
            Value::Text(_) => "''".to_string(),
            Value::Number(number) => format!("#{}", number.unit),
            Value::List(_) => "[]".to_string(),
            Value::Set(_) => "{}".to_string(),
            Value::Map(_) => "{:}".to_string(),
            Value::Table(_) => "⎡⎦".to_string(),
            Value::Structure(structure) => structure.name.to_string(),
            Value::Function(_) => "ƒ".to_string(),
            Value::Stream(kind) => format!("…{}", kind.name()),
            Value::Exception(_) => "!".to_string(),
        }
    }

    /// The static type describing this value, used to pick conversions and
    /// to answer `value•Type`.
    pub fn runtime_type(&self, ctx: &Context) -> Type {
        let union = |types: Vec<Type>| {
            types
                .into_iter()
                .reduce(|a, b| Type::union_of(a, b, ctx))
                .unwrap_or(Type::Never)
        };
        match self {
            Value::Boolean(_) => Type::Boolean,
            Value::None => Type::None,
            Value::Text(_) => Type::Text,
            Value::Number(number) => Type::Number(number.unit.clone()),
            Value::List(items) => Type::list(union(items.iter().map(|i| i.runtime_type(ctx)).collect())),
            Value::Set(items) => Type::set(union(items.iter().map(|i| i.runtime_type(ctx)).collect())),
            Value::Map(pairs) => Type::map(
                union(pairs.iter().map(|(k, _)| k.runtime_type(ctx)).collect()),
                union(pairs.iter().map(|(_, v)| v.runtime_type(ctx)).collect()),
            ),
            Value::Table(table) => Type::Table(
                table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(index, name)| Column {
                        name: name.clone(),
                        ty: union(
                            table
                                .rows
                                .iter()
                                .filter_map(|row| row.get(index))
                                .map(|cell| cell.runtime_type(ctx))
                                .collect(),
                        ),
                        has_default: false,
                        definition: None,
                    })
                    .collect(),
            ),
            Value::Structure(structure) => Type::Structure(StructureType {
                name: structure.name.clone(),
                definition: structure.definition.clone(),
            }),
            Value::Function(FunctionValue::Closure(closure)) => {
                Type::Function(function_type(&closure.definition, ctx))
            }
            Value::Function(FunctionValue::Creator(closure)) => {
                Type::Function(structure_creator(&closure.definition, ctx))
            }
            Value::Function(FunctionValue::Member(bound)) => {
                Type::Function(bound.member.signature(&bound.receiver.runtime_type(ctx)))
            }
            Value::Function(FunctionValue::Stream(kind)) => kind.creator_type(),
            Value::Stream(kind) => Type::stream(kind.item_type()),
            Value::Exception(_) => Type::Never,
        }
    }

    /// Parse literal text as given on a command line: numbers with units,
    /// `⊤` `⊥` `ø`, quoted text, and otherwise the text itself.
    pub fn from_literal(text: &str) -> Value {
        let trimmed = text.trim();
        match trimmed {
            "⊤" => return Value::Boolean(true),
            "⊥" => return Value::Boolean(false),
            "ø" => return Value::None,
            _ => {}
        }
        let quoted = trimmed.len() >= 2
            && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
                || (trimmed.starts_with('"') && trimmed.ends_with('"')));
        if quoted {
            return Value::text(&trimmed[1..trimmed.len() - 1]);
        }
        if trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            let (sign, digits) = match trimmed.strip_prefix('-') {
                Some(rest) => (-1.0, rest),
                None => (1.0, trimmed),
            };
            if let Some((magnitude, unit)) = split_number(digits) {
                if !magnitude.is_nan() {
                    return Value::number(sign * magnitude, unit);
                }
            }
        }
        Value::text(trimmed)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|pair| b.contains(pair))
            }
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.definition.same(&b.definition)
                        && a.input_names()
                            .iter()
                            .all(|name| a.property(name.as_str()) == b.property(name.as_str())))
            }
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Stream(a), Value::Stream(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => a == b,
            _ => false,
        }
    }
}

fn write_spaced<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write(f, item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(true) => f.write_str("⊤"),
            Value::Boolean(false) => f.write_str("⊥"),
            Value::None => f.write_str("ø"),
            Value::Text(text) => write!(f, "'{text}'"),
            Value::Number(number) => write!(f, "{number}"),
            Value::List(items) => {
                f.write_str("[")?;
                write_spaced(f, items, |f, item| write!(f, "{item}"))?;
                f.write_str("]")
            }
            Value::Set(items) => {
                f.write_str("{")?;
                write_spaced(f, items, |f, item| write!(f, "{item}"))?;
                f.write_str("}")
            }
            Value::Map(pairs) if pairs.is_empty() => f.write_str("{:}"),
            Value::Map(pairs) => {
                f.write_str("{")?;
                write_spaced(f, pairs, |f, (key, value)| write!(f, "{key}:{value}"))?;
                f.write_str("}")
            }
            Value::Table(table) => {
                f.write_str("⎡")?;
                write_spaced(f, &table.columns, |f, name| write!(f, "{name}"))?;
                f.write_str("⎦")?;
                for row in &table.rows {
                    f.write_str("⎡")?;
                    write_spaced(f, row, |f, cell| write!(f, "{cell}"))?;
                    f.write_str("⎦")?;
                }
                Ok(())
            }
            Value::Structure(structure) => {
                write!(f, "{}(", structure.name)?;
                let names = structure.input_names();
                write_spaced(f, &names, |f, name| match structure.property(name.as_str()) {
                    Some(value) => write!(f, "{name}:{value}"),
                    None => write!(f, "{name}:ø"),
                })?;
                f.write_str(")")
            }
            Value::Function(function) => write!(f, "{function}"),
            Value::Stream(kind) => write!(f, "…{}", kind.name()),
            Value::Exception(exception) => write!(f, "{exception}"),
        }
    }
}

#[cfg(test)]
mod tests;
