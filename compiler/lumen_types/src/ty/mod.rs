//! The closed set of Lumen types and the structural `accepts` relation.
//!
//! # Acceptance
//!
//! `a.accepts(b, ctx)` answers "may a value of type `b` go where `a` is
//! expected":
//!
//! - identical primitives accept each other; numbers also need equal units
//! - containers and streams are covariant in their items
//! - function inputs are invariant, outputs covariant
//! - `A|B` accepts `X` when either side does; `X` accepts `A|B` only when
//!   it accepts both sides
//! - structures accept themselves and structures that declare them as an
//!   interface, directly or transitively
//! - [`Type::Any`] accepts everything; [`Type::Never`] is accepted by
//!   everything
//! - [`Type::Unknown`] accepts nothing and is accepted by nothing

use std::fmt;

use lumen_ir::{Name, Node};
use smallvec::{smallvec, SmallVec};

use crate::resolve::implements;
use crate::{Context, Unit};

/// A static type.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Boolean,
    None,
    Text,
    Number(Unit),
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Table(Vec<Column>),
    Function(FunctionType),
    Structure(StructureType),
    Stream(Box<Type>),
    Union(Box<Type>, Box<Type>),
    Any,
    /// The bottom type.
    Never,
    Unknown(Box<Unknown>),
}

/// A table column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: Name,
    pub ty: Type,
    pub has_default: bool,
    /// Header bind that declared the column, if any.
    pub definition: Option<Node>,
}

/// One function input.
#[derive(Clone, Debug, PartialEq)]
pub struct Input {
    pub name: Name,
    pub ty: Type,
    pub optional: bool,
    pub definition: Option<Node>,
}

impl Input {
    pub fn required(name: &str, ty: Type) -> Self {
        Input {
            name: Name::new(name),
            ty,
            optional: false,
            definition: None,
        }
    }
}

/// How a builtin's output depends on its inputs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Refine {
    /// A list of the output of the function given as input 0.
    ListOfFunctionOutput,
    /// The type of input 0.
    FirstInput,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub inputs: Vec<Input>,
    pub output: Box<Type>,
    /// Function or structure definition, for user-defined functions.
    pub definition: Option<Node>,
    pub refine: Option<Refine>,
}

impl FunctionType {
    pub fn new(inputs: Vec<Input>, output: Type) -> Self {
        FunctionType {
            inputs,
            output: Box::new(output),
            definition: None,
            refine: None,
        }
    }

    /// Inputs that must be given.
    pub fn required_count(&self) -> usize {
        self.inputs.iter().filter(|input| !input.optional).count()
    }
}

/// A user-defined structure, identified by its definition node.
#[derive(Clone, Debug)]
pub struct StructureType {
    pub name: Name,
    pub definition: Node,
}

impl PartialEq for StructureType {
    fn eq(&self, other: &Self) -> bool {
        self.definition.same(&other.definition)
    }
}

/// Why a type could not be determined.
#[derive(Clone, Debug, PartialEq)]
pub enum Reason {
    UnknownName(Name),
    UnknownTypeName(Name),
    UnknownProperty(Name),
    NotAFunction,
    Placeholder,
    Unparsable,
    /// The type depends on itself.
    Cycle,
    /// A block with no ending expression.
    NoExpression,
    /// A unit exponent that does not fit.
    UnitOverflow,
    /// Something this depends on is unknown; see `because`.
    Dependency,
}

/// An unknown type with the node it arose at and what caused it.
#[derive(Clone, Debug, PartialEq)]
pub struct Unknown {
    pub reason: Reason,
    pub node: Option<Node>,
    pub because: Option<Box<Unknown>>,
}

impl Unknown {
    /// This reason followed by each cause, outermost first.
    pub fn chain(&self) -> SmallVec<[&Unknown; 4]> {
        let mut out: SmallVec<[&Unknown; 4]> = smallvec![self];
        let mut current = self;
        while let Some(cause) = &current.because {
            out.push(cause);
            current = cause;
        }
        out
    }

    /// The innermost cause.
    pub fn root(&self) -> &Unknown {
        self.chain().last().copied().unwrap_or(self)
    }
}

impl Type {
    pub fn unitless() -> Type {
        Type::Number(Unit::unitless())
    }

    pub fn unknown(reason: Reason, node: &Node) -> Type {
        Type::Unknown(Box::new(Unknown {
            reason,
            node: Some(node.clone()),
            because: None,
        }))
    }

    /// An unknown at `node` caused by `cause`, which must be unknown itself
    /// to be recorded.
    pub fn caused_by(cause: &Type, node: &Node) -> Type {
        Type::Unknown(Box::new(Unknown {
            reason: Reason::Dependency,
            node: Some(node.clone()),
            because: cause.as_unknown().map(|unknown| Box::new(unknown.clone())),
        }))
    }

    pub fn list(item: Type) -> Type {
        Type::List(Box::new(item))
    }

    pub fn set(item: Type) -> Type {
        Type::Set(Box::new(item))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn stream(item: Type) -> Type {
        Type::Stream(Box::new(item))
    }

    pub fn optional(ty: Type) -> Type {
        Type::Union(Box::new(ty), Box::new(Type::None))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown(_))
    }

    pub fn as_unknown(&self) -> Option<&Unknown> {
        match self {
            Type::Unknown(unknown) => Some(unknown),
            _ => None,
        }
    }

    /// Unknown or `Any`: too little is known to report a conflict.
    pub fn is_vague(&self) -> bool {
        matches!(self, Type::Unknown(_) | Type::Any)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean | Type::Never)
    }

    pub fn as_number(&self) -> Option<&Unit> {
        match self {
            Type::Number(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn stream_item(&self) -> Option<&Type> {
        match self {
            Type::Stream(item) => Some(item),
            _ => None,
        }
    }

    /// A stream type becomes its item type; anything else is unchanged.
    #[must_use]
    pub fn latest(self) -> Type {
        match self {
            Type::Stream(item) => *item,
            other => other,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn columns(&self) -> Option<&[Column]> {
        match self {
            Type::Table(columns) => Some(columns),
            _ => None,
        }
    }

    pub fn accepts(&self, candidate: &Type, ctx: &Context) -> bool {
        match (self, candidate) {
            (Type::Unknown(_), _) | (_, Type::Unknown(_)) => false,
            (_, Type::Never) | (Type::Any, _) => true,
            (_, Type::Union(a, b)) => self.accepts(a, ctx) && self.accepts(b, ctx),
            (Type::Union(a, b), _) => a.accepts(candidate, ctx) || b.accepts(candidate, ctx),
            (Type::Boolean, Type::Boolean)
            | (Type::None, Type::None)
            | (Type::Text, Type::Text) => true,
            (Type::Number(expected), Type::Number(given)) => expected == given,
            (Type::List(expected), Type::List(given))
            | (Type::Set(expected), Type::Set(given))
            | (Type::Stream(expected), Type::Stream(given)) => expected.accepts(given, ctx),
            (Type::Map(key, value), Type::Map(given_key, given_value)) => {
                key.accepts(given_key, ctx) && value.accepts(given_value, ctx)
            }
            (Type::Table(expected), Type::Table(given)) => {
                expected.len() == given.len()
                    && expected.iter().all(|column| {
                        given.iter().any(|other| {
                            other.name == column.name && column.ty.accepts(&other.ty, ctx)
                        })
                    })
            }
            (Type::Function(expected), Type::Function(given)) => {
                expected.inputs.len() == given.inputs.len()
                    && expected.inputs.iter().zip(&given.inputs).all(|(a, b)| {
                        matches!(a.ty, Type::Any)
                            || matches!(b.ty, Type::Any)
                            || (a.ty.accepts(&b.ty, ctx) && b.ty.accepts(&a.ty, ctx))
                    })
                    && expected.output.accepts(&given.output, ctx)
            }
            (Type::Structure(expected), Type::Structure(given)) => {
                implements(&given.definition, &expected.definition, ctx)
            }
            _ => false,
        }
    }

    /// The narrowest type accepting both `a` and `b`.
    ///
    /// A cyclic unknown on one side yields the other side, so a recursive
    /// function's base case still determines its type.
    pub fn union_of(a: Type, b: Type, ctx: &Context) -> Type {
        let cyclic = |ty: &Type| ty.as_unknown().is_some_and(|u| u.root().reason == Reason::Cycle);
        match (&a, &b) {
            (Type::Unknown(_), _) if cyclic(&a) && !b.is_unknown() => b,
            (_, Type::Unknown(_)) if cyclic(&b) && !a.is_unknown() => a,
            (Type::Unknown(_), _) => a,
            (_, Type::Unknown(_)) => b,
            _ if a.accepts(&b, ctx) => a,
            _ if b.accepts(&a, ctx) => b,
            _ => Type::Union(Box::new(a), Box::new(b)),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Boolean => f.write_str("?"),
            Type::None => f.write_str("ø"),
            Type::Text => f.write_str("''"),
            Type::Number(unit) => write!(f, "#{unit}"),
            Type::List(item) => write!(f, "[{item}]"),
            Type::Set(item) => write!(f, "{{{item}}}"),
            Type::Map(key, value) => write!(f, "{{{key}:{value}}}"),
            Type::Table(columns) => {
                f.write_str("⎡")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}•{}", column.name, column.ty)?;
                }
                f.write_str("⎦")
            }
            Type::Function(function) => {
                f.write_str("ƒ(")?;
                for (i, input) in function.inputs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}•{}", input.name, input.ty)?;
                }
                write!(f, ") {}", function.output)
            }
            Type::Structure(structure) => write!(f, "{}", structure.name),
            Type::Stream(item) => write!(f, "…{item}"),
            Type::Union(a, b) => write!(f, "{a}|{b}"),
            Type::Any => f.write_str("any"),
            Type::Never => f.write_str("never"),
            Type::Unknown(_) => f.write_str("unknown"),
        }
    }
}
