//! Lumen Types - structural typing and conflict detection.
//!
//! Everything here is a pure query over an immutable program, answered
//! through a [`Context`] that memoizes per node:
//!
//! - [`type_of`]: the type of any node, with the stream rule applied
//! - [`resolve()`]: what a name refers to at a given node
//! - [`conflicts_of`] / [`check`]: statically diagnosed problems
//! - [`candidates`]: nodes that could replace a child slot
//!
//! Types never fail to compute. When a type cannot be determined it is
//! [`Type::Unknown`], carrying the reason and the chain of causes, and the
//! conflict at its origin explains why.

mod builtins;
mod candidates;
mod check;
mod conflict;
mod context;
mod conversion;
mod infer;
mod project;
mod resolve;
mod ty;
mod unit;

pub use builtins::{BuiltinConversion, BuiltinMember, Receiver, StreamKind};
pub use candidates::candidates;
pub use check::{check, conflicts_of, local_conflicts};
pub use conflict::{Arg, Conflict, ConflictKind};
pub use context::Context;
pub use conversion::{conversions_in_scope, find_conversion, Conversion};
pub use infer::{
    bind_type, columns_of, definition_type, function_type, is_stream_position,
    literal_exponent, member_type, raw_type, structure_creator, structure_member_definition,
    type_of,
};
pub use project::{Project, Source};
pub use resolve::{
    borrowed, implements, reference_order, resolve, resolve_structure, scopes,
    structure_functions, Definition, Order,
};
pub use ty::{Column, FunctionType, Input, Reason, Refine, StructureType, Type, Unknown};
pub use unit::{split_number, Unit};

#[cfg(test)]
mod test_utils;
