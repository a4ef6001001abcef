//! Lumen IR - the data model shared by every phase.
//!
//! - [`Span`]: byte ranges into source text
//! - [`Name`]: identifier text, cheap to clone and hash
//! - [`Token`] / [`TokenKind`] / [`TokenList`]: tokenizer output
//! - [`Node`]: the immutable, structurally shared syntax tree
//! - [`BinaryOp`] / [`UnaryOp`]: operator symbols and the precedence table
//!
//! # Tree Invariants
//!
//! - Every node's children are exactly the slots declared by its grammar
//!   ([`Node::grammar`]), in source order.
//! - Nodes never change after construction. Editing goes through
//!   [`Node::replace`], which returns a new node sharing every untouched
//!   child by reference.
//! - Identity is by allocation ([`NodeId`]), never by structure: two
//!   separately parsed copies of the same text are distinct nodes.

mod name;
pub mod node;
mod operators;
mod span;
mod token;

pub use name::Name;
pub use node::*;
pub use operators::{BinaryOp, UnaryOp};
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
