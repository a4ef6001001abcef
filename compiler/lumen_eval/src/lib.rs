//! Lumen Eval - the stepped evaluator.
//!
//! Programs are lowered into flat step plans ([`plan`]) and executed one
//! step at a time by an [`Evaluator`] on an explicit frame stack, so a
//! pass can be paused, inspected, and stepped backward.
//!
//! # Architecture
//!
//! - `Value`: immutable runtime values with `Arc`-shared containers
//! - `Scope`: lexical bindings shared by frames, closures and instances
//! - `evaluate_binary` / `evaluate_unary`: direct operator dispatch
//! - `methods`: builtin members and conversions
//! - `StreamRegistry` / `StreamSender`: stream histories and the produce
//!   queue drained by [`Evaluator::tick`]
//!
//! Runtime failures are [`Exception`] values that end the pass; misuse of
//! the host API is a [`ProduceError`].

mod environment;
pub mod errors;
pub mod interpreter;
mod methods;
mod operators;
pub mod plan;
pub mod streams;
mod value;

pub use environment::Scope;
pub use errors::{EvalResult, Exception, ExceptionKind, ProduceError};
pub use interpreter::{EvalConfig, Evaluator, EvaluatorBuilder, State};
pub use operators::{evaluate_binary, evaluate_unary};
pub use plan::{compile, Op, Plan, PlanKind, Step};
pub use streams::{StreamRegistry, StreamSender};
pub use value::{BoundMember, Closure, FunctionValue, Number, StructureValue, TableValue, Value};
