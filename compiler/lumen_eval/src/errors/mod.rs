//! Runtime exceptions and host-facing errors.
//!
//! A step that cannot produce a value produces an [`Exception`] instead.
//! Exceptions are values: they end the current pass and become its result,
//! but never unwind out of the evaluator's driving call. Factory functions
//! below are the only way the evaluator builds them, so every message key
//! and argument order lives in one place.
//!
//! Misuse of the host API (producing into a stream that does not exist) is
//! a [`ProduceError`], an ordinary Rust error.

use std::fmt;

use lumen_diagnostic::{Diagnostic, ErrorCode, Locale, Severity};
use lumen_ir::{Name, Node};
use lumen_types::Context;

/// Every kind of runtime exception, in error code order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    UnknownName,
    TypeMismatch,
    ArityMismatch,
    MissingInput,
    NotAFunction,
    UnknownProperty,
    MissingConversion,
    DivisionByZero,
    StepLimit,
    CallDepthLimit,
    Placeholder,
    Unparsable,
    ValueExpected,
    UnknownStream,
}

impl ExceptionKind {
    pub const fn name(self) -> &'static str {
        match self {
            ExceptionKind::UnknownName => "UnknownName",
            ExceptionKind::TypeMismatch => "TypeMismatch",
            ExceptionKind::ArityMismatch => "ArityMismatch",
            ExceptionKind::MissingInput => "MissingInput",
            ExceptionKind::NotAFunction => "NotAFunction",
            ExceptionKind::UnknownProperty => "UnknownProperty",
            ExceptionKind::MissingConversion => "MissingConversion",
            ExceptionKind::DivisionByZero => "DivisionByZero",
            ExceptionKind::StepLimit => "StepLimit",
            ExceptionKind::CallDepthLimit => "CallDepthLimit",
            ExceptionKind::Placeholder => "Placeholder",
            ExceptionKind::Unparsable => "Unparsable",
            ExceptionKind::ValueExpected => "ValueExpected",
            ExceptionKind::UnknownStream => "UnknownStream",
        }
    }

    pub fn code(self) -> ErrorCode {
        ErrorCode::EXCEPTIONS[self as usize]
    }

    /// Locale key of this kind's message.
    pub fn key(self) -> String {
        format!("Exception.{}", self.name())
    }

    /// Whether this kind reports an exhausted evaluation budget rather
    /// than a problem in the program.
    pub const fn is_limit(self) -> bool {
        matches!(self, ExceptionKind::StepLimit | ExceptionKind::CallDepthLimit)
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A runtime exception: its kind, the node being evaluated when it arose,
/// and rendered message arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Exception {
    pub kind: ExceptionKind,
    pub node: Option<Node>,
    pub args: Vec<String>,
}

impl Exception {
    pub fn new(kind: ExceptionKind, node: Option<&Node>) -> Self {
        Exception {
            kind,
            node: node.cloned(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Attach `node` if no node is known yet.
    #[must_use]
    pub fn at(mut self, node: &Node) -> Self {
        if self.node.is_none() {
            self.node = Some(node.clone());
        }
        self
    }

    pub fn message(&self, locale: &dyn Locale) -> String {
        let key = self.kind.key();
        locale.render(&key, &self.args).unwrap_or(key)
    }

    pub fn to_diagnostic(&self, ctx: &Context, locale: &dyn Locale) -> Diagnostic {
        let message = self.message(locale);
        let diagnostic = Diagnostic::new(self.kind.code(), Severity::Error).with_message(&message);
        match &self.node {
            Some(node) => diagnostic.with_label(ctx.span(node), message),
            None => diagnostic,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.kind)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(", "))?;
        }
        Ok(())
    }
}

// Name and call errors

pub fn unknown_name(name: &Name, node: &Node) -> Exception {
    Exception::new(ExceptionKind::UnknownName, Some(node)).with_arg(name)
}

pub fn arity_mismatch(expected: usize, given: usize, node: &Node) -> Exception {
    Exception::new(ExceptionKind::ArityMismatch, Some(node))
        .with_arg(expected)
        .with_arg(given)
}

pub fn missing_input(name: &Name, node: &Node) -> Exception {
    Exception::new(ExceptionKind::MissingInput, Some(node)).with_arg(name)
}

pub fn not_a_function(description: &str, node: &Node) -> Exception {
    Exception::new(ExceptionKind::NotAFunction, Some(node)).with_arg(description)
}

pub fn unknown_property(name: &str, receiver: &str, node: &Node) -> Exception {
    Exception::new(ExceptionKind::UnknownProperty, Some(node))
        .with_arg(name)
        .with_arg(receiver)
}

// Value errors

pub fn type_mismatch(expected: impl fmt::Display, given: impl fmt::Display) -> Exception {
    Exception::new(ExceptionKind::TypeMismatch, None)
        .with_arg(expected)
        .with_arg(given)
}

/// A number literal whose unit exponents do not fit.
pub fn unit_overflow(literal: &Node) -> Exception {
    type_mismatch("#", literal.print().trim()).at(literal)
}

pub fn missing_conversion(from: impl fmt::Display, to: impl fmt::Display, node: &Node) -> Exception {
    Exception::new(ExceptionKind::MissingConversion, Some(node))
        .with_arg(from)
        .with_arg(to)
}

pub fn division_by_zero() -> Exception {
    Exception::new(ExceptionKind::DivisionByZero, None)
}

pub fn value_expected(node: &Node) -> Exception {
    Exception::new(ExceptionKind::ValueExpected, Some(node))
}

// Limits

pub fn step_limit(max_steps: usize) -> Exception {
    Exception::new(ExceptionKind::StepLimit, None).with_arg(max_steps)
}

pub fn call_depth_limit(max_depth: usize, node: &Node) -> Exception {
    Exception::new(ExceptionKind::CallDepthLimit, Some(node)).with_arg(max_depth)
}

// Incomplete programs

pub fn placeholder(node: &Node) -> Exception {
    Exception::new(ExceptionKind::Placeholder, Some(node))
}

pub fn unparsable(node: &Node) -> Exception {
    Exception::new(ExceptionKind::Unparsable, Some(node))
}

pub fn unknown_stream(name: &str, node: Option<&Node>) -> Exception {
    Exception::new(ExceptionKind::UnknownStream, node).with_arg(name)
}

/// Result of a native operation.
pub type EvalResult<T = crate::Value> = Result<T, Exception>;

/// Errors from the host side of the stream interface.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProduceError {
    #[error("there is no stream named `{0}`")]
    UnknownStream(String),
    #[error("stream `{stream}` expects {expected} values")]
    WrongValue { stream: String, expected: String },
}
