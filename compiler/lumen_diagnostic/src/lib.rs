//! Lumen Diagnostic - reporting for every phase.
//!
//! - [`Diagnostic`]: a rendered problem with labels, notes and suggestions
//! - [`ErrorCode`]: stable codes (`E0xxx` lexer, `E1xxx` parser, `E3xxx`
//!   conflicts, `E6xxx` runtime exceptions)
//! - [`Locale`]: message catalog lookup keyed by stable identifiers such as
//!   `MissingInput.primary`, with `$1`…`$n` substitution
//! - [`emitter`]: output formats, currently a colored terminal emitter
//!
//! The analysis crates never build message text themselves. They produce
//! keys and arguments, and the caller picks the catalog.

mod diagnostic;
pub mod emitter;
mod error_code;
mod locale;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use locale::{English, Locale};
