// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Phase-based end-to-end tests.
//!
//! Unit tests live next to the code in each crate. These tests drive whole
//! programs through the same entry points the `lumen` binary uses.
//!
//! # Organization
//!
//! - `parse/` - tokenizing and parsing whole programs
//! - `check/` - conflicts as the `check` command reports them
//! - `eval/` - runs, produced stream values, and step plans
//! - `cli/` - the `lumen` binary: output and exit codes
//! - `common/` - shared helpers
//!
//! # Running Phase Tests
//!
//! ```bash
//! cargo test -p lumenc --test phases
//! cargo test -p lumenc --test phases eval
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/parse/mod.rs"]
mod parse;

#[path = "phases/check/mod.rs"]
mod check;

#[path = "phases/eval/mod.rs"]
mod eval;

#[path = "phases/cli/mod.rs"]
mod cli;
