//! Command handlers for the Lumen CLI.
//!
//! Each submodule implements one command. Shared pieces live here: option
//! parsing, file reading, loading borrowed sources, and the emitter setup.

use std::path::Path;

use lumen_diagnostic::emitter::{ColorMode, TerminalEmitter};
use lumen_eval::{EvalConfig, ProduceError};
use lumen_ir::{Name, NodeKind};
use lumen_types::Project;
use rustc_hash::FxHashSet;

mod check;
mod debug;
mod run;

pub use check::{check_file, check_source, CheckReport};
pub use debug::{lex_file, parse_file, steps_file, steps_source};
pub use run::{run_file, run_source, RunReport};

/// File extension of Lumen sources; `↓ name` loads `name.lumen` from the
/// directory of the main file.
pub const EXTENSION: &str = "lumen";

/// Problems with the command line itself.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("`{flag}` expects a whole number, got `{value}`")]
    InvalidNumber { flag: String, value: String },
    #[error("`--produce` expects `Stream:value`, got `{0}`")]
    MalformedProduce(String),
    #[error("unknown color mode `{0}` (expected auto, always or never)")]
    UnknownColor(String),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error(transparent)]
    Produce(#[from] ProduceError),
}

/// Options shared by every command. Flags a command has no use for are
/// accepted and ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Options {
    pub path: Option<String>,
    pub config: EvalConfig,
    /// `(stream, value text)` pairs, in command-line order.
    pub produce: Vec<(String, String)>,
    pub color: ColorMode,
}

impl Options {
    pub fn parse(args: &[String]) -> Result<Options, CliError> {
        let mut options = Options::default();
        for arg in args {
            if let Some(value) = arg.strip_prefix("--max-steps=") {
                options.config.max_steps = whole_number("--max-steps", value)?;
            } else if let Some(value) = arg.strip_prefix("--max-depth=") {
                options.config.max_depth = whole_number("--max-depth", value)?;
            } else if let Some(pair) = arg.strip_prefix("--produce=") {
                let Some((stream, value)) = pair.split_once(':') else {
                    return Err(CliError::MalformedProduce(pair.to_string()));
                };
                if stream.is_empty() {
                    return Err(CliError::MalformedProduce(pair.to_string()));
                }
                options.produce.push((stream.to_string(), value.to_string()));
            } else if let Some(mode) = arg.strip_prefix("--color=") {
                options.color =
                    ColorMode::parse(mode).ok_or_else(|| CliError::UnknownColor(mode.to_string()))?;
            } else if arg.starts_with("--") {
                return Err(CliError::UnknownOption(arg.clone()));
            } else if options.path.is_none() {
                options.path = Some(arg.clone());
            } else {
                return Err(CliError::UnknownOption(arg.clone()));
            }
        }
        Ok(options)
    }

    /// Emitter on stderr honoring `--color`, showing `source` in labels.
    pub(crate) fn emitter(&self, source: &str) -> TerminalEmitter<std::io::Stderr> {
        let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
        TerminalEmitter::with_color_mode(std::io::stderr(), self.color, is_tty).with_source(source)
    }
}

fn whole_number(flag: &str, value: &str) -> Result<usize, CliError> {
    value.parse().map_err(|_| CliError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Read a file from disk, exiting with a user-friendly error message on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Parse `text` as the main program and add every source it borrows,
/// transitively, that exists as a file next to `path`. Missing sources are
/// left for the checker to report.
pub fn load_project(path: &Path, text: &str) -> Project {
    let mut project = Project::parse(text);
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let mut pending = borrowed_sources(&project, Project::MAIN);
    let mut seen = FxHashSet::default();
    while let Some(name) = pending.pop() {
        if !seen.insert(name.clone()) || project.source(&name).is_some() {
            continue;
        }
        let file = directory.join(format!("{name}.{EXTENSION}"));
        let Ok(text) = std::fs::read_to_string(&file) else {
            tracing::debug!(source = %name, file = %file.display(), "borrowed source not found");
            continue;
        };
        project = project.with_source_text(&name, &text);
        pending.extend(borrowed_sources(&project, &name));
    }
    project
}

fn borrowed_sources(project: &Project, source: &str) -> Vec<Name> {
    let Some(source) = project.source(source) else {
        return Vec::new();
    };
    source
        .borrows()
        .iter()
        .filter_map(|borrow| match borrow.kind() {
            NodeKind::Borrow(borrow) => Some(borrow.source_name()),
            _ => None,
        })
        .collect()
}
