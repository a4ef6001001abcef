//! The `check` command: report every conflict in a program.

use std::path::Path;
use std::sync::Arc;

use lumen_diagnostic::emitter::DiagnosticEmitter;
use lumen_diagnostic::{Diagnostic, English};
use lumen_types::{check, Context, Project};

use super::{load_project, read_file, Options};

/// Conflicts of one program, rendered in English.
#[derive(Debug)]
pub struct CheckReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Minor conflicts are warnings and never fail a check.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Check the main program of `project`.
pub fn check_source(project: Project) -> CheckReport {
    let ctx = Context::for_project(Arc::new(project));
    let mut diagnostics: Vec<Diagnostic> = check(&ctx)
        .iter()
        .map(|conflict| conflict.to_diagnostic(&ctx, &English))
        .collect();
    // Stable by position so output follows the source.
    diagnostics.sort_by_key(|d| d.labels.first().map_or(0, |label| label.span.start));
    CheckReport { diagnostics }
}

/// Check a file, printing conflicts to stderr and exiting 1 on errors.
pub fn check_file(path: &str, options: &Options) {
    let content = read_file(path);
    let report = check_source(load_project(Path::new(path), &content));

    let mut emitter = options.emitter(&content);
    emitter.emit_all(&report.diagnostics);
    let (errors, warnings) = (report.error_count(), report.warning_count());
    if errors > 0 || warnings > 0 {
        emitter.emit_summary(errors, warnings);
    }
    emitter.flush();

    if report.has_errors() {
        std::process::exit(1);
    }
    println!("OK: {path}");
}
