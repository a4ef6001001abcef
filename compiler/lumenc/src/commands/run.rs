//! The `run` command: evaluate a program, then feed it stream values.

use std::path::Path;

use lumen_diagnostic::emitter::DiagnosticEmitter;
use lumen_diagnostic::{Diagnostic, English};
use lumen_eval::{Evaluator, Value};
use lumen_types::Project;

use super::{load_project, read_file, CliError, Options};

/// Every pass of one run.
#[derive(Debug)]
pub struct RunReport {
    /// The first pass, then one per `--produce`.
    pub values: Vec<Value>,
    /// Exceptions raised by any pass, in pass order.
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn has_exceptions(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }
}

/// Run `project` once, then once per produced value.
pub fn run_source(project: Project, options: &Options) -> Result<RunReport, CliError> {
    let mut evaluator = Evaluator::builder(project).config(options.config).build();
    let mut report = RunReport {
        values: Vec::new(),
        diagnostics: Vec::new(),
    };

    let first = evaluator.run();
    record(&evaluator, first, &mut report);
    for (stream, text) in &options.produce {
        evaluator.produce(stream, Value::from_literal(text))?;
        if let Some(value) = evaluator.tick() {
            record(&evaluator, value, &mut report);
        }
    }
    Ok(report)
}

fn record(evaluator: &Evaluator, value: Value, report: &mut RunReport) {
    if let Some(exception) = value.as_exception() {
        report
            .diagnostics
            .push(exception.to_diagnostic(evaluator.context(), &English));
    }
    report.values.push(value);
}

/// Run a file, printing each pass's value and exiting 1 on exceptions.
pub fn run_file(path: &str, options: &Options) {
    let content = read_file(path);
    let project = load_project(Path::new(path), &content);
    let report = match run_source(project, options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    for value in &report.values {
        println!("{value}");
    }
    if report.has_exceptions() {
        let mut emitter = options.emitter(&content);
        emitter.emit_all(&report.diagnostics);
        emitter.flush();
        std::process::exit(1);
    }
}
