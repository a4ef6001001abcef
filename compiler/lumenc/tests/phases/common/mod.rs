//! Shared helpers for phase tests.

use lumen_diagnostic::ErrorCode;
use lumenc::commands::{check_source, run_source, CheckReport, Options, RunReport};
use lumen_types::Project;

/// Check `source` as a lone main program.
pub fn check(source: &str) -> CheckReport {
    check_source(Project::parse(source))
}

/// Error codes of a check, in source order.
pub fn codes(report: &CheckReport) -> Vec<ErrorCode> {
    report.diagnostics.iter().map(|d| d.code).collect()
}

/// Run `source`, then produce each `(stream, value)` in order.
pub fn run(source: &str, produce: &[(&str, &str)]) -> RunReport {
    let options = Options {
        produce: produce
            .iter()
            .map(|(stream, value)| ((*stream).to_string(), (*value).to_string()))
            .collect(),
        ..Options::default()
    };
    run_source(Project::parse(source), &options).unwrap()
}

/// Displayed value of every pass.
pub fn shown(report: &RunReport) -> Vec<String> {
    report.values.iter().map(ToString::to_string).collect()
}
