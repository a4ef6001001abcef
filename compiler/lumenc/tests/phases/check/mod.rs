//! Conflict reporting as the `check` command sees it.

use lumen_diagnostic::{ErrorCode, Severity};
use lumen_ir::Span;
use pretty_assertions::assert_eq;

use crate::common::{check, codes};

#[test]
fn clean_programs_have_no_diagnostics() {
    let report = check("ƒ double(n•#) n · 2\ndouble(21)");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert!(!report.has_errors());
}

#[test]
fn conflicts_become_coded_diagnostics() {
    let report = check("1m + 2s");
    assert_eq!(codes(&report), vec![ErrorCode::E3012]);
    assert_eq!(report.error_count(), 1);
    let diagnostic = &report.diagnostics[0];
    let labels: Vec<_> = diagnostic
        .labels
        .iter()
        .map(|label| (label.span, label.is_primary))
        .collect();
    assert_eq!(labels, vec![(Span::new(5, 7), true), (Span::new(0, 2), false)]);
    assert!(!diagnostic.message.is_empty());
}

#[test]
fn unknown_names_are_reported_in_english() {
    let report = check("total + 1");
    assert_eq!(codes(&report), vec![ErrorCode::E3001]);
    assert!(
        report.diagnostics[0].message.contains("total"),
        "{}",
        report.diagnostics[0].message
    );
}

#[test]
fn minor_conflicts_are_warnings() {
    let report = check("1\n2");
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    assert!(!report.has_errors());
}

#[test]
fn diagnostics_follow_source_order() {
    let report = check("a: x\nb: y\na + b");
    let starts: Vec<u32> = report
        .diagnostics
        .iter()
        .map(|d| d.labels[0].span.start)
        .collect();
    assert_eq!(starts.len(), 2);
    assert!(starts[0] < starts[1]);
}
