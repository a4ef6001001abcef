//! Whole runs: first pass, produced values, exceptions and step plans.

use lumen_diagnostic::ErrorCode;
use lumen_eval::{EvalConfig, ProduceError, Value};
use lumen_types::Project;
use lumenc::commands::{run_source, steps_source, CliError, Options};
use pretty_assertions::assert_eq;

use crate::common::{run, shown};

#[test]
fn a_run_without_streams_is_one_pass() {
    let report = run("ƒ double(n•#) n · 2\ndouble(21)", &[]);
    assert_eq!(shown(&report), vec!["42"]);
    assert!(!report.has_exceptions());
}

#[test]
fn each_produced_value_is_a_pass() {
    let report = run(
        "clicks: 0 … ∆ Button() … . + 1\nclicks",
        &[("Button", "⊤"), ("Button", "⊥"), ("Button", "⊤")],
    );
    assert_eq!(shown(&report), vec!["0", "1", "2", "3"]);
}

#[test]
fn produced_values_are_literals() {
    let report = run("Key()", &[("Key", "'a'"), ("Key", "b")]);
    assert_eq!(
        report.values,
        vec![Value::text(""), Value::text("a"), Value::text("b")]
    );
    let report = run("Time()", &[("Time", "5")]);
    assert_eq!(report.last().map(ToString::to_string), Some("5ms".to_string()));
}

#[test]
fn exceptions_become_diagnostics() {
    let report = run("1 ÷ 0", &[]);
    assert!(report.has_exceptions());
    assert_eq!(report.diagnostics[0].code, ErrorCode::E6008);
    assert_eq!(report.diagnostics[0].labels.len(), 1);
}

#[test]
fn exceptions_are_reported_per_pass() {
    let report = run("k: Key()\n(k = 'x') ? (1 ÷ 0) 1", &[("Key", "'x'"), ("Key", "'y'")]);
    assert_eq!(report.values.len(), 3);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.values[2], Value::unitless(1.0));
}

#[test]
fn limits_come_from_options() {
    let options = Options {
        config: EvalConfig {
            max_steps: 100,
            ..EvalConfig::default()
        },
        ..Options::default()
    };
    let project = Project::parse("ƒ forever(n•#) forever(n + 1)\nforever(1)");
    let report = run_source(project, &options).unwrap();
    assert_eq!(report.diagnostics[0].code, ErrorCode::E6009);
}

#[test]
fn producing_to_an_unknown_stream_fails_the_run() {
    let options = Options {
        produce: vec![("Wind".to_string(), "3".to_string())],
        ..Options::default()
    };
    let result = run_source(Project::parse("1"), &options);
    assert_eq!(
        result.map(|report| report.values.len()),
        Err(CliError::Produce(ProduceError::UnknownStream("Wind".to_string())))
    );
}

#[test]
fn steps_list_every_plan() {
    let listing = steps_source(Project::parse("ƒ double(n•#) n · 2\ndouble(21)"));
    assert!(listing.starts_with("program ("), "{listing}");
    assert!(listing.contains("call 1"), "{listing}");
    assert!(listing.contains("ƒ double ("), "{listing}");
    assert!(listing.contains("binary ·"), "{listing}");
}
