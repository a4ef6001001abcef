#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::ErrorCode;
use pretty_assertions::assert_eq;

fn render(diagnostic: &Diagnostic, source: Option<&str>, colors: bool) -> String {
    let mode = if colors { ColorMode::Always } else { ColorMode::Never };
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), mode, false);
    if let Some(source) = source {
        emitter = emitter.with_source(source);
    }
    emitter.emit(diagnostic);
    emitter.flush();
    String::from_utf8(emitter.into_inner()).unwrap()
}

fn sample() -> Diagnostic {
    Diagnostic::error(ErrorCode::E3001)
        .with_message("total isn't defined here")
        .with_label(Span::new(8, 13), "total isn't defined here")
        .with_note("names are case-sensitive")
}

#[test]
fn plain_output_with_source() {
    let text = render(&sample(), Some("x: 1\ny: total\n"), false);
    assert_eq!(
        text,
        "error[E3001]: total isn't defined here\n\
         \x20 --> 2:4: total isn't defined here\n\
         \x20   |\n\
         \x20 2 | y: total\n\
         \x20   |    ^^^^^\n\
         \x20 = note: names are case-sensitive\n\n"
    );
}

#[test]
fn without_source_spans_are_ranges() {
    let text = render(&sample(), None, false);
    assert!(text.contains("--> 8..13:"));
    assert!(!text.contains('|'));
}

#[test]
fn colors_add_escape_codes() {
    let text = render(&sample(), None, true);
    assert!(text.contains("\x1b["));
    assert!(text.contains("E3001"));
}

#[test]
fn summary_counts() {
    let mut emitter = TerminalEmitter::with_color_mode(Vec::new(), ColorMode::Never, false);
    emitter.emit_summary(2, 1);
    emitter.emit_summary(0, 1);
    emitter.emit_summary(0, 0);
    let text = String::from_utf8(emitter.into_inner()).unwrap();
    assert_eq!(
        text,
        "error: aborting due to 2 previous errors; 1 warning emitted\nwarning: 1 warning emitted\n"
    );
}

#[test]
fn color_mode_parsing() {
    assert_eq!(ColorMode::parse("always"), Some(ColorMode::Always));
    assert_eq!(ColorMode::parse("sometimes"), None);
    assert!(ColorMode::Auto.should_use_colors(true));
    assert!(!ColorMode::Auto.should_use_colors(false));
}
