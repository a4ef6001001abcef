//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support. When
//! the emitter knows the source text, label spans are shown as
//! `line:column` followed by the offending line.

use std::io::{self, Write};

use lumen_ir::Span;

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode, chosen on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `is_tty` only matters for [`ColorMode::Auto`].
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }

    /// Parse `auto`, `always` or `never`.
    pub fn parse(text: &str) -> Option<ColorMode> {
        match text {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

struct SourceView {
    text: String,
    lines: LineOffsetTable,
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceView>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Resolve spans against `source` when rendering labels.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(SourceView {
            text: source.to_string(),
            lines: LineOffsetTable::build(source),
        });
        self
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
            Severity::Help => colors::HELP,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_code(&mut self, code: &str) {
        self.write_colored(&format!("[{code}]"), colors::BOLD);
    }

    fn location(&self, span: Span) -> String {
        match &self.source {
            Some(view) => {
                let (line, column) = view.lines.offset_to_line_col(&view.text, span.start);
                format!("{line}:{column}")
            }
            None => format!("{span:?}"),
        }
    }

    fn write_snippet(&mut self, span: Span) {
        let Some(view) = &self.source else {
            return;
        };
        let (line, column) = view.lines.offset_to_line_col(&view.text, span.start);
        let text = view.lines.line_text(&view.text, line).to_string();
        let width = view
            .text
            .get(span.to_range())
            .map_or(1, |covered| covered.lines().next().map_or(1, |l| l.chars().count()))
            .max(1);
        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let _ = writeln!(self.writer, "  {pad} |");
        let _ = writeln!(self.writer, "  {gutter} | {text}");
        let marks = format!("{}{}", " ".repeat(column as usize - 1), "^".repeat(width));
        let _ = write!(self.writer, "  {pad} | ");
        self.write_colored(&marks, colors::ERROR);
        let _ = writeln!(self.writer);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity);
        self.write_code(diagnostic.code.as_str());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = self.location(label.span);
            let _ = write!(self.writer, "  {marker} {location}: ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
            if label.is_primary {
                self.write_snippet(label.span);
            }
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests;
