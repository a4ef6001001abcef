//! Diagnostic emitters.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Something that writes diagnostics somewhere.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    fn flush(&mut self);

    /// Closing line summarizing error and warning counts.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
