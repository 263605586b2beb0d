//! Typed diagnostics accumulated through a compilation pass and rendered
//! at the CLI boundary, rather than printed eagerly from inside the
//! pipeline (spec §7). The gutter format matches the reference
//! implementation's `display_err_msg`.

use std::fmt;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum DiagnosticKind {
    // Parse
    IndentError,
    OrphanInstruction,
    DuplicateRoutine { first_line: u32 },
    // Validate
    UnknownInstruction,
    DisallowedHere { routine: String },
    ArgumentMismatch,
    UnknownRoutineRef { name: String },
    // Semantic
    MultipleMalloc,
    MemoryBeforeMalloc { mnemonic: &'static str },
    DuplicateIOBlock { position: i32 },
    EmptyRoutine,
    MissingStart,
    NumericPrecisionRisk,
}

/// One parse/validate/semantic finding. `routine` is empty when the
/// diagnostic precedes any routine header (e.g. an orphan instruction).
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub line: u32,
    pub routine: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, line: u32, routine: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Error, kind, line, routine: routine.into(), message: message.into() }
    }

    pub fn warning(kind: DiagnosticKind, line: u32, routine: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic { severity: Severity::Warning, kind, line, routine: routine.into(), message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Renders one diagnostic in the reference implementation's 5-column
/// gutter style:
/// ```text
///       | routine_name:
///    12 |     MALLOC 4
///       + error message here
/// ```
/// The routine line is omitted when `routine` is empty.
pub fn render(diag: &Diagnostic, source_line: &str) -> String {
    let gutter = format!("{:>5}", diag.line);
    let pad = " ".repeat(gutter.len());
    let mut out = String::new();
    if !diag.routine.is_empty() {
        out.push_str(&format!("{} | {}:\n", pad, diag.routine));
    }
    out.push_str(&format!("{} |     {}\n", gutter, source_line));
    let prefix = if diag.severity == Severity::Warning { "WARNING: " } else { "" };
    out.push_str(&format!("{} + {}{}\n", pad, prefix, diag.message));
    out
}

/// Accumulates diagnostics across a whole compilation and decides
/// whether the run is clean enough to produce output (spec §7: a
/// nonzero error count yields no output write; downstream phases may
/// still run to surface further diagnostics).
#[derive(Default, Debug)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.items.push(diag);
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl fmt::Display for DiagnosticBag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for d in &self.items {
            write!(f, "{} ({:?})\n", d.message, d.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_includes_routine_header_when_present() {
        let d = Diagnostic::error(DiagnosticKind::ArgumentMismatch, 12, "_init", "Cannot call 'MALLOC' with these arguments: .");
        let out = render(&d, "    MALLOC");
        assert_eq!(
            out,
            "      | _init:\n   12 |     MALLOC\n      + Cannot call 'MALLOC' with these arguments: .\n"
        );
    }

    #[test]
    fn render_omits_routine_header_when_empty() {
        let d = Diagnostic::error(DiagnosticKind::OrphanInstruction, 3, "", "Instructions must be under a routine.");
        let out = render(&d, "    NOP");
        assert_eq!(out, "    3 |     NOP\n      + Instructions must be under a routine.\n");
    }

    #[test]
    fn warning_severity_gets_a_prefix() {
        let d = Diagnostic::warning(DiagnosticKind::EmptyRoutine, 1, "foo", "routine has no instructions");
        let out = render(&d, "foo:");
        assert!(out.contains("WARNING: routine has no instructions"));
    }

    #[test]
    fn bag_counts_only_errors() {
        let mut bag = DiagnosticBag::new();
        bag.push(Diagnostic::warning(DiagnosticKind::EmptyRoutine, 1, "", ""));
        bag.push(Diagnostic::error(DiagnosticKind::ArgumentMismatch, 2, "", ""));
        assert_eq!(bag.error_count(), 1);
        assert!(bag.has_errors());
    }
}
