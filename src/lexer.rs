//! Front-end: splits TASM source into routines and raw instruction
//! lines. Grounded in the reference implementation's `parse_tasm` (two
//! passes: collect routine names first so forward references
//! type-check, then build the instruction list).
//!
//! This stage does not resolve operand kinds or overloads — it only
//! recognizes routine headers, enforces the four-space indent
//! discipline, and performs the textual `MEMREG`/`PTRPOS` alias
//! substitution. Overload resolution happens in [`crate::validate`].

use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind};

/// One unparsed instruction line: mnemonic plus its still-unsplit,
/// alias-substituted argument field.
#[derive(Clone, Debug)]
pub struct RawInstruction {
    pub line: u32,
    pub mnemonic: String,
    pub args: String,
}

/// A routine as the lexer sees it — possibly empty, since emptiness is
/// a namespace-builder concern (spec §4.3), not a lexer one.
#[derive(Clone, Debug)]
pub struct RawRoutine {
    pub name: String,
    pub header_line: u32,
    pub instructions: Vec<RawInstruction>,
}

#[derive(Clone, Debug, Default)]
pub struct LexResult {
    pub routines: Vec<RawRoutine>,
}

impl LexResult {
    pub fn routine_names(&self) -> Vec<&str> {
        self.routines.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Strips the first `;` (and any trailing whitespace before/after it)
/// from a single source line.
fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => line[..idx].trim_end(),
        None => line.trim_end(),
    }
}

fn substitute_aliases(args: &str, memreg_id: u32, ptrpos_id: u32) -> String {
    args.replace("MEMREG", &format!("C{}", memreg_id))
        .replace("PTRPOS", &format!("C{}", ptrpos_id))
}

/// Runs both lexer passes over `source`, recording `IndentError`,
/// `OrphanInstruction`, and `DuplicateRoutine` diagnostics into `bag`.
pub fn lex(source: &str, memreg_id: u32, ptrpos_id: u32, bag: &mut DiagnosticBag) -> LexResult {
    let lines: Vec<&str> = source.lines().map(strip_comment).collect();

    // The reference implementation runs a separate first pass here purely
    // to collect routine names ahead of building instructions, so that a
    // forward reference (SPAWN/SE/FE/... targeting a routine declared
    // later in the file) type-checks during validation. This pass folds
    // that into the single loop below: `result.routines` already holds
    // every header seen so far, and `LexResult::routine_names` exposes
    // the full set to `validate::validate` regardless of declaration
    // order, since Rust borrows the whole `Vec` rather than needing it
    // collected up front.
    let mut result = LexResult::default();
    let mut current: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_suffix(':') {
            if let Some(existing) = result.routines.iter().find(|r| r.name == name) {
                bag.push(Diagnostic::error(
                    DiagnosticKind::DuplicateRoutine { first_line: existing.header_line },
                    line_no,
                    "",
                    format!("Routine {} was already defined at line {}.", name, existing.header_line),
                ));
            }
            result.routines.push(RawRoutine {
                name: name.to_string(),
                header_line: line_no,
                instructions: Vec::new(),
            });
            current = result.routines.len().checked_sub(1);
            continue;
        }

        if !line.starts_with("    ") {
            bag.push(Diagnostic::error(
                DiagnosticKind::IndentError,
                line_no,
                "",
                "Instructions must be indented by four spaces.",
            ));
            continue;
        }

        let Some(routine_idx) = current else {
            bag.push(Diagnostic::error(
                DiagnosticKind::OrphanInstruction,
                line_no,
                "",
                "Instructions must be under a routine.",
            ));
            continue;
        };

        let body = &line[4..];
        let mut parts = body.splitn(2, ' ');
        let mnemonic = parts.next().unwrap_or("").to_string();
        let raw_args = parts.next().unwrap_or("");
        let args = substitute_aliases(raw_args, memreg_id, ptrpos_id);

        result.routines[routine_idx].instructions.push(RawInstruction {
            line: line_no,
            mnemonic,
            args,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_comments_and_trailing_whitespace() {
        let src = "_init:   \n    NOP ; a comment\n";
        let mut bag = DiagnosticBag::new();
        let out = lex(src, 9998, 9999, &mut bag);
        assert!(!bag.has_errors());
        assert_eq!(out.routines[0].instructions[0].mnemonic, "NOP");
    }

    #[test]
    fn rejects_instruction_without_four_space_indent() {
        let src = "_init:\n  NOP\n";
        let mut bag = DiagnosticBag::new();
        lex(src, 9998, 9999, &mut bag);
        assert_eq!(bag.error_count(), 1);
    }

    #[test]
    fn rejects_instruction_before_any_routine() {
        let src = "    NOP\n_init:\n";
        let mut bag = DiagnosticBag::new();
        lex(src, 9998, 9999, &mut bag);
        assert_eq!(bag.error_count(), 1);
    }

    #[test]
    fn flags_duplicate_routine_with_first_line_reference() {
        let src = "foo:\n    NOP\nfoo:\n    NOP\n";
        let mut bag = DiagnosticBag::new();
        lex(src, 9998, 9999, &mut bag);
        assert_eq!(bag.error_count(), 1);
        let diag = bag.iter().next().unwrap();
        assert!(matches!(diag.kind, DiagnosticKind::DuplicateRoutine { first_line: 1 }));
    }

    #[test]
    fn substitutes_memreg_and_ptrpos_aliases() {
        let src = "_init:\n    MOV MEMREG, 5\n_start:\n    MOV PTRPOS, 0\n";
        let mut bag = DiagnosticBag::new();
        let out = lex(src, 9998, 9999, &mut bag);
        assert_eq!(out.routines[0].instructions[0].args, "C9998, 5");
        assert_eq!(out.routines[1].instructions[0].args, "C9999, 0");
    }
}
