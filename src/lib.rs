//! Compiler for TASM, a line-oriented assembly language that targets the
//! object-record "save file" format of a 2D level editor rather than a
//! machine's instruction encoding.
//!
//! A TASM program is a sequence of named routines, each a list of
//! indented instruction lines. `_init` is special: its instructions run
//! once, at compile time, to seed memory and declare entrypoints — it
//! never itself becomes a runnable group. `_start`, if declared, becomes
//! the level's implicit entrypoint.
//!
//! ## Instruction families
//!
//! Mnemonic(s) | Purpose
//! ------------|--------
//! `MOV`/`ADD`/`SUB`/`MUL`/`DIV`/`FLDIV` | Arithmetic on counters/timers, against another item or a literal.
//! `SE`/`SG`/`SGE`/`SL`/`SLE`/`SNE` | Compare two values; spawn a routine on match.
//! `FE`/`FG`/`FGE`/`FL`/`FLE`/`FNE` | Compare two values; spawn one of two routines depending on the result.
//! `SPAWN` | Unconditionally spawn a routine.
//! `PERS` | Mark an item persistent across level attempts (`_init`-only).
//! `DISPLAY` | Place a counter readout (`_init`-only).
//! `IOBLOCK` | Declare an external entrypoint block (`_init`-only).
//! `MALLOC`/`INITMEM`/`MPTR`/`MRESET`/`MREAD`/`MWRITE`/`MFUNC` | The memory machine: a collision-block tape addressed by a movable pointer.
//! `NOP` | Occupies an instruction slot without emitting an object — padding to cross the helper-spawn-indirection threshold (§4.5).
//!
//! `MEMREG`/`PTRPOS` are textual aliases for the memory machine's scratch
//! counter and pointer-index counter; `MEMSIZE` resolves to the single
//! legal `MALLOC`'s argument.
//!
//! The pipeline: [`lexer::lex`] splits source into routines and raw
//! instruction lines; [`validate::validate`] resolves each instruction
//! to one of its mnemonic's overloads; [`namespace::build`] assigns
//! group ids and drops empty routines; [`assembler::assemble`] resolves
//! the remaining symbolic operands and invokes each instruction's
//! emitter to produce the final object-stream.

pub mod assembler;
pub mod constants;
pub mod context;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod instr;
pub mod lexer;
pub mod memory;
pub mod namespace;
pub mod record;
pub mod table;
pub mod types;
pub mod validate;

use context::{CompileContext, CompileOptions};
use diagnostics::DiagnosticBag;
use namespace::BuiltNamespace;

/// Everything a driver (the `tasm-asm` CLI, or any other embedder) needs
/// after a compilation: the diagnostics collected across every phase,
/// the namespace (for `--show-namespace`/`--interpret`), and the
/// assembled object-stream if the run was clean enough to produce one.
#[derive(Debug, Default)]
pub struct CompileRun {
    pub diagnostics: DiagnosticBag,
    pub namespace: BuiltNamespace,
    pub output: assembler::AssembledOutput,
}

impl CompileRun {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Runs the full pipeline: lex, validate, build the namespace, assemble.
/// Each phase keeps contributing to the same [`DiagnosticBag`]; a phase
/// with errors still lets later phases run far enough to surface
/// further diagnostics (spec §7), but [`assembler::assemble`] itself
/// refuses to produce a non-empty object-stream once any error exists.
pub fn compile(source: &str, options: CompileOptions) -> CompileRun {
    let mut bag = DiagnosticBag::new();

    let lexed = lexer::lex(source, options.memreg_id, options.ptrpos_id, &mut bag);
    let program = validate::validate(&lexed, &options, &mut bag);
    let built = namespace::build(&program, &mut bag);
    let mut ctx = CompileContext::new(options.clone());
    let output = assembler::assemble(&built, &options, &mut ctx, &mut bag);

    CompileRun { diagnostics: bag, namespace: built, output }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn a_minimal_program_compiles_clean() {
        let run = compile("_start:\n    NOP\n", CompileOptions::default());
        assert!(!run.has_errors());
        assert!(!run.output.object_stream.is_empty());
    }

    #[test]
    fn an_unknown_instruction_surfaces_as_a_diagnostic_and_blocks_output() {
        let run = compile("_start:\n    BOGUS\n", CompileOptions::default());
        assert!(run.has_errors());
        assert_eq!(run.output.object_stream, "");
    }

    #[test]
    fn namespace_is_available_even_when_show_namespace_was_not_requested() {
        let run = compile("_init:\n    MALLOC 4\n_start:\n    NOP\n", CompileOptions::default());
        assert!(!run.has_errors());
        assert_eq!(run.namespace.routines.len(), 2);
    }
}
