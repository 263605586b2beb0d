//! Output assembler (spec §4.7): walks the built namespace in
//! declaration order, resolves every operand still pointing at a
//! routine name/`MEMSIZE`/bare item id, invokes each instruction's
//! emitter, and appends the epilogue. Grounded in the reference
//! implementation's `parse_namespace`.

use std::collections::HashMap;

use crate::context::{CompileContext, CompileOptions};
use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind};
use crate::emit::EmitArgs;
use crate::error::{EmitError, EmitResult};
use crate::namespace::BuiltNamespace;
use crate::record::{plain_block_str, spawn_trigger_str, text_object_str, time_warp_trigger_str};
use crate::types::Operand;
use crate::validate::ValidatedInstruction;

/// Final compiled output plus the bookkeeping the CLI reports back to
/// the user (spec §4.7: "report final object count and the next free
/// group").
#[derive(Clone, Debug, Default)]
pub struct AssembledOutput {
    pub object_stream: String,
    pub object_count: usize,
    pub next_free_group: i32,
}

/// Resolves a single operand against the namespace/options, immediately
/// before the emitter that needs it runs — the one place `RoutineRef`,
/// `MemSize`, and un-offset `Item` ids turn into the plain
/// `Int`/`Number`/`Item` values every emitter already expects.
fn resolve_operand(
    op: &Operand,
    built: &BuiltNamespace,
    ctx: &CompileContext,
    routine: &str,
    line: u32,
    bag: &mut DiagnosticBag,
) -> EmitResult<Operand> {
    match op {
        Operand::RoutineRef(name) => match built.group_id_of(name) {
            Some(group_id) => Ok(Operand::Int(group_id + ctx.options.group_offset)),
            None => {
                bag.push(Diagnostic::error(
                    DiagnosticKind::UnknownRoutineRef { name: name.clone() },
                    line,
                    routine,
                    format!("Routine '{}' was dropped as empty or never declared.", name),
                ));
                Err(EmitError::UnknownGroup { routine: name.clone() })
            }
        },
        Operand::MemSize => Ok(Operand::Number(ctx.memory.memory_size as f64)),
        Operand::Item { kind, id } => Ok(Operand::Item { kind: *kind, id: id.wrapping_add(ctx.options.counter_offset as u32) }),
        other => Ok(other.clone()),
    }
}

fn resolve_operands(
    instr: &ValidatedInstruction,
    built: &BuiltNamespace,
    ctx: &CompileContext,
    routine: &str,
    bag: &mut DiagnosticBag,
) -> EmitResult<Vec<Operand>> {
    instr
        .operands
        .iter()
        .map(|op| resolve_operand(op, built, ctx, routine, instr.line, bag))
        .collect()
}

/// `lengths`, keyed by the *offset-adjusted* group id — the form every
/// compare/fork emitter's target lookup arrives in once step 1 of this
/// assembler has run. The reference implementation keys this map by
/// raw (pre-offset) group id while looking it up with an offset-adjusted
/// id, silently breaking compare/fork helper-spawn detection whenever
/// `--group-offset` is nonzero; this crate keys it consistently instead
/// (see DESIGN.md).
fn offset_lengths(built: &BuiltNamespace, group_offset: i32) -> HashMap<i32, usize> {
    built.lengths.iter().map(|(&group, &count)| (group + group_offset, count)).collect()
}

pub fn assemble(
    built: &BuiltNamespace,
    options: &CompileOptions,
    ctx: &mut CompileContext,
    bag: &mut DiagnosticBag,
) -> AssembledOutput {
    let lengths = offset_lengths(built, options.group_offset);
    let routine_count = built.routines.len() as i32;
    let mut next_free = built.next_free_group + options.group_offset;
    let mut objects: Vec<String> = Vec::new();

    for routine in &built.routines {
        let group = routine.group_id + options.group_offset;

        if options.routine_text_enabled {
            objects.push(text_object_str(
                0.0,
                group as f64 * 30.0 + 75.0,
                0.5,
                0.5,
                0.0,
                &[],
                &format!("{}: {}", group, routine.name),
                0,
            ));
        }

        let mut index = 0i32;
        for instr in &routine.instructions {
            let operands = match resolve_operands(instr, built, ctx, &routine.name, bag) {
                Ok(ops) => ops,
                Err(_) => continue,
            };
            let args = EmitArgs {
                group,
                index,
                squish: options.squish,
                next_free,
                lengths: &lengths,
                subroutine_count: routine_count,
            };
            let result = (instr.emitter)(&operands, &args, ctx);
            for warning in ctx.pending_warnings.drain(..) {
                let message = match &warning {
                    DiagnosticKind::MultipleMalloc => {
                        "MALLOC called more than once; only the first allocation takes effect.".to_string()
                    }
                    DiagnosticKind::DuplicateIOBlock { position } => {
                        format!("IOBLOCK position {} was already claimed; this declaration was dropped.", position)
                    }
                    _ => String::new(),
                };
                bag.push(Diagnostic::warning(warning, instr.line, routine.name.clone(), message));
            }
            match result {
                Ok(out) => {
                    if !out.text.is_empty() {
                        objects.push(out.text);
                    }
                    index += 1 + out.extra_objects;
                    next_free += out.extra_groups;
                }
                Err(err) => {
                    let kind = match &err {
                        EmitError::MemoryBeforeMalloc { mnemonic } => {
                            DiagnosticKind::MemoryBeforeMalloc { mnemonic: *mnemonic }
                        }
                        EmitError::OperandShapeMismatch { .. } | EmitError::UnknownGroup { .. } => {
                            DiagnosticKind::ArgumentMismatch
                        }
                    };
                    bag.push(Diagnostic::error(kind, instr.line, routine.name.clone(), err.to_string()));
                }
            }
        }
    }

    if bag.has_errors() {
        return AssembledOutput { object_stream: String::new(), object_count: 0, next_free_group: next_free };
    }

    if let Some(start_group) = built.group_id_of("_start") {
        let target = start_group + options.group_offset;
        let xpos = 75.0;
        let ypos = 75.0;
        let mut start_block = text_object_str(xpos, ypos, 0.25, 0.25, 0.0, &[], "start", 0);
        start_block.push_str(&plain_block_str(xpos, ypos, 1.0, 1.0, &[]));
        start_block.push_str(&spawn_trigger_str(
            xpos, ypos, 1.0, 1.0, 0.0, &[], false, true, true, target,
            0.0, 0.0, false, true, false,
            options.spawn_delay_enabled, options.spawn_ordered_enabled,
        ));
        objects.push(start_block);
    }

    objects.push(text_object_str(195.0, 45.0, 0.25, 0.25, 0.0, &[], "go to the editor for details", 0));

    if options.group_offset > 100 {
        objects.push(format!("1,1,2,105,3,{},155,2,57,99;", 30 * options.group_offset));
    }

    if options.squish && options.timewarp_trigger {
        objects.push(time_warp_trigger_str());
    }

    let object_stream = format!(";{}", objects.concat());
    let object_count = object_stream.matches(';').count().saturating_sub(1);

    AssembledOutput { object_stream, object_count, next_free_group: next_free }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::namespace::build;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    fn run(src: &str, options: CompileOptions) -> (AssembledOutput, DiagnosticBag) {
        let mut bag = DiagnosticBag::new();
        let lexed = lex(src, options.memreg_id, options.ptrpos_id, &mut bag);
        let program = validate(&lexed, &options, &mut bag);
        let built = build(&program, &mut bag);
        let mut ctx = CompileContext::new(options.clone());
        let out = assemble(&built, &options, &mut ctx, &mut bag);
        (out, bag)
    }

    #[test]
    fn appends_start_ioblock_and_info_text_when_start_declared() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (out, bag) = run("_start:\n    NOP\n", options);
        assert!(!bag.has_errors());
        assert!(out.object_stream.starts_with(';'));
        assert!(out.object_stream.contains("go to the editor for details"));
    }

    #[test]
    fn no_start_routine_emits_no_start_ioblock() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (out, bag) = run("_init:\n    MALLOC 4\n", options);
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::MissingStart)));
        // base64 of "start" — the implicit entrypoint's text label — must
        // be absent since no `_start` routine was declared.
        assert!(!out.object_stream.contains("c3RhcnQ="));
    }

    #[test]
    fn routine_names_resolve_to_offset_adjusted_group_ids() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        options.group_offset = 50;
        let (out, bag) = run("_init:\n    SPAWN _start\n_start:\n    NOP\n", options);
        assert!(!bag.has_errors());
        // `_start` is declared second (group 1); with offset 50 the spawn
        // target should read 51.
        assert!(out.object_stream.contains(",51,51,"));
    }

    #[test]
    fn group_offset_above_100_appends_a_barrier_block() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        options.group_offset = 150;
        let (out, _bag) = run("_start:\n    NOP\n", options);
        assert!(out.object_stream.contains(",155,2,57,99;"));
    }

    #[test]
    fn second_malloc_warns_and_is_a_no_op() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (_out, bag) = run("_init:\n    MALLOC 4\n    MALLOC 8\n_start:\n    NOP\n", options);
        assert!(!bag.has_errors());
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::MultipleMalloc)));
    }

    #[test]
    fn duplicate_ioblock_position_warns() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (_out, bag) = run(
            "_start:\n    NOP\n_init:\n    IOBLOCK _start, 0, go\n    IOBLOCK _start, 0, x\n",
            options,
        );
        assert!(!bag.has_errors());
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::DuplicateIOBlock { position: 0 })));
    }

    #[test]
    fn memsize_resolves_to_the_malloc_argument() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (out, bag) = run(
            "_init:\n    MALLOC 10\n_start:\n    MOV C1, MEMSIZE\n",
            options,
        );
        assert!(!bag.has_errors());
        assert!(!out.object_stream.is_empty());
    }

    #[test]
    fn memory_op_before_malloc_is_reported_as_memory_before_malloc_not_argument_mismatch() {
        let mut options = CompileOptions::default();
        options.routine_text_enabled = false;
        let (_out, bag) = run("_start:\n    MREAD\n", options);
        assert!(bag.has_errors());
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::MemoryBeforeMalloc { mnemonic: "MREAD" })));
    }
}
