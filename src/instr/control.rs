//! `SPAWN`, `PERS`, `DISPLAY` (both overloads), `IOBLOCK`, `NOP` — the
//! instructions that don't belong to an arithmetic/compare/memory
//! family.

use crate::context::CompileContext;
use crate::diagnostics::DiagnosticKind;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::EmitResult;
use crate::record::{counter_object_str, persistent_trigger_str, plain_block_str, spawn_trigger_str, text_object_str};
use crate::types::{ItemKind, Operand};

use super::{group_at, int_at, item_at, str_at};

/// `SPAWN routine` — an unconditional one-frame-delayed spawn trigger.
pub fn spawn(ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let target = group_at(ops, 0, "SPAWN")?;
    let text = spawn_trigger_str(
        args.xpos(), args.ypos(), 1.0, 1.0, 0.0, &[args.group], true, false, true,
        target, crate::constants::ONE_FRAME_DELAY, 0.0, false, true, false,
        ctx.options.spawn_delay_enabled, ctx.options.spawn_ordered_enabled,
    );
    Ok(EmitOutput::simple(text))
}

/// `PERS item` — marks an item persistent across level resets.
pub fn pers(ops: &[Operand], args: &EmitArgs, _ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let (kind, id) = item_at(ops, 0, "PERS")?;
    let text = persistent_trigger_str(
        -45.0, args.ypos(), 1.0, 1.0, 0.0, &[],
        false, false, false,
        id, matches!(kind, ItemKind::Timer), true, false, false,
    );
    Ok(EmitOutput::simple(text))
}

/// `DISPLAY item` — places a counter readout beside the routine at the
/// instruction's own index (not the group's layout cursor).
pub fn display(ops: &[Operand], args: &EmitArgs, _ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let (kind, id) = item_at(ops, 0, "DISPLAY")?;
    let ypos = args.index as f64 * 30.0 + 45.0;
    let text = counter_object_str(-105.0, ypos, 0.5, 0.5, 0.0, &[], id, matches!(kind, ItemKind::Timer), 0, false, 0);
    Ok(EmitOutput::simple(text))
}

/// `DISPLAY item, pos` — places a counter readout at an explicit row.
pub fn display_pos(ops: &[Operand], _args: &EmitArgs, _ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let (kind, id) = item_at(ops, 0, "DISPLAY")?;
    let pos = int_at(ops, 1, "DISPLAY")?;
    let ypos = pos as f64 * 30.0 + 75.0;
    let text = counter_object_str(-105.0, ypos, 0.5, 0.5, 0.0, &[], id, matches!(kind, ItemKind::Timer), 0, false, 0);
    Ok(EmitOutput::simple(text))
}

/// `IOBLOCK routine, position, text` — emits no object of its own
/// group (the host assembler treats `_init`'s IOBLOCK line as pure
/// epilogue setup), so it reports `extra_objects: -1` to cancel out the
/// layout cursor's default advance. A second `IOBLOCK` at a position
/// already claimed is silently dropped, matching the reference
/// implementation (the duplicate itself is diagnosed during semantic
/// validation, not here).
pub fn ioblock(ops: &[Operand], _args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let target = group_at(ops, 0, "IOBLOCK")?;
    let position = int_at(ops, 1, "IOBLOCK")?;
    let text = str_at(ops, 2, "IOBLOCK")?;

    if !ctx.io_blocks.insert(position) {
        ctx.pending_warnings.push(DiagnosticKind::DuplicateIOBlock { position });
        return Ok(EmitOutput::no_object(String::new()));
    }

    let xpos = 75.0 + position as f64 * 30.0;
    let ypos = 75.0;
    let mut out = text_object_str(xpos, ypos, 0.25, 0.25, 0.0, &[], text, 0);
    out.push_str(&plain_block_str(xpos, ypos, 1.0, 1.0, &[]));
    out.push_str(&spawn_trigger_str(
        xpos, ypos, 1.0, 1.0, 0.0, &[], false, true, true, target,
        0.0, 0.0, false, true, false,
        ctx.options.spawn_delay_enabled, ctx.options.spawn_ordered_enabled,
    ));
    Ok(EmitOutput::no_object(out))
}

/// `NOP` — an instruction that occupies a slot in a routine but emits
/// nothing; useful for padding a routine past the single-instruction
/// threshold so compare/fork helper-spawn indirection kicks in.
pub fn nop(_ops: &[Operand], _args: &EmitArgs, _ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    Ok(EmitOutput::no_object(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args<'a>(lengths: &'a HashMap<i32, usize>) -> EmitArgs<'a> {
        EmitArgs { group: 3, index: 0, squish: true, next_free: 10, lengths, subroutine_count: 2 }
    }

    #[test]
    fn ioblock_skips_duplicate_position() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        let ops = vec![Operand::Int(1), Operand::Int(0), Operand::Str("hi".into())];
        let first = ioblock(&ops, &a, &mut ctx).unwrap();
        assert!(!first.text.is_empty());
        let second = ioblock(&ops, &a, &mut ctx).unwrap();
        assert!(second.text.is_empty());
    }

    #[test]
    fn display_uses_index_not_group() {
        let lengths = HashMap::new();
        let a = EmitArgs { group: 3, index: 5, squish: true, next_free: 10, lengths: &lengths, subroutine_count: 2 };
        let mut ctx = CompileContext::default();
        let ops = vec![Operand::Item { kind: ItemKind::Counter, id: 7 }];
        let out = display(&ops, &a, &mut ctx).unwrap();
        assert!(out.text.contains(",3,195,"));
    }
}
