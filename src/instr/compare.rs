//! `SE`/`SG`/`SGE`/`SL`/`SLE`/`SNE`: single-branch compare-and-spawn.
//!
//! Every overload emits one `3620` compare trigger. If the target routine
//! has more than one instruction, the host engine would otherwise fire
//! every object of that group on the same frame the compare activates it
//! (spec §4.5), so the compare is redirected at a freshly allocated
//! helper group holding a single one-frame-delayed spawn trigger instead
//! of the routine's group directly.

use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::EmitResult;
use crate::record::{compare_trigger_str, spawn_trigger_str};
use crate::types::Operand;

use super::{group_at, item_at, number_at};

/// Compare-operator wire code: `=,>,>=,<,<=,!=` as `0..6`.
#[derive(Clone, Copy, Debug)]
pub enum CompareOp {
    Equal = 0,
    Greater = 1,
    GreaterEqual = 2,
    Less = 3,
    LessEqual = 4,
    NotEqual = 5,
}

/// Builds the helper spawn trigger indirecting to `target` when `target`'s
/// group has more than one instruction, returning the group the compare
/// should aim at plus the extra groups consumed (0 or 1) and the helper's
/// record text (empty if no indirection was needed).
fn maybe_indirect(
    target: i32,
    x: f64,
    y: f64,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> (i32, i32, String) {
    let needs_spawn = args.lengths.get(&target).copied().unwrap_or(0) > 1;
    if !needs_spawn {
        return (target, 0, String::new());
    }
    let helper = args.next_free;
    let text = spawn_trigger_str(
        x, y, 1.0, 0.5, 0.0, &[helper], true, false, true, target,
        crate::constants::ONE_FRAME_DELAY, 0.0, false,
        true, false,
        ctx.options.spawn_delay_enabled, ctx.options.spawn_ordered_enabled,
    );
    (helper, 1, text)
}

/// `SE routine, item1, item2`-shaped overloads compare two items.
fn spawn_item(
    mnemonic: &'static str,
    ops: &[Operand],
    op: CompareOp,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> EmitResult<(String, i32)> {
    let target = group_at(ops, 0, mnemonic)?;
    let (left_kind, left_id) = item_at(ops, 1, mnemonic)?;
    let (right_kind, right_id) = item_at(ops, 2, mnemonic)?;

    let xpos = args.xpos();
    let ypos = args.ypos();
    let (compare_group, extra_groups, helper) = maybe_indirect(target, xpos, ypos - 7.5, args, ctx);

    let compare = compare_trigger_str(
        xpos, ypos + 7.5, 1.0, 0.5, 0.0, &[args.group],
        true, false, true,
        compare_group, 0,
        left_id, right_id,
        left_kind.as_wire_value(), right_kind.as_wire_value(),
        1.0, 1.0, 3, 3, op as i32, 0.0, 0, 0, 0, 0,
    );
    Ok((compare + &helper, extra_groups))
}

/// `SE routine, item, number`-shaped overloads compare an item against a
/// literal.
fn spawn_num(
    mnemonic: &'static str,
    ops: &[Operand],
    op: CompareOp,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> EmitResult<(String, i32)> {
    let target = group_at(ops, 0, mnemonic)?;
    let (left_kind, left_id) = item_at(ops, 1, mnemonic)?;
    let number = number_at(ops, 2, mnemonic)?;

    let xpos = args.xpos();
    let ypos = args.ypos();
    let (compare_group, extra_groups, helper) = maybe_indirect(target, xpos, ypos - 7.5, args, ctx);

    let compare = compare_trigger_str(
        xpos, ypos + 7.5, 1.0, 0.5, 0.0, &[args.group],
        true, false, true,
        compare_group, 0,
        left_id, 0,
        left_kind.as_wire_value(), 1,
        1.0, number, 3, 3, op as i32, 0.0, 0, 0, 0, 0,
    );
    Ok((compare + &helper, extra_groups))
}

macro_rules! item_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            let (text, extra_groups) = spawn_item($mnemonic, ops, $op, args, ctx)?;
            Ok(EmitOutput { text, extra_objects: 0, extra_groups })
        }
    };
}

macro_rules! num_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            let (text, extra_groups) = spawn_num($mnemonic, ops, $op, args, ctx)?;
            Ok(EmitOutput { text, extra_objects: 0, extra_groups })
        }
    };
}

num_emitter!(spawn_equals_num, "SE", CompareOp::Equal);
item_emitter!(spawn_equals_item, "SE", CompareOp::Equal);

num_emitter!(spawn_greater_num, "SG", CompareOp::Greater);
item_emitter!(spawn_greater_item, "SG", CompareOp::Greater);

num_emitter!(spawn_gequals_num, "SGE", CompareOp::GreaterEqual);
item_emitter!(spawn_gequals_item, "SGE", CompareOp::GreaterEqual);

num_emitter!(spawn_less_num, "SL", CompareOp::Less);
item_emitter!(spawn_less_item, "SL", CompareOp::Less);

num_emitter!(spawn_lequals_num, "SLE", CompareOp::LessEqual);
item_emitter!(spawn_lequals_item, "SLE", CompareOp::LessEqual);

num_emitter!(spawn_nequals_num, "SNE", CompareOp::NotEqual);
item_emitter!(spawn_nequals_item, "SNE", CompareOp::NotEqual);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args_with_lengths<'a>(lengths: &'a HashMap<i32, usize>, next_free: i32) -> EmitArgs<'a> {
        EmitArgs {
            group: 0,
            index: 0,
            squish: true,
            next_free,
            lengths,
            subroutine_count: 2,
        }
    }

    #[test]
    fn single_instruction_target_needs_no_indirection() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 1usize);
        let args = args_with_lengths(&lengths, 5);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = spawn_num("SE", &ops, CompareOp::Equal, &args, &ctx).unwrap();
        assert_eq!(extra, 0);
        assert!(text.contains(",51,1,"));
        assert!(!text.contains("1268"));
    }

    #[test]
    fn multi_instruction_target_gets_helper_spawn() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 3usize);
        let args = args_with_lengths(&lengths, 5);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = spawn_num("SE", &ops, CompareOp::Equal, &args, &ctx).unwrap();
        assert_eq!(extra, 1);
        assert!(text.contains("1268"));
        assert!(text.contains(",51,5,"));
    }
}
