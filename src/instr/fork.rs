//! `FE`/`FG`/`FGE`/`FL`/`FLE`/`FNE`: two-branch compare-and-fork.
//!
//! Each overload emits one `3620` compare trigger wired with both a true
//! and a false target, each independently indirected through its own
//! helper spawn group when the corresponding routine has more than one
//! instruction (spec §4.5, testable invariant 3).

use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::EmitResult;
use crate::record::{compare_trigger_str, spawn_trigger_str};
use crate::types::Operand;

use super::compare::CompareOp;
use super::{group_at, item_at, number_at};

/// Emits a helper spawn trigger for one branch if `spawn_target`'s group
/// has more than one instruction (`length_key` decides *whether* a
/// helper is needed; `spawn_target` decides *what the helper spawns*).
/// Returns the group the compare should aim at for this branch, the
/// extra groups consumed, and the helper's record text.
fn maybe_indirect(
    length_key: i32,
    spawn_target: i32,
    group_id: i32,
    x: f64,
    y: f64,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> (i32, i32, String) {
    let needs_spawn = args.lengths.get(&length_key).copied().unwrap_or(0) > 1;
    if !needs_spawn {
        return (length_key, 0, String::new());
    }
    let text = spawn_trigger_str(
        x, y, 1.0, 0.3, 0.0, &[group_id], true, false, true, spawn_target,
        crate::constants::ONE_FRAME_DELAY, 0.0, false,
        true, false,
        ctx.options.spawn_delay_enabled, ctx.options.spawn_ordered_enabled,
    );
    (group_id, 1, text)
}

/// `FE routine_true, routine_false, item1, item2`-shaped overloads.
fn fork_item(
    mnemonic: &'static str,
    ops: &[Operand],
    op: CompareOp,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> EmitResult<(String, i32)> {
    let true_id = group_at(ops, 0, mnemonic)?;
    let false_id = group_at(ops, 1, mnemonic)?;
    let (left_kind, left_id) = item_at(ops, 2, mnemonic)?;
    let (right_kind, right_id) = item_at(ops, 3, mnemonic)?;

    let xpos = args.xpos();
    let ypos = args.ypos();

    let (true_group, true_extra, true_spawn) =
        maybe_indirect(true_id, true_id, args.next_free, xpos, ypos + 10.0, args, ctx);
    let (false_group, false_extra, false_spawn) = maybe_indirect(
        false_id,
        false_id,
        args.next_free + true_extra,
        xpos,
        ypos - 10.0,
        args,
        ctx,
    );

    let compare = compare_trigger_str(
        xpos, ypos, 1.0, 0.3, 0.0, &[args.group],
        true, false, true,
        true_group, false_group,
        left_id, right_id,
        left_kind.as_wire_value(), right_kind.as_wire_value(),
        1.0, 1.0, 3, 3, op as i32, 0.0, 0, 0, 0, 0,
    );
    Ok((compare + &true_spawn + &false_spawn, true_extra + false_extra))
}

/// `FE routine_true, routine_false, item, number`-shaped overloads.
///
/// The reference implementation's `fork_num` copies the true-branch's
/// spawn target (`trueID`) and y-offset (`ypos + 10`) into the
/// false-branch spawn trigger as well, so a false-branch helper never
/// actually routes to `falseID` — a source bug noted in spec §9. The
/// spec's own resolution is to follow the declared contract (the false
/// branch targets `falseID`) rather than reproduce the anomaly, so
/// every fork mnemonic, including `FNE`, is wired to that corrected
/// behavior here.
fn fork_num(
    mnemonic: &'static str,
    ops: &[Operand],
    op: CompareOp,
    args: &EmitArgs,
    ctx: &CompileContext,
) -> EmitResult<(String, i32)> {
    let true_id = group_at(ops, 0, mnemonic)?;
    let false_id = group_at(ops, 1, mnemonic)?;
    let (left_kind, left_id) = item_at(ops, 2, mnemonic)?;
    let number = number_at(ops, 3, mnemonic)?;

    let xpos = args.xpos();
    let ypos = args.ypos();

    let (true_group, true_extra, true_spawn) =
        maybe_indirect(true_id, true_id, args.next_free, xpos, ypos + 10.0, args, ctx);
    let (false_group, false_extra, false_spawn) = maybe_indirect(
        false_id,
        false_id,
        args.next_free + true_extra,
        xpos,
        ypos - 10.0,
        args,
        ctx,
    );

    let compare = compare_trigger_str(
        xpos, ypos, 1.0, 0.3, 0.0, &[args.group],
        true, false, true,
        true_group, false_group,
        left_id, 0,
        left_kind.as_wire_value(), 1,
        1.0, number, 3, 3, op as i32, 0.0, 0, 0, 0, 0,
    );
    Ok((compare + &true_spawn + &false_spawn, true_extra + false_extra))
}

macro_rules! item_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            let (text, extra_groups) = fork_item($mnemonic, ops, $op, args, ctx)?;
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
            let (text, extra_groups) = fork_num($mnemonic, ops, $op, args, ctx)?;
            Ok(EmitOutput { text, extra_objects: 0, extra_groups })
        }
    };
}

num_emitter!(fork_equals_num, "FE", CompareOp::Equal);
item_emitter!(fork_equals_item, "FE", CompareOp::Equal);

num_emitter!(fork_greater_num, "FG", CompareOp::Greater);
item_emitter!(fork_greater_item, "FG", CompareOp::Greater);

num_emitter!(fork_gequals_num, "FGE", CompareOp::GreaterEqual);
item_emitter!(fork_gequals_item, "FGE", CompareOp::GreaterEqual);

num_emitter!(fork_less_num, "FL", CompareOp::Less);
item_emitter!(fork_less_item, "FL", CompareOp::Less);

num_emitter!(fork_lequals_num, "FLE", CompareOp::LessEqual);
item_emitter!(fork_lequals_item, "FLE", CompareOp::LessEqual);

num_emitter!(fork_nequals_num, "FNE", CompareOp::NotEqual);
item_emitter!(fork_nequals_item, "FNE", CompareOp::NotEqual);

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
    fn both_branches_single_instruction_need_no_indirection() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 1usize);
        lengths.insert(2, 1usize);
        let args = args_with_lengths(&lengths, 10);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Int(2),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = fork_num("FE", &ops, CompareOp::Equal, &args, &ctx).unwrap();
        assert_eq!(extra, 0);
        assert!(text.contains(",51,1,"));
        assert!(text.contains(",71,2,"));
        assert!(!text.contains("1268"));
    }

    #[test]
    fn fe_false_branch_helper_targets_false_id_not_true_id() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 1usize);
        lengths.insert(2, 3usize);
        let args = args_with_lengths(&lengths, 10);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Int(2),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = fork_num("FE", &ops, CompareOp::Equal, &args, &ctx).unwrap();
        assert_eq!(extra, 1);
        assert!(text.contains(",71,10,"));
        let spawn_part = &text[text.find("1268").unwrap()..];
        assert!(spawn_part.contains(",51,2,"));
    }

    // The reference implementation's `fork_num` copies the true branch's
    // spawn target and y-offset into FNE's false-branch helper, so its
    // helper never actually reaches falseID. This crate follows the
    // declared contract instead: every fork mnemonic's false-branch
    // helper targets falseID, including FNE.
    #[test]
    fn fne_false_branch_helper_targets_false_id_not_true_id() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 1usize);
        lengths.insert(2, 3usize);
        let args = args_with_lengths(&lengths, 10);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Int(2),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = fork_num("FNE", &ops, CompareOp::NotEqual, &args, &ctx).unwrap();
        assert_eq!(extra, 1);
        assert!(text.contains(",71,10,"));
        let spawn_part = &text[text.find("1268").unwrap()..];
        assert!(spawn_part.contains(",51,2,"));
        assert!(!spawn_part.contains(",51,1,"));
    }

    #[test]
    fn true_branch_helper_consumes_group_before_false_branch() {
        let mut lengths = HashMap::new();
        lengths.insert(1, 3usize);
        lengths.insert(2, 3usize);
        let args = args_with_lengths(&lengths, 10);
        let ctx = CompileContext::default();
        let ops = vec![
            Operand::Int(1),
            Operand::Int(2),
            Operand::Item { kind: crate::types::ItemKind::Counter, id: 1 },
            Operand::Number(5.0),
        ];
        let (text, extra) = fork_num("FE", &ops, CompareOp::Equal, &args, &ctx).unwrap();
        assert_eq!(extra, 2);
        assert!(text.contains(",51,10,"));
        assert!(text.contains(",71,11,"));
    }
}
