//! `MOV`/`ADD`/`SUB`/`MUL`/`DIV`/`FLDIV`: the item-edit arithmetic family.
//! Every overload bottoms out in exactly one `item_edit_trigger_str` call,
//! except bit-packed `MOV` immediates, which emit three.

use crate::constants::{BIT_PACK_DIVISOR, FLOAT_PRECISION_BOUNDARY};
use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::EmitResult;
use crate::record::item_edit_trigger_str;
use crate::types::Operand;

use super::{item_at, number_at};

/// Assignment operator wire encoding: `=,+,-,*,/,÷(floor)` as `0..5`,
/// clamped to `0..4` on the wire with a separate sign-mode bit for floor
/// division (spec §4.5).
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[repr(i32)]
pub enum ArithOp {
    Assign = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    FloorDiv = 5,
}

impl ArithOp {
    fn wire_assign_op(self) -> i32 {
        (self as i32).min(4)
    }

    fn wire_sign_mode(self) -> i32 {
        if matches!(self, ArithOp::FloorDiv) {
            2
        } else {
            0
        }
    }
}

/// `MOV item, number` — bit-packs constants above the float-precision
/// boundary into three records when enabled (spec §4.5).
pub fn mov_num(
    ops: &[Operand],
    args: &EmitArgs,
    ctx: &mut CompileContext,
) -> EmitResult<EmitOutput> {
    let (kind, id) = item_at(ops, 0, "MOV")?;
    let number = number_at(ops, 1, "MOV")?;

    let xpos = args.xpos();
    let ypos = args.ypos();
    let dx = if args.squish { 1.0 } else { 30.0 };
    let number_i = number.trunc() as i64;

    if (number_i.abs() as f64) > FLOAT_PRECISION_BOUNDARY && ctx.options.bit_packing_enabled {
        let big = number_i / BIT_PACK_DIVISOR;
        let small = number_i % BIT_PACK_DIVISOR;

        let mut text = item_edit_trigger_str(
            xpos, ypos, 1.0, 1.0, 0.0, &[args.group], true, false, true, 0, 0, 0, 0, id,
            kind.as_wire_value(), big as f64, 0, 3, 1, 0, 0, 0, 0,
        );
        text.push_str(&item_edit_trigger_str(
            xpos + dx, ypos, 1.0, 1.0, 0.0, &[args.group], true, false, true, 0, 0, 0, 0, id,
            kind.as_wire_value(), BIT_PACK_DIVISOR as f64, 3, 3, 1, 0, 0, 0, 0,
        ));
        text.push_str(&item_edit_trigger_str(
            xpos + dx, ypos, 1.0, 1.0, 0.0, &[args.group], true, false, true, 0, 0, 0, 0, id,
            kind.as_wire_value(), small as f64, 1, 3, 1, 0, 0, 0, 0,
        ));
        Ok(EmitOutput {
            text,
            extra_objects: 2,
            extra_groups: 0,
        })
    } else {
        let text = item_edit_trigger_str(
            xpos, ypos, 1.0, 1.0, 0.0, &[args.group], true, false, true, 0, 0, 0, 0, id,
            kind.as_wire_value(), number, 0, 3, 1, 0, 0, 0, 0,
        );
        Ok(EmitOutput::simple(text))
    }
}

/// `result <op>= item1` (two-counter form: `MOV`/`ADD`/.../`FLDIV` with
/// `item, item` operands).
fn arithmetic_2counters(
    mnemonic: &'static str,
    ops: &[Operand],
    op: ArithOp,
    args: &EmitArgs,
) -> EmitResult<String> {
    let (result_kind, result_id) = item_at(ops, 0, mnemonic)?;
    let (item_kind, item_id) = item_at(ops, 1, mnemonic)?;
    Ok(item_edit_trigger_str(
        args.xpos(), args.ypos(), 1.0, 1.0, 0.0, &[args.group], true, false, true,
        item_id, 0, item_kind.as_wire_value(), 1,
        result_id, result_kind.as_wire_value(),
        1.0, op.wire_assign_op(), 3, 1, 0, 0, op.wire_sign_mode(), 0,
    ))
}

/// `result <op>= num` (counter/number form).
fn arithmetic_counter_num(
    mnemonic: &'static str,
    ops: &[Operand],
    op: ArithOp,
    args: &EmitArgs,
) -> EmitResult<String> {
    let (result_kind, result_id) = item_at(ops, 0, mnemonic)?;
    let num = number_at(ops, 1, mnemonic)?;
    Ok(item_edit_trigger_str(
        args.xpos(), args.ypos(), 1.0, 1.0, 0.0, &[args.group], true, false, true,
        0, 0, 0, 0, result_id, result_kind.as_wire_value(), num,
        op.wire_assign_op(), 3, 1, 0, 0, op.wire_sign_mode(), 0,
    ))
}

/// `result = item1 <op> item2` (three-counter form).
fn arithmetic_3counters(
    mnemonic: &'static str,
    ops: &[Operand],
    op: ArithOp,
    args: &EmitArgs,
) -> EmitResult<String> {
    let (result_kind, result_id) = item_at(ops, 0, mnemonic)?;
    let (item1_kind, item1_id) = item_at(ops, 1, mnemonic)?;
    let (item2_kind, item2_id) = item_at(ops, 2, mnemonic)?;
    Ok(item_edit_trigger_str(
        args.xpos(), args.ypos(), 1.0, 1.0, 0.0, &[args.group], true, false, true,
        item1_id, item2_id, item1_kind.as_wire_value(), item2_kind.as_wire_value(),
        result_id, result_kind.as_wire_value(),
        1.0, op.wire_assign_op(), 3, 1, 0, 0, op.wire_sign_mode(), 0,
    ))
}

/// `result = item1 <op> num` (two-counter-plus-immediate form). The
/// reference implementation wired its `item, item, number` overloads
/// (`MUL`/`DIV`/`FLDIV`) to the three-*counter* builder instead, which
/// cannot type-check a numeric third operand as an item id; this crate
/// uses the matching unused-but-correct builder from the original source
/// instead (see DESIGN.md).
fn arithmetic_2counters_num(
    mnemonic: &'static str,
    ops: &[Operand],
    op: ArithOp,
    args: &EmitArgs,
) -> EmitResult<String> {
    let (result_kind, result_id) = item_at(ops, 0, mnemonic)?;
    let (item1_kind, item1_id) = item_at(ops, 1, mnemonic)?;
    let modifier = number_at(ops, 2, mnemonic)?;
    Ok(item_edit_trigger_str(
        args.xpos(), args.ypos(), 1.0, 1.0, 0.0, &[args.group], true, false, true,
        item1_id, 0, item1_kind.as_wire_value(), 1,
        result_id, result_kind.as_wire_value(),
        modifier, op.wire_assign_op(), 3, 1, 0, 0, op.wire_sign_mode(), 0,
    ))
}

macro_rules! counter_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            _ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            Ok(EmitOutput::simple(arithmetic_2counters($mnemonic, ops, $op, args)?))
        }
    };
}

macro_rules! num_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            _ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            Ok(EmitOutput::simple(arithmetic_counter_num($mnemonic, ops, $op, args)?))
        }
    };
}

macro_rules! three_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            _ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            Ok(EmitOutput::simple(arithmetic_3counters($mnemonic, ops, $op, args)?))
        }
    };
}

macro_rules! three_num_emitter {
    ($name:ident, $mnemonic:expr, $op:expr) => {
        pub fn $name(
            ops: &[Operand],
            args: &EmitArgs,
            _ctx: &mut CompileContext,
        ) -> EmitResult<EmitOutput> {
            Ok(EmitOutput::simple(arithmetic_2counters_num($mnemonic, ops, $op, args)?))
        }
    };
}

counter_emitter!(mov_counter, "MOV", ArithOp::Assign);

counter_emitter!(add_counter, "ADD", ArithOp::Add);
num_emitter!(add_num, "ADD", ArithOp::Add);
three_emitter!(add2, "ADD", ArithOp::Add);

counter_emitter!(sub_counter, "SUB", ArithOp::Sub);
num_emitter!(sub_num, "SUB", ArithOp::Sub);
three_emitter!(sub2, "SUB", ArithOp::Sub);

counter_emitter!(mul_counter, "MUL", ArithOp::Mul);
num_emitter!(mul_num, "MUL", ArithOp::Mul);
three_emitter!(mul2, "MUL", ArithOp::Mul);
three_num_emitter!(mul2num, "MUL", ArithOp::Mul);

counter_emitter!(div_counter, "DIV", ArithOp::Div);
num_emitter!(div_num, "DIV", ArithOp::Div);
three_emitter!(div2, "DIV", ArithOp::Div);
three_num_emitter!(div2num, "DIV", ArithOp::Div);

counter_emitter!(fldiv_counter, "FLDIV", ArithOp::FloorDiv);
num_emitter!(fldiv_num, "FLDIV", ArithOp::FloorDiv);
three_emitter!(fldiv2, "FLDIV", ArithOp::FloorDiv);
three_num_emitter!(fldiv2num, "FLDIV", ArithOp::FloorDiv);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileContext;
    use crate::types::ItemKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn args(lengths: &HashMap<i32, usize>) -> EmitArgs<'_> {
        EmitArgs { group: 0, index: 0, squish: true, next_free: 5, lengths, subroutine_count: 1 }
    }

    fn mov_ops(value: f64) -> Vec<Operand> {
        vec![Operand::Item { kind: ItemKind::Counter, id: 1 }, Operand::Number(value)]
    }

    #[test]
    fn small_constant_emits_a_single_item_edit_record() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        let out = mov_num(&mov_ops(42.0), &a, &mut ctx).unwrap();
        assert_eq!(out.extra_objects, 0);
        assert_eq!(out.extra_groups, 0);
        assert_eq!(out.text.matches("1,3619").count(), 1);
    }

    #[test]
    fn constant_at_the_float_precision_boundary_is_not_bit_packed() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        let out = mov_num(&mov_ops(16_777_216.0), &a, &mut ctx).unwrap();
        assert_eq!(out.extra_objects, 0);
        assert_eq!(out.text.matches("1,3619").count(), 1);
    }

    #[test]
    fn constant_past_the_boundary_bit_packs_into_three_records_when_enabled() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        ctx.options.bit_packing_enabled = true;
        let out = mov_num(&mov_ops(20_000_000.0), &a, &mut ctx).unwrap();
        assert_eq!(out.extra_objects, 2);
        assert_eq!(out.extra_groups, 0);
        assert_eq!(out.text.matches("1,3619").count(), 3);

        // hi*65536 + lo must reconstruct the original value exactly.
        let hi = 20_000_000_i64 / BIT_PACK_DIVISOR;
        let lo = 20_000_000_i64 % BIT_PACK_DIVISOR;
        assert_eq!(hi * BIT_PACK_DIVISOR + lo, 20_000_000);
        assert!(out.text.contains(&format!(",479,{}", hi)));
        assert!(out.text.contains(&format!(",479,{}", BIT_PACK_DIVISOR)));
        assert!(out.text.contains(&format!(",479,{}", lo)));
    }

    #[test]
    fn constant_past_the_boundary_stays_a_single_record_when_bit_packing_disabled() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        ctx.options.bit_packing_enabled = false;
        let out = mov_num(&mov_ops(20_000_000.0), &a, &mut ctx).unwrap();
        assert_eq!(out.extra_objects, 0);
        assert_eq!(out.text.matches("1,3619").count(), 1);
    }

    #[test]
    fn the_first_record_places_at_index_zero_and_the_remaining_two_share_the_next_x() {
        let lengths = HashMap::new();
        let a = args(&lengths);
        let mut ctx = CompileContext::default();
        let out = mov_num(&mov_ops(20_000_000.0), &a, &mut ctx).unwrap();
        let xs: Vec<&str> = out
            .text
            .split(';')
            .filter(|s| !s.is_empty())
            .map(|rec| {
                let parts: Vec<&str> = rec.split(',').collect();
                let idx = parts.iter().position(|&k| k == "2").unwrap();
                parts[idx + 1]
            })
            .collect();
        assert_eq!(xs, vec!["105", "106", "106"]);
    }
}
