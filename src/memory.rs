//! The memory machine: `MALLOC`, `INITMEM`, `MPTR`, `MRESET`, `MREAD`,
//! `MWRITE`, `MFUNC`. Builds and operates a tape of collision-block cells
//! addressed by a movable pointer block.

use crate::constants::{
    BIT_PACK_DIVISOR, FLOAT_PRECISION_BOUNDARY, LEFT_PAD_BLOCK_ID, MEMORY_BLOCK_POS,
    POINTER_BLOCK_ID, RIGHT_PAD_BLOCK_ID,
};
use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::record::{
    collision_block_str, collision_trigger_str, counter_object_str, item_edit_trigger_str,
    move_trigger_str, move_trigger_str_full, plain_block_str, text_object_str, toggle_trigger_str,
};

/// `MALLOC N`: builds the tape. Every call after the first is a no-op
/// (`malloc_count` already nonzero), matching the "at most one MALLOC"
/// invariant (spec §8 invariant 5).
pub fn malloc(amount: i32, args: &EmitArgs, ctx: &mut CompileContext) -> EmitOutput {
    ctx.memory.malloc_count += 1;
    if ctx.memory.malloc_count > 1 {
        ctx.pending_warnings.push(crate::diagnostics::DiagnosticKind::MultipleMalloc);
        return EmitOutput::simple(String::new());
    }

    ctx.memory.memory_size = amount;
    ctx.resolved_memsize = Some(amount);

    let memreg_id = ctx.options.memreg_id;
    let ptrpos_id = ctx.options.ptrpos_id;
    let amount_u = amount.max(0) as u32;
    let starting_counter = memreg_id.saturating_sub(amount_u);
    ctx.memory.starting_counter = starting_counter;

    // Collision block ids (distinct namespace from groups/counters) shift
    // by `--coll-block-offset` so the tape's blocks don't collide with
    // blocks the user has already placed by hand in the editor.
    let coll_offset = ctx.options.coll_block_offset.max(0) as u32;
    let pointer_block_id = POINTER_BLOCK_ID + coll_offset;
    let left_pad_block_id = LEFT_PAD_BLOCK_ID + coll_offset;
    let right_pad_block_id = RIGHT_PAD_BLOCK_ID + coll_offset;

    let (x_offset, y_offset_base) = MEMORY_BLOCK_POS;
    let y_offset = y_offset_base + (args.subroutine_count as f64) * 30.0;

    let nf0 = args.next_free;
    ctx.memory.reset_block = nf0;
    let mut extra_groups = 0i32;
    let mut out = String::new();

    // Reset anchor: a plain block (no 64/67 no-fade/no-enter keys, unlike
    // every trigger primitive).
    out.push_str(&plain_block_str(x_offset, y_offset - 30.0, 0.5, 0.5, &[nf0]));

    // Pointer collision block.
    let pointer_group = nf0 + 1;
    ctx.memory.pointer_group = pointer_group;
    out.push_str(&collision_block_str(
        x_offset,
        y_offset - 30.0,
        0.8,
        0.8,
        0.0,
        &[pointer_group],
        pointer_block_id,
        true,
    ));

    let mut next_free = nf0 + 1;
    let read_group = next_free + 1;
    let write_group = next_free + 2;
    ctx.memory.read_group = read_group;
    ctx.memory.write_group = write_group;
    extra_groups += 3;
    next_free += 3;

    for idx in 0..amount_u {
        let item_group = next_free;
        let xpos = (idx as f64) * 30.0 + x_offset;
        let counter = starting_counter + idx;

        extra_groups += 1;
        out.push_str(&collision_block_str(
            xpos, y_offset, 1.0, 1.0, 0.0, &[], idx + 1 + coll_offset, false,
        ));
        out.push_str(&collision_trigger_str(
            x_offset - 71.25,
            y_offset + (idx as f64 + 1.0) * 7.5 - 18.75,
            0.25,
            0.25,
            0.0,
            &[],
            idx + 1 + coll_offset,
            pointer_block_id,
            item_group,
            true,
        ));
        out.push_str(&item_edit_trigger_str(
            xpos,
            y_offset + 30.0,
            1.0,
            1.0,
            0.0,
            &[item_group, write_group],
            true,
            false,
            true,
            memreg_id,
            0,
            1,
            0,
            counter,
            1,
            0.0,
            0,
            3,
            1,
            0,
            0,
            0,
            0,
        ));
        out.push_str(&item_edit_trigger_str(
            xpos,
            y_offset + 60.0,
            1.0,
            1.0,
            0.0,
            &[item_group, read_group],
            true,
            false,
            true,
            counter,
            0,
            1,
            0,
            memreg_id,
            1,
            0.0,
            0,
            3,
            1,
            0,
            0,
            0,
            0,
        ));
        out.push_str(&counter_object_str(
            xpos,
            y_offset - 60.0,
            0.4,
            0.4,
            -30.0,
            &[],
            counter,
            false,
            0,
            false,
            0,
        ));
        out.push_str(&move_trigger_str(
            xpos,
            y_offset + 90.0,
            1.0,
            1.0,
            0.0,
            &[item_group],
            true,
            false,
            true,
            0.0,
            -30.0,
            0.0,
            pointer_group,
        ));
        next_free += 1;
    }

    out.push_str(&collision_block_str(
        x_offset - 75.0,
        y_offset - 30.0,
        3.8,
        0.8,
        0.0,
        &[],
        left_pad_block_id,
        true,
    ));
    out.push_str(&collision_block_str(
        x_offset + (amount_u as f64) * 30.0 + 45.0,
        y_offset - 30.0,
        3.8,
        0.8,
        0.0,
        &[],
        right_pad_block_id,
        true,
    ));

    let y_offset = y_offset - 30.0;
    out.push_str(&collision_trigger_str(
        x_offset - 60.0,
        y_offset - 22.5,
        0.5,
        0.5,
        0.0,
        &[],
        left_pad_block_id,
        pointer_block_id,
        next_free,
        true,
    ));
    out.push_str(&collision_trigger_str(
        x_offset - 60.0,
        y_offset - 37.5,
        0.5,
        0.5,
        0.0,
        &[],
        right_pad_block_id,
        pointer_block_id,
        next_free + 1,
        true,
    ));
    out.push_str(&move_trigger_str(
        x_offset - 75.0,
        y_offset - 22.5,
        0.5,
        0.5,
        0.0,
        &[next_free],
        true,
        false,
        true,
        30.0,
        0.0,
        0.0,
        pointer_group,
    ));
    out.push_str(&move_trigger_str(
        x_offset - 75.0,
        y_offset - 37.5,
        0.5,
        0.5,
        0.0,
        &[next_free + 1],
        true,
        false,
        true,
        -30.0,
        0.0,
        0.0,
        pointer_group,
    ));
    out.push_str(&item_edit_trigger_str(
        x_offset - 90.0,
        y_offset - 22.5,
        0.5,
        0.5,
        0.0,
        &[next_free],
        true,
        false,
        true,
        0,
        0,
        1,
        1,
        ptrpos_id,
        1,
        0.0,
        0,
        3,
        1,
        0,
        0,
        0,
        0,
    ));
    out.push_str(&item_edit_trigger_str(
        x_offset - 90.0,
        y_offset - 37.5,
        0.5,
        0.5,
        0.0,
        &[next_free + 1],
        true,
        false,
        true,
        0,
        0,
        1,
        1,
        ptrpos_id,
        1,
        (amount_u as i64).saturating_sub(1) as f64,
        0,
        3,
        1,
        0,
        0,
        0,
        0,
    ));

    out.push_str(&text_object_str(
        x_offset,
        y_offset + 150.0,
        0.5,
        0.5,
        0.0,
        &[],
        "memory",
        0,
    ));

    // This final `+3` over-counts the two padding move-trigger groups
    // actually allocated here by one; preserved verbatim from the
    // reference implementation (a harmless group-id skip, not a collision).
    extra_groups += 3;

    EmitOutput {
        text: out,
        extra_objects: 0,
        extra_groups,
    }
}

/// `INITMEM v0,v1,...`: one (or three, bit-packed) item-edit triggers per
/// value, unconditionally ungated so they fire on load.
pub fn initmem(values: &[i32], args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    let (x0, y_base) = MEMORY_BLOCK_POS;
    let y_offset = y_base + (args.subroutine_count as f64) * 30.0;
    let starting_counter = ctx.memory.starting_counter;
    let bit_packing = ctx.options.bit_packing_enabled;

    let mut out = String::new();
    for (idx, &num) in values.iter().enumerate() {
        let counter = starting_counter + idx as u32;
        let y = y_offset + 7.5 * (idx as f64 + 1.0) - 18.75;
        let num64 = num as i64;
        if (num64.abs() as f64) <= FLOAT_PRECISION_BOUNDARY || !bit_packing {
            out.push_str(&item_edit_trigger_str(
                x0 - 63.75,
                y,
                0.25,
                0.25,
                0.0,
                &[],
                false,
                false,
                false,
                0,
                0,
                1,
                1,
                counter,
                1,
                num as f64,
                0,
                3,
                1,
                0,
                0,
                0,
                0,
            ));
        } else {
            let big = num64 / BIT_PACK_DIVISOR;
            let small = num64 % BIT_PACK_DIVISOR;
            out.push_str(&item_edit_trigger_str(
                x0 - 63.75,
                y,
                0.25,
                0.25,
                0.0,
                &[],
                false,
                false,
                false,
                0,
                0,
                1,
                1,
                counter,
                1,
                big as f64,
                0,
                3,
                1,
                0,
                0,
                0,
                0,
            ));
            out.push_str(&item_edit_trigger_str(
                x0 - 56.25,
                y,
                0.25,
                0.25,
                0.0,
                &[],
                false,
                false,
                false,
                0,
                0,
                1,
                1,
                counter,
                1,
                BIT_PACK_DIVISOR as f64,
                3,
                3,
                1,
                0,
                0,
                0,
                0,
            ));
            out.push_str(&item_edit_trigger_str(
                x0 - 48.75,
                y,
                0.25,
                0.25,
                0.0,
                &[],
                false,
                false,
                false,
                0,
                0,
                1,
                1,
                counter,
                1,
                small as f64,
                1,
                3,
                1,
                0,
                0,
                0,
                0,
            ));
        }
    }
    EmitOutput::simple(out)
}

/// `MFUNC`: pushes the pointer up one row, firing its collision with the
/// currently-aligned cell.
pub fn mfunc(args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    let extra_objects = if args.squish { 2 } else { 0 };
    let text = move_trigger_str(
        args.xpos(),
        args.ypos(),
        1.0,
        1.0,
        0.0,
        &[args.group],
        true,
        false,
        true,
        0.0,
        30.0,
        0.0,
        ctx.memory.pointer_group,
    );
    EmitOutput {
        text,
        extra_objects,
        extra_groups: 0,
    }
}

fn switch_mem_mode(read: bool, args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    let xpos = args.xpos();
    let ypos = args.ypos() + 7.5;
    let mut out = toggle_trigger_str(
        xpos,
        ypos,
        1.0,
        0.5,
        0.0,
        &[args.group],
        true,
        false,
        true,
        ctx.memory.read_group,
        read,
    );
    out.push_str(&toggle_trigger_str(
        xpos,
        ypos - 15.0,
        1.0,
        0.5,
        0.0,
        &[args.group],
        true,
        false,
        true,
        ctx.memory.write_group,
        !read,
    ));
    EmitOutput::simple(out)
}

/// `MREAD`: toggles read mode on, write mode off.
pub fn mread(args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    switch_mem_mode(true, args, ctx)
}

/// `MWRITE`: toggles write mode on, read mode off.
pub fn mwrite(args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    switch_mem_mode(false, args, ctx)
}

/// `MPTR k`: shifts the pointer `k` cells and adds `k` to the tracked
/// `PTRPOS` counter. The item-edit half recomputes its own position from
/// `args` rather than the move trigger's `y+7.5`, matching the reference
/// implementation where the forced y-offset was set but never read.
pub fn mptr(amount: i32, args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    let xpos = args.xpos();
    let ypos = args.ypos();
    let mut out = move_trigger_str(
        xpos,
        ypos + 7.5,
        1.0,
        0.5,
        0.0,
        &[args.group],
        true,
        false,
        true,
        (amount as f64) * 30.0,
        0.0,
        0.0,
        ctx.memory.pointer_group,
    );
    out.push_str(&item_edit_trigger_str(
        xpos,
        ypos,
        1.0,
        1.0,
        0.0,
        &[args.group],
        true,
        false,
        true,
        0,
        0,
        0,
        0,
        ctx.options.ptrpos_id,
        1,
        amount as f64,
        1,
        3,
        1,
        0,
        0,
        0,
        0,
    ));
    EmitOutput::simple(out)
}

/// `MRESET`: moves the pointer back to the reset anchor and zeroes
/// `PTRPOS`.
pub fn mreset(args: &EmitArgs, ctx: &CompileContext) -> EmitOutput {
    let xpos = args.xpos();
    let ypos = args.ypos();
    let mut out = move_trigger_str_full(
        xpos,
        ypos + 7.5,
        1.0,
        0.5,
        0.0,
        &[args.group],
        true,
        false,
        true,
        0.0,
        0.0,
        0.0,
        ctx.memory.pointer_group,
        true,
        ctx.memory.reset_block,
    );
    out.push_str(&item_edit_trigger_str(
        xpos,
        ypos,
        1.0,
        1.0,
        0.0,
        &[args.group],
        true,
        false,
        true,
        0,
        0,
        0,
        0,
        ctx.options.ptrpos_id,
        1,
        0.0,
        0,
        3,
        1,
        0,
        0,
        0,
        0,
    ));
    EmitOutput::simple(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CompileContext, CompileOptions};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn args(lengths: &HashMap<i32, usize>, next_free: i32, subroutine_count: i32) -> EmitArgs<'_> {
        EmitArgs { group: 0, index: 0, squish: true, next_free, lengths, subroutine_count }
    }

    #[test]
    fn malloc_builds_one_cell_per_requested_slot() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 2);
        let mut ctx = CompileContext::new(CompileOptions::default());
        let out = malloc(3, &a, &mut ctx);
        // pointer block + one per cell + two bounce-padding blocks.
        assert_eq!(out.text.matches("1,1816").count(), 1 + 3 + 2);
        assert_eq!(out.text.matches("1,1815").count(), 3 + 2);
        assert_eq!(ctx.memory.memory_size, 3);
        assert_eq!(ctx.memory.starting_counter, ctx.options.memreg_id - 3);
    }

    #[test]
    fn coll_block_offset_shifts_every_collision_block_id_the_tape_emits() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 2);

        let mut plain_ctx = CompileContext::new(CompileOptions::default());
        let plain = malloc(3, &a, &mut plain_ctx);
        assert!(plain.text.contains(&format!("80,{}", POINTER_BLOCK_ID)));
        assert!(plain.text.contains(&format!("80,{}", LEFT_PAD_BLOCK_ID)));
        assert!(plain.text.contains(&format!("80,{}", RIGHT_PAD_BLOCK_ID)));

        let mut options = CompileOptions::default();
        options.coll_block_offset = 500;
        let mut offset_ctx = CompileContext::new(options);
        let offset = malloc(3, &a, &mut offset_ctx);
        assert!(!offset.text.contains(&format!("80,{},", POINTER_BLOCK_ID)));
        assert!(offset.text.contains(&format!("80,{},", POINTER_BLOCK_ID + 500)));
        assert!(offset.text.contains(&format!("80,{},", LEFT_PAD_BLOCK_ID + 500)));
        assert!(offset.text.contains(&format!("80,{},", RIGHT_PAD_BLOCK_ID + 500)));
        // Group ids are a separate namespace and must not shift.
        assert_eq!(offset_ctx.memory.pointer_group, plain_ctx.memory.pointer_group);
    }

    #[test]
    fn a_second_malloc_call_is_a_no_op_and_warns() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 1);
        let mut ctx = CompileContext::new(CompileOptions::default());
        let first = malloc(4, &a, &mut ctx);
        assert!(!first.text.is_empty());
        let second = malloc(8, &a, &mut ctx);
        assert!(second.text.is_empty());
        assert_eq!(ctx.memory.memory_size, 4);
        assert!(ctx
            .pending_warnings
            .iter()
            .any(|w| matches!(w, crate::diagnostics::DiagnosticKind::MultipleMalloc)));
    }

    #[test]
    fn initmem_emits_one_record_for_small_values_and_three_for_bit_packed_ones() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 1);
        let mut ctx = CompileContext::new(CompileOptions::default());
        malloc(4, &a, &mut ctx);

        let small = initmem(&[16_777_216], &a, &ctx);
        assert_eq!(small.text.matches("1,3619").count(), 1);

        let big = initmem(&[16_777_217], &a, &ctx);
        assert_eq!(big.text.matches("1,3619").count(), 3);

        ctx.options.bit_packing_enabled = false;
        let unpacked = initmem(&[16_777_217], &a, &ctx);
        assert_eq!(unpacked.text.matches("1,3619").count(), 1);
    }

    #[test]
    fn mptr_zero_still_emits_a_move_and_an_item_edit_record() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 1);
        let ctx = CompileContext::new(CompileOptions::default());
        let out = mptr(0, &a, &ctx);
        assert_eq!(out.text.matches("1,901").count(), 1);
        assert_eq!(out.text.matches("1,3619").count(), 1);
    }

    #[test]
    fn mreset_moves_the_pointer_to_the_reset_block_and_zeroes_ptrpos() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 1);
        let mut ctx = CompileContext::new(CompileOptions::default());
        malloc(2, &a, &mut ctx);
        let out = mreset(&a, &ctx);
        assert_eq!(out.text.matches("1,901").count(), 1);
        assert!(out.text.contains(",479,0"));
        assert!(out.text.contains(&format!(",71,{}", ctx.memory.reset_block)));
        assert!(out.text.contains(&format!(",51,{}", ctx.memory.pointer_group)));
    }

    #[test]
    fn mread_and_mwrite_toggle_opposite_groups() {
        let lengths = HashMap::new();
        let a = args(&lengths, 10, 1);
        let mut ctx = CompileContext::new(CompileOptions::default());
        malloc(2, &a, &mut ctx);
        let read_out = mread(&a, &ctx);
        assert_eq!(read_out.text.matches("1,1049").count(), 2);
        let write_out = mwrite(&a, &ctx);
        assert_eq!(write_out.text.matches("1,1049").count(), 2);
        assert_ne!(read_out.text, write_out.text);
    }
}
