//! Adapts [`crate::memory`]'s infallible builder functions to the
//! [`super::Emitter`] signature the instruction table expects.
//! `MALLOC`/`INITMEM`/`MPTR` read their integer/array operand then
//! delegate straight through; the rest take no operands at all.

use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::{EmitError, EmitResult};
use crate::memory;
use crate::types::Operand;

use super::{int_array_at, int_at};

fn require_malloc(ctx: &CompileContext, mnemonic: &'static str) -> EmitResult<()> {
    if !ctx.memory.is_initialized() {
        return Err(EmitError::MemoryBeforeMalloc { mnemonic });
    }
    Ok(())
}

/// `MALLOC n` — builds the tape. Never errors: repeat calls are a no-op
/// (spec §8 invariant 5), diagnosed separately during semantic
/// validation.
pub fn malloc(ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    let amount = int_at(ops, 0, "MALLOC")?;
    Ok(memory::malloc(amount, args, ctx))
}

/// `INITMEM v1,v2,...` — seeds the tape's counters at compile time.
pub fn initmem(ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "INITMEM")?;
    let values = int_array_at(ops, 0, "INITMEM")?;
    Ok(memory::initmem(values, args, ctx))
}

/// `MFUNC` — advances the pointer one cell and fires the aligned
/// collision.
pub fn mfunc(_ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "MFUNC")?;
    Ok(memory::mfunc(args, ctx))
}

/// `MREAD` — switches the tape into read mode.
pub fn mread(_ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "MREAD")?;
    Ok(memory::mread(args, ctx))
}

/// `MWRITE` — switches the tape into write mode.
pub fn mwrite(_ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "MWRITE")?;
    Ok(memory::mwrite(args, ctx))
}

/// `MPTR k` — shifts the pointer `k` cells.
pub fn mptr(ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "MPTR")?;
    let amount = int_at(ops, 0, "MPTR")?;
    Ok(memory::mptr(amount, args, ctx))
}

/// `MRESET` — snaps the pointer back to its starting cell.
pub fn mreset(_ops: &[Operand], args: &EmitArgs, ctx: &mut CompileContext) -> EmitResult<EmitOutput> {
    require_malloc(ctx, "MRESET")?;
    Ok(memory::mreset(args, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn mread_before_malloc_is_an_error() {
        let lengths = HashMap::new();
        let args = EmitArgs { group: 0, index: 0, squish: true, next_free: 10, lengths: &lengths, subroutine_count: 1 };
        let mut ctx = CompileContext::default();
        let err = mread(&[], &args, &mut ctx).unwrap_err();
        assert!(matches!(err, EmitError::MemoryBeforeMalloc { mnemonic: "MREAD" }));
    }

    #[test]
    fn malloc_then_mread_succeeds() {
        let lengths = HashMap::new();
        let args = EmitArgs { group: 0, index: 0, squish: true, next_free: 10, lengths: &lengths, subroutine_count: 1 };
        let mut ctx = CompileContext::default();
        malloc(&[Operand::Int(4)], &args, &mut ctx).unwrap();
        assert!(mread(&[], &args, &mut ctx).is_ok());
    }
}
