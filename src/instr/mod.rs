//! One module per instruction family; each exposes emitter functions
//! matching the [`Emitter`] signature used by [`crate::table`].

pub mod arithmetic;
pub mod compare;
pub mod control;
pub mod fork;
pub mod memory_ops;

use crate::context::CompileContext;
use crate::emit::{EmitArgs, EmitOutput};
use crate::error::{EmitError, EmitResult};
use crate::types::{ItemKind, Operand};

/// Signature every instruction emitter implements. `operands` has already
/// been matched against the mnemonic's overload schema by the validator,
/// so extraction helpers below only need to guard against internal
/// table/validator mismatches, never genuine user mistakes.
pub type Emitter = fn(&[Operand], &EmitArgs, &mut CompileContext) -> EmitResult<EmitOutput>;

pub(crate) fn shape_error(mnemonic: &'static str, detail: &str) -> EmitError {
    EmitError::OperandShapeMismatch {
        mnemonic,
        detail: detail.to_string(),
    }
}

pub(crate) fn item_at(ops: &[Operand], i: usize, mnemonic: &'static str) -> EmitResult<(ItemKind, u32)> {
    ops.get(i)
        .and_then(Operand::as_item)
        .ok_or_else(|| shape_error(mnemonic, "expected item operand"))
}

pub(crate) fn number_at(ops: &[Operand], i: usize, mnemonic: &'static str) -> EmitResult<f64> {
    ops.get(i)
        .and_then(Operand::as_number)
        .ok_or_else(|| shape_error(mnemonic, "expected numeric operand"))
}

pub(crate) fn int_at(ops: &[Operand], i: usize, mnemonic: &'static str) -> EmitResult<i32> {
    ops.get(i)
        .and_then(Operand::as_int)
        .ok_or_else(|| shape_error(mnemonic, "expected integer operand"))
}

pub(crate) fn str_at<'a>(ops: &'a [Operand], i: usize, mnemonic: &'static str) -> EmitResult<&'a str> {
    ops.get(i)
        .and_then(Operand::as_str)
        .ok_or_else(|| shape_error(mnemonic, "expected string operand"))
}

pub(crate) fn int_array_at<'a>(
    ops: &'a [Operand],
    i: usize,
    mnemonic: &'static str,
) -> EmitResult<&'a [i32]> {
    ops.get(i)
        .and_then(Operand::as_int_array)
        .ok_or_else(|| shape_error(mnemonic, "expected int_array operand"))
}

/// Group ids (routine refs / group literals) are resolved to plain
/// integers by the output assembler before the emitter ever sees them, so
/// by the time an emitter runs a `Group`/`Routine` operand has already
/// become an `Int`.
pub(crate) fn group_at(ops: &[Operand], i: usize, mnemonic: &'static str) -> EmitResult<i32> {
    ops.get(i)
        .and_then(Operand::as_int)
        .ok_or_else(|| shape_error(mnemonic, "expected resolved group operand"))
}
