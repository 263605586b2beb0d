//! Hand-rolled error enum for the core emitter library. No `thiserror`:
//! each variant gets an explicit `Display` impl, matching the teacher
//! crate's own `vasm::error` module.

use std::fmt;

#[derive(Clone, Debug)]
pub enum EmitError {
    /// An emitter received an operand shape the validator should have
    /// rejected before reaching codegen. Indicates a validator/table
    /// mismatch, never a user-facing mistake.
    OperandShapeMismatch { mnemonic: &'static str, detail: String },
    /// `MREAD`/`MWRITE`/`MFUNC`/`MPTR`/`MRESET` used before any `MALLOC`.
    MemoryBeforeMalloc { mnemonic: &'static str },
    /// A routine name referenced by an instruction isn't in the
    /// namespace's group table (should have been caught earlier).
    UnknownGroup { routine: String },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmitError::OperandShapeMismatch { mnemonic, detail } => {
                write!(f, "internal error: {} received unexpected operands ({})", mnemonic, detail)
            }
            EmitError::MemoryBeforeMalloc { mnemonic } => {
                write!(f, "{} used before memory was initialised with MALLOC", mnemonic)
            }
            EmitError::UnknownGroup { routine } => {
                write!(f, "reference to undefined routine '{}'", routine)
            }
        }
    }
}

impl std::error::Error for EmitError {}

pub type EmitResult<T> = Result<T, EmitError>;
