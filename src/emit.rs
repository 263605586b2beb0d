//! The per-instruction emission context and the emitter result triple
//! that replaces the reference implementation's `used_extra_objects` /
//! `used_extra_groups` globals (spec §9).

use std::collections::HashMap;

/// Everything an emitter needs about *where* it's placing objects and
/// what else is in the namespace, independent of its own operands.
#[derive(Clone, Copy, Debug)]
pub struct EmitArgs<'a> {
    pub group: i32,
    pub index: i32,
    pub squish: bool,
    /// Next unclaimed auxiliary group id.
    pub next_free: i32,
    /// routine group id -> instruction count, consulted by compare/fork
    /// emitters to decide whether a target needs helper-spawn
    /// indirection.
    pub lengths: &'a HashMap<i32, usize>,
    pub subroutine_count: i32,
}

impl<'a> EmitArgs<'a> {
    pub fn xpos(&self) -> f64 {
        105.0 + (if self.squish { 1.0 } else { 30.0 }) * self.index as f64
    }

    pub fn ypos(&self) -> f64 {
        self.group as f64 * 30.0 + 75.0
    }
}

/// An emitter's result: the object-record text it produced, plus how
/// many extra objects/groups it consumed beyond the implicit "1 object,
/// 0 groups" default. The output assembler folds these into its layout
/// cursor; nothing is read back from mutable global state.
#[derive(Clone, Debug, Default)]
pub struct EmitOutput {
    pub text: String,
    pub extra_objects: i32,
    pub extra_groups: i32,
}

impl EmitOutput {
    pub fn simple(text: String) -> Self {
        EmitOutput {
            text,
            extra_objects: 0,
            extra_groups: 0,
        }
    }

    /// `IOBLOCK`/`NOP`-style "this instruction occupies no object slot".
    pub fn no_object(text: String) -> Self {
        EmitOutput {
            text,
            extra_objects: -1,
            extra_groups: 0,
        }
    }
}
