//! Value-based replacement for the reference implementation's module-level
//! globals (`used_extra_objects`, `malloc_count`, `pointer_group`, ...).
//!
//! Per-instruction scratch (`used_extra_objects`/`used_extra_groups`) is
//! *not* stored here: emitters return it as part of their result triple
//! (see [`crate::record::EmitOutput`]) and the output assembler folds it
//! into the layout cursor itself. What lives on `CompileContext` is the
//! state a `MALLOC` call establishes once and every later memory
//! instruction in the program needs to see again.

use std::collections::HashSet;

use crate::constants::{DEFAULT_MEMREG_ID, DEFAULT_PTRPOS_ID};
use crate::diagnostics::DiagnosticKind;

/// Compile-time toggles selected by CLI flags, constant for the whole run.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub squish: bool,
    pub bit_packing_enabled: bool,
    pub spawn_ordered_enabled: bool,
    pub spawn_delay_enabled: bool,
    pub timewarp_trigger: bool,
    pub memreg_id: u32,
    pub ptrpos_id: u32,
    pub group_offset: i32,
    pub coll_block_offset: i32,
    pub counter_offset: i32,
    pub warnings_enabled: bool,
    /// Debug routine-number/name text markers, toggled off by
    /// `--no-routine-text`.
    pub routine_text_enabled: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            squish: true,
            bit_packing_enabled: true,
            spawn_ordered_enabled: true,
            spawn_delay_enabled: true,
            timewarp_trigger: false,
            memreg_id: DEFAULT_MEMREG_ID,
            ptrpos_id: DEFAULT_PTRPOS_ID,
            group_offset: 0,
            coll_block_offset: 0,
            counter_offset: 0,
            warnings_enabled: true,
            routine_text_enabled: true,
        }
    }
}

/// State the memory machine establishes once (on the single legal
/// `MALLOC`) and every subsequent `MREAD`/`MWRITE`/`MPTR`/`MRESET`/`MFUNC`
/// instruction reads back.
#[derive(Clone, Debug, Default)]
pub struct MemoryMachineState {
    pub malloc_count: u32,
    pub memory_size: i32,
    pub starting_counter: u32,
    pub pointer_group: i32,
    pub read_group: i32,
    pub write_group: i32,
    pub reset_block: i32,
}

impl MemoryMachineState {
    pub fn is_initialized(&self) -> bool {
        self.malloc_count > 0
    }
}

/// Everything an instruction emitter needs beyond its own operands:
/// CLI-selected options, the memory machine's persistent state, and the
/// bookkeeping for already-claimed IOBLOCK positions.
#[derive(Clone, Debug)]
pub struct CompileContext {
    pub options: CompileOptions,
    pub memory: MemoryMachineState,
    pub io_blocks: HashSet<i32>,
    /// Resolved once `MALLOC`'s argument is known; backs the `MEMSIZE`
    /// late-bound symbol.
    pub resolved_memsize: Option<i32>,
    /// Warnings raised from inside an emitter (`MultipleMalloc`,
    /// `DuplicateIOBlock`) that can't be reported through the emitter's
    /// `EmitResult` return value without also aborting codegen for an
    /// instruction the spec says should still emit (or silently drop)
    /// its record. The output assembler drains this after every emitter
    /// call and turns each into a proper [`Diagnostic`](crate::diagnostics::Diagnostic)
    /// attributed to that instruction's line/routine.
    pub pending_warnings: Vec<DiagnosticKind>,
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        CompileContext {
            options,
            memory: MemoryMachineState::default(),
            io_blocks: HashSet::new(),
            resolved_memsize: None,
            pending_warnings: Vec::new(),
        }
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        CompileContext::new(CompileOptions::default())
    }
}
