//! The static instruction table: for each mnemonic, which routines it's
//! allowed in and, in first-match-wins order, which operand-kind schema
//! selects which emitter. Grounded exactly in the reference
//! implementation's `INSTRUCTIONS` dict — overload order matters, since
//! the validator stops at the first schema whose arity and per-operand
//! kinds all match (spec §5).

use crate::instr::{arithmetic, compare, control, fork, memory_ops, Emitter};
use crate::types::OperandKind;

use OperandKind::{Int, IntArray, Item, Number, Routine, Str};

/// Which routines a mnemonic may appear in.
#[derive(Clone, Copy, Debug)]
pub enum Allowed {
    /// Every routine including `_init`.
    Any,
    /// Exactly the named routines (in practice always just `["_init"]`).
    Only(&'static [&'static str]),
}

impl Allowed {
    pub fn permits(self, routine: &str) -> bool {
        match self {
            Allowed::Any => true,
            Allowed::Only(names) => names.contains(&routine),
        }
    }
}

/// One candidate operand-kind schema and the emitter it dispatches to.
#[derive(Clone, Copy)]
pub struct Overload {
    pub schema: &'static [OperandKind],
    pub emitter: Emitter,
}

#[derive(Clone, Copy)]
pub struct InstructionSpec {
    pub allowed: Allowed,
    pub overloads: &'static [Overload],
}

macro_rules! ov {
    ($schema:expr, $emitter:path) => {
        Overload { schema: $schema, emitter: $emitter }
    };
}

/// Looks up a mnemonic's allowed-routines and overload list. Mnemonics
/// are matched case-sensitively, uppercase, exactly as the source
/// spells them.
pub fn lookup(mnemonic: &str) -> Option<InstructionSpec> {
    Some(match mnemonic {
        "PERS" => InstructionSpec {
            allowed: Allowed::Only(&["_init"]),
            overloads: &[ov!(&[Item], control::pers)],
        },
        "DISPLAY" => InstructionSpec {
            allowed: Allowed::Only(&["_init"]),
            overloads: &[
                ov!(&[Item], control::display),
                ov!(&[Item, Number], control::display_pos),
            ],
        },
        "INITMEM" => InstructionSpec {
            allowed: Allowed::Only(&["_init"]),
            overloads: &[ov!(&[IntArray], memory_ops::initmem)],
        },
        "MALLOC" => InstructionSpec {
            allowed: Allowed::Only(&["_init"]),
            overloads: &[ov!(&[Int], memory_ops::malloc)],
        },
        "MFUNC" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[], memory_ops::mfunc)],
        },
        "MREAD" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[], memory_ops::mread)],
        },
        "MWRITE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[], memory_ops::mwrite)],
        },
        "MPTR" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[Int], memory_ops::mptr)],
        },
        "MRESET" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[], memory_ops::mreset)],
        },
        "IOBLOCK" => InstructionSpec {
            allowed: Allowed::Only(&["_init"]),
            overloads: &[ov!(&[Routine, Int, Str], control::ioblock)],
        },
        "NOP" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[], control::nop)],
        },
        "MOV" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::mov_num),
                ov!(&[Item, Item], arithmetic::mov_counter),
            ],
        },
        "ADD" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::add_num),
                ov!(&[Item, Item], arithmetic::add_counter),
                ov!(&[Item, Item, Item], arithmetic::add2),
            ],
        },
        "SUB" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::sub_num),
                ov!(&[Item, Item], arithmetic::sub_counter),
                ov!(&[Item, Item, Item], arithmetic::sub2),
            ],
        },
        "MUL" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::mul_num),
                ov!(&[Item, Item], arithmetic::mul_counter),
                ov!(&[Item, Item, Item], arithmetic::mul2),
                ov!(&[Item, Item, Number], arithmetic::mul2num),
            ],
        },
        "DIV" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::div_num),
                ov!(&[Item, Item], arithmetic::div_counter),
                ov!(&[Item, Item, Item], arithmetic::div2),
                ov!(&[Item, Item, Number], arithmetic::div2num),
            ],
        },
        "FLDIV" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Item, Number], arithmetic::fldiv_num),
                ov!(&[Item, Item], arithmetic::fldiv_counter),
                ov!(&[Item, Item, Item], arithmetic::fldiv2),
                ov!(&[Item, Item, Number], arithmetic::fldiv2num),
            ],
        },
        "SPAWN" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[ov!(&[Routine], control::spawn)],
        },
        "SE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_equals_num),
                ov!(&[Routine, Item, Item], compare::spawn_equals_item),
            ],
        },
        "SNE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_nequals_num),
                ov!(&[Routine, Item, Item], compare::spawn_nequals_item),
            ],
        },
        "SL" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_less_num),
                ov!(&[Routine, Item, Item], compare::spawn_less_item),
            ],
        },
        "SLE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_lequals_num),
                ov!(&[Routine, Item, Item], compare::spawn_lequals_item),
            ],
        },
        "SG" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_greater_num),
                ov!(&[Routine, Item, Item], compare::spawn_greater_item),
            ],
        },
        "SGE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Item, Number], compare::spawn_gequals_num),
                ov!(&[Routine, Item, Item], compare::spawn_gequals_item),
            ],
        },
        "FE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_equals_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_equals_item),
            ],
        },
        "FNE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_nequals_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_nequals_item),
            ],
        },
        "FL" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_less_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_less_item),
            ],
        },
        "FLE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_lequals_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_lequals_item),
            ],
        },
        "FG" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_greater_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_greater_item),
            ],
        },
        "FGE" => InstructionSpec {
            allowed: Allowed::Any,
            overloads: &[
                ov!(&[Routine, Routine, Item, Number], fork::fork_gequals_num),
                ov!(&[Routine, Routine, Item, Item], fork::fork_gequals_item),
            ],
        },
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mnemonic_overload_order_prefers_number_before_item() {
        let spec = lookup("SE").unwrap();
        assert_eq!(spec.overloads[0].schema, &[Routine, Item, Number][..]);
        assert_eq!(spec.overloads[1].schema, &[Routine, Item, Item][..]);
    }

    #[test]
    fn ioblock_is_restricted_to_init() {
        let spec = lookup("IOBLOCK").unwrap();
        assert!(spec.allowed.permits("_init"));
        assert!(!spec.allowed.permits("main"));
    }

    #[test]
    fn mfunc_is_allowed_everywhere() {
        let spec = lookup("MFUNC").unwrap();
        assert!(spec.allowed.permits("_init"));
        assert!(spec.allowed.permits("anything"));
    }

    #[test]
    fn unknown_mnemonic_returns_none() {
        assert!(lookup("BOGUS").is_none());
    }
}
