//! The operand model: what a single comma-separated argument token turns
//! into once its kind has been inferred.

use std::fmt;

/// Which item table a `C<n>`/`T<n>` token addresses.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ItemKind {
    Counter = 1,
    Timer = 2,
}

impl ItemKind {
    pub fn from_prefix(c: char) -> Option<ItemKind> {
        match c.to_ascii_lowercase() {
            'c' => Some(ItemKind::Counter),
            't' => Some(ItemKind::Timer),
            _ => None,
        }
    }

    pub fn as_wire_value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ItemKind::Counter => write!(f, "C"),
            ItemKind::Timer => write!(f, "T"),
        }
    }
}

/// A fully classified operand. Produced by the validator once it has
/// matched an instruction to one of its mnemonic's overloads.
#[derive(Clone, PartialEq, Debug)]
pub enum Operand {
    Int(i32),
    Number(f64),
    IntArray(Vec<i32>),
    Str(String),
    Item { kind: ItemKind, id: u32 },
    RoutineRef(String),
    /// The `MEMSIZE` symbol in a `Number`-typed position — late-bound to
    /// the single legal `MALLOC`'s argument by the output assembler
    /// before any emitter sees it.
    MemSize,
}

impl Operand {
    pub fn as_item(&self) -> Option<(ItemKind, u32)> {
        match self {
            Operand::Item { kind, id } => Some((*kind, *id)),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Operand::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            Operand::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            Operand::IntArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_routine_name(&self) -> Option<&str> {
        match self {
            Operand::RoutineRef(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// The kind tag a schema entry checks an operand against. Distinct from
/// `Operand` because `Counter` is a narrower predicate than `Item`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum OperandKind {
    Int,
    Number,
    IntArray,
    Str,
    Item,
    Counter,
    Routine,
}

impl fmt::Display for Operand {
    /// Renders an operand back to roughly the source token it was
    /// parsed from. Used by the namespace JSON dump (spec §2a), whose
    /// consumer is an external interpreter process that expects plain
    /// text arguments rather than this crate's typed `Operand`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{}", *n as i64),
            Operand::Number(n) => write!(f, "{}", n),
            Operand::IntArray(v) => {
                let joined = v.iter().map(i32::to_string).collect::<Vec<_>>().join(",");
                write!(f, "{}", joined)
            }
            Operand::Str(s) => write!(f, "{}", s),
            Operand::Item { kind, id } => write!(f, "{}{}", kind, id),
            Operand::RoutineRef(name) => write!(f, "{}", name),
            Operand::MemSize => write!(f, "MEMSIZE"),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            OperandKind::Int => "int",
            OperandKind::Number => "number",
            OperandKind::IntArray => "int_array",
            OperandKind::Str => "str",
            OperandKind::Item => "item",
            OperandKind::Counter => "counter",
            OperandKind::Routine => "routine",
        };
        write!(f, "{}", name)
    }
}
