//! Overload resolution: matches each lexed instruction's mnemonic and
//! operand text against [`crate::table`]'s static schema list, in
//! declared order, first match wins (spec §4.2). Grounded in the
//! reference implementation's `validate_instruction`/`valid_arguments`/
//! `is_type`/`types` dict.

use crate::context::CompileOptions;
use crate::constants::{I32_MAX_EXCLUSIVE, I32_MIN, MAX_ITEM_ID, MIN_ITEM_ID};
use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind};
use crate::instr::Emitter;
use crate::lexer::{LexResult, RawInstruction};
use crate::table::{self, InstructionSpec, Overload};
use crate::types::{ItemKind, Operand, OperandKind};

#[derive(Clone, Debug)]
pub struct ValidatedInstruction {
    pub line: u32,
    pub mnemonic: String,
    pub overload_index: usize,
    pub emitter: Emitter,
    pub operands: Vec<Operand>,
}

#[derive(Clone, Debug)]
pub struct ValidatedRoutine {
    pub name: String,
    pub header_line: u32,
    pub instructions: Vec<ValidatedInstruction>,
}

#[derive(Clone, Debug, Default)]
pub struct ValidatedProgram {
    pub routines: Vec<ValidatedRoutine>,
}

fn parse_int(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: i64 = token.parse().ok()?;
    if value > I32_MIN && value < I32_MAX_EXCLUSIVE {
        Some(value as i32)
    } else {
        None
    }
}

fn parse_int_array(token: &str) -> Option<Vec<i32>> {
    token.split(',').map(parse_int).collect()
}

/// Returns the parsed item, or `None` if the token isn't `C<n>`/`T<n>`
/// shaped with `n` in `[1, 65535]`.
fn parse_item(token: &str) -> Option<(ItemKind, u32)> {
    if token.len() < 2 {
        return None;
    }
    let prefix = token.chars().next()?;
    let kind = ItemKind::from_prefix(prefix)?;
    let id = parse_int(&token[prefix.len_utf8()..])?;
    let id = id as i64;
    if id >= MIN_ITEM_ID && id <= MAX_ITEM_ID {
        Some((kind, id as u32))
    } else {
        None
    }
}

/// Parses a `Number`-typed token. Returns the operand plus whether its
/// magnitude exceeds the host float's integer-exact range (spec §4.2's
/// "number range warning", |n| > 2²⁴).
fn parse_number(token: &str) -> Option<(Operand, bool)> {
    if token == "MEMSIZE" {
        return Some((Operand::MemSize, false));
    }
    let n: f64 = token.parse().ok()?;
    let round_risk = !(-16_777_216.0..=16_777_216.0).contains(&n);
    Some((Operand::Number(n), round_risk))
}

/// Splits an instruction's raw argument field into one token per
/// schema position. When the schema's final kind is `Str`, the last
/// token is the untouched remainder of the field (spec §3: `Str` is
/// "the remainder of an instruction's argument field, taken verbatim"),
/// so embedded commas in a trailing text argument (e.g. `IOBLOCK`'s
/// label) don't get mis-split the way a blind `", "`-split would.
fn split_for_schema(args: &str, schema: &[OperandKind]) -> Vec<String> {
    if schema.last() == Some(&OperandKind::Str) && !schema.is_empty() {
        args.splitn(schema.len(), ", ").map(str::to_string).collect()
    } else {
        args.split(", ")
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn classify(
    token: &str,
    kind: OperandKind,
    routine_names: &[&str],
    options: &CompileOptions,
    line: u32,
    bag: &mut DiagnosticBag,
) -> Option<Operand> {
    match kind {
        OperandKind::Int => parse_int(token).map(Operand::Int),
        OperandKind::IntArray => parse_int_array(token).map(Operand::IntArray),
        OperandKind::Str => Some(Operand::Str(token.to_string())),
        OperandKind::Number => {
            let (operand, round_risk) = parse_number(token)?;
            if round_risk && !options.bit_packing_enabled {
                bag.push(Diagnostic::warning(
                    DiagnosticKind::NumericPrecisionRisk,
                    line,
                    "",
                    "GD will incorrectly round numbers above 16,777,216. This operation may result in an inaccuracy.",
                ));
            }
            Some(operand)
        }
        OperandKind::Counter => {
            let (kind, id) = parse_item(token)?;
            (kind == ItemKind::Counter).then_some(Operand::Item { kind, id })
        }
        OperandKind::Item => {
            let (kind, id) = parse_item(token)?;
            Some(Operand::Item { kind, id })
        }
        OperandKind::Routine => {
            routine_names.contains(&token).then(|| Operand::RoutineRef(token.to_string()))
        }
    }
}

fn resolve_overload(
    args: &str,
    overloads: &'static [Overload],
    routine_names: &[&str],
    options: &CompileOptions,
    line: u32,
    bag: &mut DiagnosticBag,
) -> Option<(usize, Vec<Operand>, Emitter)> {
    'overloads: for (idx, overload) in overloads.iter().enumerate() {
        let tokens = split_for_schema(args, overload.schema);
        if tokens.len() != overload.schema.len() {
            continue;
        }
        let mut operands = Vec::with_capacity(tokens.len());
        for (token, &kind) in tokens.iter().zip(overload.schema.iter()) {
            match classify(token, kind, routine_names, options, line, bag) {
                Some(op) => operands.push(op),
                None => continue 'overloads,
            }
        }
        return Some((idx, operands, overload.emitter));
    }
    None
}

fn validate_instruction(
    instr: &RawInstruction,
    routine: &str,
    routine_names: &[&str],
    options: &CompileOptions,
    bag: &mut DiagnosticBag,
) -> Option<ValidatedInstruction> {
    let spec: InstructionSpec = match table::lookup(&instr.mnemonic) {
        Some(spec) => spec,
        None => {
            bag.push(Diagnostic::error(
                DiagnosticKind::UnknownInstruction,
                instr.line,
                routine,
                format!("Invalid instruction: {}", instr.mnemonic),
            ));
            return None;
        }
    };

    if !spec.allowed.permits(routine) {
        bag.push(Diagnostic::error(
            DiagnosticKind::DisallowedHere { routine: routine.to_string() },
            instr.line,
            routine,
            format!("Instruction '{}' not allowed in routine '{}'.", instr.mnemonic, routine),
        ));
    }

    match resolve_overload(&instr.args, spec.overloads, routine_names, options, instr.line, bag) {
        Some((overload_index, operands, emitter)) => Some(ValidatedInstruction {
            line: instr.line,
            mnemonic: instr.mnemonic.clone(),
            overload_index,
            emitter,
            operands,
        }),
        None => {
            bag.push(Diagnostic::error(
                DiagnosticKind::ArgumentMismatch,
                instr.line,
                routine,
                format!("Cannot call '{}' with these arguments: {}.", instr.mnemonic, instr.args),
            ));
            None
        }
    }
}

/// Validates every routine's instructions. Routines that end up empty
/// are *not* dropped here — that's the namespace builder's job (spec
/// §4.3), since group-id numbering needs to see every declared routine
/// including ones later removed.
pub fn validate(lexed: &LexResult, options: &CompileOptions, bag: &mut DiagnosticBag) -> ValidatedProgram {
    let routine_names = lexed.routine_names();
    let mut program = ValidatedProgram::default();
    for routine in &lexed.routines {
        let mut instructions = Vec::new();
        for instr in &routine.instructions {
            if let Some(vi) = validate_instruction(instr, &routine.name, &routine_names, options, bag) {
                instructions.push(vi);
            }
        }
        program.routines.push(ValidatedRoutine {
            name: routine.name.clone(),
            header_line: routine.header_line,
            instructions,
        });
    }
    program
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_instruction_is_rejected() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("_init:\n    BOGUS\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        assert!(program.routines[0].instructions.is_empty());
        assert_eq!(bag.error_count(), 1);
    }

    #[test]
    fn number_overload_preferred_before_item_overload() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("_init:\n    MOV C1, 5\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        assert!(!bag.has_errors());
        assert_eq!(program.routines[0].instructions[0].overload_index, 0);
        assert!(matches!(program.routines[0].instructions[0].operands[1], Operand::Number(5.0)));
    }

    #[test]
    fn arity_mismatch_is_argument_mismatch() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("_init:\n    ADD C1, C2, C3, C4\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        assert!(program.routines[0].instructions.is_empty());
        assert_eq!(bag.error_count(), 1);
        assert!(matches!(bag.iter().next().unwrap().kind, DiagnosticKind::ArgumentMismatch));
    }

    #[test]
    fn ioblock_text_argument_captures_embedded_commas_verbatim() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("_start:\n    NOP\n_init:\n    IOBLOCK _start, 0, go, there\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        let routine = program.routines.iter().find(|r| r.name == "_init").unwrap();
        let ioblock = &routine.instructions[0];
        match &ioblock.operands[2] {
            Operand::Str(s) => assert_eq!(s, "go, there"),
            other => panic!("expected Str operand, got {:?}", other),
        }
    }

    #[test]
    fn forward_reference_to_a_later_routine_resolves() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("_init:\n    SPAWN later\nlater:\n    NOP\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        assert!(!bag.has_errors());
        assert!(matches!(&program.routines[0].instructions[0].operands[0], Operand::RoutineRef(n) if n == "later"));
    }

    #[test]
    fn disallowed_here_still_records_an_instruction_but_flags_an_error() {
        let mut bag = DiagnosticBag::new();
        let lexed = lex("main:\n    MALLOC 4\n", 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        assert_eq!(program.routines[0].instructions.len(), 1);
        assert!(bag.has_errors());
    }
}
