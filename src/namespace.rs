//! Namespace builder (spec §4.3): assigns each declared routine its
//! `group_id` in declaration order, drops empty routines with a warning
//! (their numeric slot stays consumed so later routines don't shift
//! down), and records each surviving group's instruction count for the
//! compare/fork emitters' helper-spawn-indirection decision.
//!
//! Grounded in the reference implementation's `determine_groups`, which
//! assigns `group_id = declaration_index` over every routine header
//! before any get dropped. The JSON-serializable result type lives in
//! the separate [`tasm_namespace`] crate, whose narrower job is the
//! interchange format an external interpreter consumes; this module is
//! the one piece of compiler logic that builds it.

use std::collections::HashMap;

use tasm_namespace::{Namespace, NamespaceInstruction, NamespaceRoutine};

use crate::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticKind};
use crate::validate::ValidatedProgram;

/// A routine with its assigned group id, ready for the output
/// assembler. Routines the builder dropped as empty are not present
/// here — their `group_id` is still skipped over since `next_free`
/// (the auxiliary-group cursor) starts counting after every *declared*
/// routine, not just the surviving ones.
#[derive(Clone, Debug)]
pub struct BuiltRoutine {
    pub name: String,
    pub group_id: i32,
    pub instructions: Vec<crate::validate::ValidatedInstruction>,
}

#[derive(Clone, Debug, Default)]
pub struct BuiltNamespace {
    pub routines: Vec<BuiltRoutine>,
    /// group_id -> surviving instruction count, consulted by
    /// compare/fork emitters via `EmitArgs::lengths`.
    pub lengths: HashMap<i32, usize>,
    /// One past the highest group id any declared routine claimed —
    /// where the output assembler's auxiliary-group cursor starts.
    pub next_free_group: i32,
}

/// Builds the namespace from a validated program, emitting `EmptyRoutine`
/// and `MissingStart` diagnostics as warnings (non-fatal: spec §7 only
/// treats these as warnings, never errors).
pub fn build(program: &ValidatedProgram, bag: &mut DiagnosticBag) -> BuiltNamespace {
    let mut result = BuiltNamespace::default();

    for (group_id, routine) in program.routines.iter().enumerate() {
        let group_id = group_id as i32;
        if routine.instructions.is_empty() {
            bag.push(Diagnostic::warning(
                DiagnosticKind::EmptyRoutine,
                routine.header_line,
                routine.name.clone(),
                format!("Routine '{}' has no instructions and was dropped.", routine.name),
            ));
            continue;
        }
        result.lengths.insert(group_id, routine.instructions.len());
        result.routines.push(BuiltRoutine {
            name: routine.name.clone(),
            group_id,
            instructions: routine.instructions.clone(),
        });
    }

    result.next_free_group = program.routines.len() as i32;

    if !result.routines.iter().any(|r| r.name == "_start") {
        bag.push(Diagnostic::warning(
            DiagnosticKind::MissingStart,
            0,
            "",
            "No '_start' routine was declared; the compiled program has no entrypoint.",
        ));
    }

    result
}

/// Looks up a surviving routine's assigned group id by name, for
/// resolving `RoutineRef`/`Group` operands before emission.
impl BuiltNamespace {
    pub fn group_id_of(&self, name: &str) -> Option<i32> {
        self.routines.iter().find(|r| r.name == name).map(|r| r.group_id)
    }
}

/// Converts a built namespace into the JSON-serializable interchange
/// form (`--show-namespace`/`--interpret`), rendering each typed
/// [`crate::types::Operand`] back to its source-like textual form.
pub fn to_interchange(built: &BuiltNamespace) -> Namespace {
    let mut ns = Namespace::new();
    for routine in &built.routines {
        let instructions = routine
            .instructions
            .iter()
            .map(|vi| NamespaceInstruction {
                mnemonic: vi.mnemonic.clone(),
                args: vi.operands.iter().map(|op| op.to_string()).collect(),
            })
            .collect();
        ns.push(routine.name.clone(), NamespaceRoutine { group: routine.group_id, instructions });
    }
    ns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompileOptions;
    use crate::lexer::lex;
    use crate::validate::validate;
    use pretty_assertions::assert_eq;

    fn build_from_source(src: &str) -> (BuiltNamespace, DiagnosticBag) {
        let mut bag = DiagnosticBag::new();
        let lexed = lex(src, 9998, 9999, &mut bag);
        let options = CompileOptions::default();
        let program = validate(&lexed, &options, &mut bag);
        let built = build(&program, &mut bag);
        (built, bag)
    }

    #[test]
    fn assigns_group_ids_in_declaration_order() {
        let (built, _bag) = build_from_source("_init:\n    MALLOC 4\n_start:\n    NOP\n");
        assert_eq!(built.group_id_of("_init"), Some(0));
        assert_eq!(built.group_id_of("_start"), Some(1));
        assert_eq!(built.next_free_group, 2);
    }

    #[test]
    fn empty_routine_is_dropped_but_its_slot_is_still_consumed() {
        let (built, bag) = build_from_source("empty:\n_init:\n    MALLOC 4\n_start:\n    NOP\n");
        assert!(built.group_id_of("empty").is_none());
        // `_init` still gets group 1, not 0, even though `empty` was dropped.
        assert_eq!(built.group_id_of("_init"), Some(1));
        assert_eq!(built.group_id_of("_start"), Some(2));
        assert_eq!(built.next_free_group, 3);
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::EmptyRoutine)));
    }

    #[test]
    fn missing_start_routine_is_a_warning_not_an_error() {
        let (_built, bag) = build_from_source("_init:\n    MALLOC 4\n");
        assert!(bag.iter().any(|d| matches!(d.kind, DiagnosticKind::MissingStart)));
        assert!(!bag.has_errors());
    }

    #[test]
    fn lengths_map_counts_surviving_instructions_per_group() {
        let (built, _bag) = build_from_source("_start:\n    NOP\n    NOP\n");
        assert_eq!(built.lengths.get(&0), Some(&2));
    }

    #[test]
    fn interchange_form_preserves_group_assignment_and_renders_operands() {
        let (built, _bag) = build_from_source("_init:\n    MOV C1, 5\n_start:\n    NOP\n");
        let ns = to_interchange(&built);
        let routine = ns.get("_init").unwrap();
        assert_eq!(routine.group, 0);
        assert_eq!(routine.instructions[0].mnemonic, "MOV");
        assert_eq!(routine.instructions[0].args, vec!["C1".to_string(), "5".to_string()]);
    }
}
