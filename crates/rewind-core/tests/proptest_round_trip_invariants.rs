#![forbid(unsafe_code)]

//! Property tests for [`CommandManager`] history invariants.
//!
//! Validates:
//! - N property sets undone N times restore the pre-sequence value.
//! - Every partial undo lands on the value set just before it.
//! - History depth always equals executed minus undone.
//! - Clear never touches the target.

use proptest::prelude::*;
use rewind_core::{CommandManager, ManagerConfig, SharedTarget, property, shared};

#[derive(Debug, Default, Clone, PartialEq)]
struct Form {
    age: i64,
    name: String,
}

fn quiet_manager() -> CommandManager {
    CommandManager::new(ManagerConfig::new("proptest").with_trace_commands(false))
}

fn age_of(form: &SharedTarget<Form>) -> i64 {
    form.lock().unwrap().age
}

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    SetAge(i64),
    SetName(String),
    Undo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::SetAge),
        2 => "[a-z]{0,8}".prop_map(Op::SetName),
        2 => Just(Op::Undo),
    ]
}

// ============================================================================
// Invariant 1: undoing everything restores the initial value
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_restores_initial_value(
        initial in any::<i64>(),
        values in prop::collection::vec(any::<i64>(), 0..40)
    ) {
        let mgr = quiet_manager();
        let form = shared(Form { age: initial, ..Form::default() });

        for v in &values {
            mgr.execute_set_property(&form, property!(Form, age), *v).unwrap();
        }
        prop_assert_eq!(mgr.count_of_commands_to_undo(), values.len());

        for _ in 0..values.len() {
            mgr.undo_previous_command().unwrap();
        }

        prop_assert_eq!(age_of(&form), initial);
        prop_assert!(!mgr.has_commands_to_undo());
    }
}

// ============================================================================
// Invariant 2: each undo lands on the previous value
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn each_undo_restores_previous_step(
        initial in any::<i64>(),
        values in prop::collection::vec(any::<i64>(), 1..30)
    ) {
        let mgr = quiet_manager();
        let form = shared(Form { age: initial, ..Form::default() });

        let mut seen = vec![initial];
        for v in &values {
            mgr.execute_set_property(&form, property!(Form, age), *v).unwrap();
            seen.push(*v);
        }

        for expected in seen.iter().rev().skip(1) {
            mgr.undo_previous_command().unwrap();
            prop_assert_eq!(age_of(&form), *expected);
        }
    }
}

// ============================================================================
// Invariant 3: depth tracks a reference stack under random interleaving
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_ops_match_reference_model(
        ops in prop::collection::vec(op_strategy(), 1..60)
    ) {
        let mgr = quiet_manager();
        let form = shared(Form::default());

        // Reference model: stack of full snapshots taken before each set.
        let mut model: Vec<Form> = Vec::new();

        for op in ops {
            match op {
                Op::SetAge(v) => {
                    model.push(form.lock().unwrap().clone());
                    mgr.execute_set_property(&form, property!(Form, age), v).unwrap();
                }
                Op::SetName(n) => {
                    model.push(form.lock().unwrap().clone());
                    mgr.execute_set_property(&form, property!(Form, name), n).unwrap();
                }
                Op::Undo => {
                    mgr.undo_previous_command().unwrap();
                    if let Some(before) = model.pop() {
                        prop_assert_eq!(&*form.lock().unwrap(), &before);
                    }
                }
            }
            prop_assert_eq!(mgr.count_of_commands_to_undo(), model.len());
            prop_assert_eq!(mgr.has_commands_to_undo(), !model.is_empty());
        }
    }
}

// ============================================================================
// Invariant 4: clear never reverts
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn clear_keeps_last_applied_value(
        values in prop::collection::vec(any::<i64>(), 1..20)
    ) {
        let mgr = quiet_manager();
        let form = shared(Form::default());
        for v in &values {
            mgr.execute_set_property(&form, property!(Form, age), *v).unwrap();
        }

        mgr.clear();

        prop_assert_eq!(mgr.count_of_commands_to_undo(), 0);
        prop_assert!(!mgr.has_commands_to_undo());
        prop_assert_eq!(age_of(&form), *values.last().unwrap());

        // Undo after clear is a no-op.
        mgr.undo_previous_command().unwrap();
        prop_assert_eq!(age_of(&form), *values.last().unwrap());
    }
}
