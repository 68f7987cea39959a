//! Property: replaying any automaton through the builder reproduces it, and
//! product construction is deterministic.

use iatk_core::Action;
use iatk_expr::{Decl, Expr, Span};
use iatk_guarded::{clone_with_name, GuardedAutomaton, GuardedBuilder};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

const STATES: [&str; 4] = ["s0", "s1", "s2", "s3"];

fn action_pool(choice: u8) -> Action {
    // Fixed name→kind assignment keeps every generated alphabet partitioned.
    match choice % 4 {
        0 => Action::input("a"),
        1 => Action::output("b"),
        2 => Action::internal("w"),
        _ => Action::input("d"),
    }
}

fn guard_pool(choice: u8) -> Expr {
    let x = Arc::new(Decl::int("x"));
    match choice % 3 {
        0 => Expr::const_bool(true, Span::dummy()),
        1 => Expr::gt(Expr::var(x, false, Span::dummy()), Expr::const_int(0, Span::dummy())),
        _ => Expr::eq(
            Expr::var(x.clone(), true, Span::dummy()),
            Expr::add(Expr::var(x, false, Span::dummy()), Expr::const_int(1, Span::dummy())),
        ),
    }
}

fn arb_automaton() -> impl Strategy<Value = GuardedAutomaton> {
    let transitions = proptest::collection::vec(
        (0usize..4, 0usize..4, any::<u8>(), any::<u8>(), any::<u8>()),
        0..12,
    );
    let errors = proptest::collection::btree_set(0usize..4, 0..3);
    (transitions, errors).prop_map(|(transitions, errors)| {
        let mut builder = GuardedBuilder::new("gen", STATES[0]);
        builder.add_decl(Arc::new(Decl::int("x")));
        for (src, dst, action, pre, post) in transitions {
            builder.add_transition(
                STATES[src],
                STATES[dst],
                action_pool(action),
                guard_pool(pre),
                guard_pool(post),
            );
        }
        for error in errors {
            builder.mark_error(STATES[error]);
        }
        builder.build()
    })
}

fn step_multiset(automaton: &GuardedAutomaton) -> Vec<String> {
    let mut steps: Vec<String> = automaton
        .states()
        .flat_map(|(_, state)| {
            state.all_steps().map(move |step| {
                format!(
                    "{} -{}[{} / {}]-> {}",
                    state.name(),
                    step.action,
                    step.pre,
                    step.post,
                    automaton.state(step.dst).name()
                )
            })
        })
        .collect();
    steps.sort();
    steps
}

fn error_names(automaton: &GuardedAutomaton) -> BTreeSet<String> {
    automaton
        .states()
        .filter(|(_, s)| s.is_error())
        .map(|(_, s)| s.name().to_string())
        .collect()
}

proptest! {
    #[test]
    fn clone_by_replay_reproduces_the_automaton(original in arb_automaton()) {
        let cloned = clone_with_name("gen", &original);
        prop_assert_eq!(cloned.inputs(), original.inputs());
        prop_assert_eq!(cloned.outputs(), original.outputs());
        prop_assert_eq!(cloned.internals(), original.internals());
        prop_assert_eq!(cloned.state_count(), original.state_count());
        prop_assert_eq!(step_multiset(&cloned), step_multiset(&original));
        prop_assert_eq!(error_names(&cloned), error_names(&original));
    }
}
