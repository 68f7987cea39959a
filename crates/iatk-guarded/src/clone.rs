//! Cloning an automaton by replaying it through the builder.

use crate::automaton::GuardedAutomaton;
use crate::builder::GuardedBuilder;

/// Rebuild `automaton` under a new name by replaying every declaration,
/// action, transition and error flag through a fresh builder.
pub fn clone_with_name(name: impl Into<String>, automaton: &GuardedAutomaton) -> GuardedAutomaton {
    let mut builder = GuardedBuilder::new(name, automaton.initial().name());

    for decl in automaton.decls() {
        builder.add_decl(decl.clone());
    }
    for action in automaton.io_actions() {
        builder.add_action(action.clone());
    }
    for (_, state) in automaton.states() {
        for step in state.all_steps() {
            builder.add_transition(
                state.name(),
                automaton.state(step.dst).name(),
                step.action.clone(),
                step.pre.clone(),
                step.post.clone(),
            );
        }
    }
    for (_, state) in automaton.states() {
        if state.is_error() {
            builder.mark_error(state.name());
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iatk_core::Action;
    use iatk_expr::{Decl, Expr, Span};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn sample() -> GuardedAutomaton {
        let x = Arc::new(Decl::int("x"));
        let xv = Expr::var(x.clone(), false, Span::dummy());
        let xp = Expr::var(x.clone(), true, Span::dummy());
        let zero = Expr::const_int(0, Span::dummy());

        let mut builder = GuardedBuilder::new("sample", "s0");
        builder.add_decl(x);
        builder.add_transition(
            "s0",
            "s1",
            Action::input("a"),
            Expr::ge(xv.clone(), zero.clone()),
            Expr::gt(xp.clone(), xv.clone()),
        );
        builder.add_transition("s1", "s0", Action::output("b"), xv.clone(), xp);
        builder.add_transition("s1", "s2", Action::output("b"), zero.clone(), zero);
        builder.mark_error("s2");
        builder.build()
    }

    /// Step snapshots keyed by (src, action, pre, post, dst) names, so the
    /// comparison is independent of arena numbering.
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

    #[test]
    fn test_clone_is_idempotent() {
        let original = sample();
        let cloned = clone_with_name("copy", &original);

        assert_eq!(cloned.name(), "copy");
        assert_eq!(cloned.inputs(), original.inputs());
        assert_eq!(cloned.outputs(), original.outputs());
        assert_eq!(cloned.internals(), original.internals());
        assert_eq!(cloned.state_count(), original.state_count());
        assert_eq!(step_multiset(&cloned), step_multiset(&original));

        let names = |a: &GuardedAutomaton| -> BTreeSet<String> {
            a.states().map(|(_, s)| s.name().to_string()).collect()
        };
        assert_eq!(names(&cloned), names(&original));

        let errors = |a: &GuardedAutomaton| -> BTreeSet<String> {
            a.states()
                .filter(|(_, s)| s.is_error())
                .map(|(_, s)| s.name().to_string())
                .collect()
        };
        assert_eq!(errors(&cloned), errors(&original));

        // Re-cloning the clone changes nothing further.
        let recloned = clone_with_name("copy", &cloned);
        assert_eq!(step_multiset(&recloned), step_multiset(&cloned));
    }
}
