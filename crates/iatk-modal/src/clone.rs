//! Cloning a modal automaton by replaying it through the builder.

use crate::automaton::ModalAutomaton;
use crate::builder::ModalBuilder;

/// Rebuild `automaton` under a new name by replaying every action,
/// transition and error flag through a fresh builder.
pub fn clone_with_name(name: impl Into<String>, automaton: &ModalAutomaton) -> ModalAutomaton {
    let mut builder = ModalBuilder::new(name, automaton.initial().name());

    for action in automaton.io_actions() {
        builder.add_action(action.clone());
    }
    for (_, state) in automaton.states() {
        for step in state.all_must_steps() {
            let dsts: Vec<&str> = step
                .dsts
                .iter()
                .map(|&id| automaton.state(id).name())
                .collect();
            builder.add_must_transition(state.name(), step.action.clone(), &dsts);
        }
        for (action, step) in state.all_may_steps() {
            builder.add_may_transition(
                state.name(),
                action.clone(),
                automaton.state(step.dst).name(),
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

    #[test]
    fn test_clone_preserves_structure_and_flags() {
        let mut builder = ModalBuilder::new("m", "s0");
        builder.add_must_transition("s0", Action::output("a"), &["d1", "d2"]);
        builder.add_may_transition("s0", Action::input("b"), "d1");
        builder.add_may_transition("d1", Action::internal("w"), "s0");
        builder.mark_error("d2");
        let original = builder.build();

        let cloned = clone_with_name("copy", &original);
        assert_eq!(cloned.name(), "copy");
        assert_eq!(cloned.inputs(), original.inputs());
        assert_eq!(cloned.outputs(), original.outputs());
        assert_eq!(cloned.internals(), original.internals());
        assert_eq!(cloned.state_count(), original.state_count());

        let d2 = cloned.state_id("d2").unwrap();
        assert!(cloned.state(d2).is_error());

        let steps = cloned.initial().must_steps(&Action::output("a"));
        assert_eq!(steps.len(), 1);
        let names: Vec<&str> = steps[0]
            .dsts
            .iter()
            .map(|&id| cloned.state(id).name())
            .collect();
        assert_eq!(names, vec!["d1", "d2"]);
        assert_eq!(cloned.initial().may_steps(&Action::input("b")).len(), 1);
    }
}
