//! Incremental, deduplicating construction of modal automata.

use crate::automaton::{ModalAutomaton, ModalState};
use ahash::AHashMap;
use iatk_core::{Action, ActionKind, StateId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Builds a [`ModalAutomaton`]. States are created on first reference and
/// re-adds are idempotent, mirroring the guarded builder contract.
pub struct ModalBuilder {
    name: String,
    states: Vec<ModalState>,
    by_name: AHashMap<String, StateId>,
    actions: BTreeMap<String, Action>,
    init: StateId,
}

impl ModalBuilder {
    pub fn new(name: impl Into<String>, init_name: &str) -> Self {
        let mut builder = Self {
            name: name.into(),
            states: Vec::new(),
            by_name: AHashMap::new(),
            actions: BTreeMap::new(),
            init: StateId(0),
        };
        builder.init = builder.insert_state(init_name, true);
        builder
    }

    pub fn add_action(&mut self, action: Action) {
        self.actions.entry(action.name.clone()).or_insert(action);
    }

    /// Add a must transition with its disjunctive destination set.
    pub fn add_must_transition(&mut self, src: &str, action: Action, dsts: &[&str]) {
        trace!(src, action = %action, ?dsts, "add must transition");
        self.add_action(action.clone());
        let dst_ids: Vec<StateId> = dsts.iter().map(|d| self.state_id(d)).collect();
        let src_id = self.state_id(src);
        self.states[src_id.index()].add_must(action, dst_ids);
    }

    /// Add a may transition with a single destination.
    pub fn add_may_transition(&mut self, src: &str, action: Action, dst: &str) {
        trace!(src, action = %action, dst, "add may transition");
        self.add_action(action.clone());
        let dst_id = self.state_id(dst);
        let src_id = self.state_id(src);
        self.states[src_id.index()].add_may(action, dst_id);
    }

    /// Flag a state as an error state. Unknown names are ignored.
    pub fn mark_error(&mut self, state: &str) {
        if let Some(&id) = self.by_name.get(state) {
            self.states[id.index()].set_error();
        }
    }

    fn state_id(&mut self, name: &str) -> StateId {
        match self.by_name.get(name) {
            Some(&id) => id,
            None => self.insert_state(name, false),
        }
    }

    fn insert_state(&mut self, name: &str, is_initial: bool) -> StateId {
        let id = StateId(self.states.len() as u32);
        self.states.push(ModalState::new(name, is_initial));
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn build(self) -> ModalAutomaton {
        let mut inputs = BTreeSet::new();
        let mut outputs = BTreeSet::new();
        let mut internals = BTreeSet::new();
        for action in self.actions.into_values() {
            match action.kind {
                ActionKind::Input => inputs.insert(action),
                ActionKind::Output => outputs.insert(action),
                ActionKind::Internal => internals.insert(action),
            };
        }
        ModalAutomaton::new(
            self.name,
            inputs,
            outputs,
            internals,
            self.states,
            self.by_name,
            self.init,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_destinations_are_disjunctive() {
        let mut builder = ModalBuilder::new("m", "s0");
        builder.add_must_transition("s0", Action::output("a"), &["d1", "d2"]);
        let automaton = builder.build();

        let steps = automaton.initial().must_steps(&Action::output("a"));
        assert_eq!(steps.len(), 1);
        let names: Vec<&str> = steps[0]
            .dsts
            .iter()
            .map(|&id| automaton.state(id).name())
            .collect();
        assert_eq!(names, vec!["d1", "d2"]);
    }

    #[test]
    fn test_strength_tracked_per_action() {
        let mut builder = ModalBuilder::new("m", "s0");
        builder.add_must_transition("s0", Action::input("a"), &["s1"]);
        builder.add_may_transition("s0", Action::output("b"), "s2");
        let automaton = builder.build();

        let init = automaton.initial();
        assert!(init.offers_must(&Action::input("a")));
        assert!(!init.offers_may(&Action::input("a")));
        assert!(init.offers_may(&Action::output("b")));
        assert!(!init.offers_must(&Action::output("b")));
    }

    #[test]
    fn test_action_partitioning_and_idempotence() {
        let mut builder = ModalBuilder::new("m", "s0");
        builder.add_action(Action::input("a"));
        builder.add_action(Action::input("a"));
        builder.add_may_transition("s0", Action::internal("step"), "s1");
        let automaton = builder.build();

        assert_eq!(automaton.inputs().len(), 1);
        assert_eq!(automaton.internals().len(), 1);
        assert!(automaton.outputs().is_empty());
        assert_eq!(automaton.state_count(), 2);
    }
}
