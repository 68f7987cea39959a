//! Epsilon closure over internal transitions, memoized per state.

use ahash::AHashMap;
use iatk_core::StateId;
use iatk_guarded::GuardedAutomaton;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// The set of states reachable via zero or more internal transitions.
pub struct EpsilonClosure<'a> {
    automaton: &'a GuardedAutomaton,
    cache: AHashMap<StateId, Arc<Vec<StateId>>>,
}

impl<'a> EpsilonClosure<'a> {
    pub fn new(automaton: &'a GuardedAutomaton) -> Self {
        Self {
            automaton,
            cache: AHashMap::new(),
        }
    }

    /// Closure of `state`, including the state itself, in arena order.
    pub fn get(&mut self, state: StateId) -> Arc<Vec<StateId>> {
        if let Some(cached) = self.cache.get(&state) {
            return cached.clone();
        }

        let mut seen: BTreeSet<StateId> = BTreeSet::new();
        let mut queue = VecDeque::new();
        seen.insert(state);
        queue.push_back(state);
        while let Some(current) = queue.pop_front() {
            let st = self.automaton.state(current);
            for action in st.internal_actions() {
                for step in st.steps(action) {
                    if seen.insert(step.dst) {
                        queue.push_back(step.dst);
                    }
                }
            }
        }

        let closure = Arc::new(seen.into_iter().collect::<Vec<_>>());
        self.cache.insert(state, closure.clone());
        closure
    }
}
