//! Incremental, deduplicating construction of guarded automata.

use crate::automaton::{GuardedAutomaton, GuardedState, GuardedStep};
use ahash::{AHashMap, AHashSet};
use iatk_core::{Action, ActionKind, StateId};
use iatk_expr::{Decl, Expr};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::trace;

/// Builds a [`GuardedAutomaton`] from a stream of transition insertions.
///
/// States are created on first reference; re-adding an existing action,
/// declaration or state is a no-op. `build` partitions the accumulated
/// actions by kind and freezes all collections.
pub struct GuardedBuilder {
    name: String,
    states: Vec<GuardedState>,
    by_name: AHashMap<String, StateId>,
    actions: BTreeMap<String, Action>,
    decls: Vec<Arc<Decl>>,
    decl_names: AHashSet<String>,
    init: StateId,
}

impl GuardedBuilder {
    pub fn new(name: impl Into<String>, init_name: &str) -> Self {
        let mut builder = Self {
            name: name.into(),
            states: Vec::new(),
            by_name: AHashMap::new(),
            actions: BTreeMap::new(),
            decls: Vec::new(),
            decl_names: AHashSet::new(),
            init: StateId(0),
        };
        builder.init = builder.insert_state(init_name, true);
        builder
    }

    /// Register an action. The first kind registered for a name wins.
    pub fn add_action(&mut self, action: Action) {
        self.actions.entry(action.name.clone()).or_insert(action);
    }

    /// Register a declaration. The first occurrence of a name wins.
    pub fn add_decl(&mut self, decl: Arc<Decl>) {
        if self.decl_names.insert(decl.name.clone()) {
            self.decls.push(decl);
        }
    }

    /// Add a transition, creating endpoint states on first reference.
    pub fn add_transition(&mut self, src: &str, dst: &str, action: Action, pre: Expr, post: Expr) {
        trace!(src, dst, action = %action, "add transition");
        let src_id = self.state_id(src);
        let dst_id = self.state_id(dst);
        self.add_action(action.clone());
        self.states[src_id.index()].add_step(GuardedStep {
            pre,
            action,
            post,
            dst: dst_id,
        });
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
        self.states.push(GuardedState::new(name, is_initial));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Freeze the accumulated automaton.
    pub fn build(self) -> GuardedAutomaton {
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
        GuardedAutomaton::new(
            self.name,
            inputs,
            outputs,
            internals,
            self.states,
            self.by_name,
            self.init,
            self.decls,
        )
    }
}
