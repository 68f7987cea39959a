//! Arena representation of a guarded-transition automaton.

use ahash::AHashMap;
use iatk_core::{Action, ActionKind, StateId};
use iatk_expr::{Decl, Expr};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// One guarded transition: precondition, action, postcondition, destination.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedStep {
    pub pre: Expr,
    pub action: Action,
    pub post: Expr,
    pub dst: StateId,
}

/// A state with its outgoing adjacency, keyed by action for deterministic
/// iteration. A state may hold many steps per action.
#[derive(Debug, Clone)]
pub struct GuardedState {
    name: String,
    is_initial: bool,
    is_error: bool,
    inputs: BTreeSet<Action>,
    outputs: BTreeSet<Action>,
    internals: BTreeSet<Action>,
    steps: BTreeMap<Action, Vec<GuardedStep>>,
}

impl GuardedState {
    pub(crate) fn new(name: impl Into<String>, is_initial: bool) -> Self {
        Self {
            name: name.into(),
            is_initial,
            is_error: false,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            internals: BTreeSet::new(),
            steps: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub(crate) fn set_error(&mut self) {
        self.is_error = true;
    }

    pub fn input_actions(&self) -> &BTreeSet<Action> {
        &self.inputs
    }

    pub fn output_actions(&self) -> &BTreeSet<Action> {
        &self.outputs
    }

    pub fn internal_actions(&self) -> &BTreeSet<Action> {
        &self.internals
    }

    /// All actions this state offers, inputs first.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.internals.iter())
    }

    pub fn has_action(&self, action: &Action) -> bool {
        self.steps.contains_key(action)
    }

    /// Outgoing steps for one action, empty if the state does not offer it.
    pub fn steps(&self, action: &Action) -> &[GuardedStep] {
        self.steps.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All outgoing steps in action order.
    pub fn all_steps(&self) -> impl Iterator<Item = &GuardedStep> {
        self.steps.values().flatten()
    }

    pub(crate) fn add_step(&mut self, step: GuardedStep) {
        match step.action.kind {
            ActionKind::Input => {
                self.inputs.insert(step.action.clone());
            }
            ActionKind::Output => {
                self.outputs.insert(step.action.clone());
            }
            ActionKind::Internal => {
                self.internals.insert(step.action.clone());
            }
        }
        self.steps.entry(step.action.clone()).or_default().push(step);
    }
}

/// An immutable guarded-transition automaton. States live in an arena and
/// reference each other through [`StateId`] handles.
#[derive(Debug, Clone)]
pub struct GuardedAutomaton {
    name: String,
    inputs: BTreeSet<Action>,
    outputs: BTreeSet<Action>,
    internals: BTreeSet<Action>,
    states: Vec<GuardedState>,
    by_name: AHashMap<String, StateId>,
    init: StateId,
    decls: Vec<Arc<Decl>>,
}

impl GuardedAutomaton {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        inputs: BTreeSet<Action>,
        outputs: BTreeSet<Action>,
        internals: BTreeSet<Action>,
        states: Vec<GuardedState>,
        by_name: AHashMap<String, StateId>,
        init: StateId,
        decls: Vec<Arc<Decl>>,
    ) -> Self {
        Self {
            name,
            inputs,
            outputs,
            internals,
            states,
            by_name,
            init,
            decls,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeSet<Action> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeSet<Action> {
        &self.outputs
    }

    pub fn internals(&self) -> &BTreeSet<Action> {
        &self.internals
    }

    /// Input and output actions, the alphabet relevant to composition.
    pub fn io_actions(&self) -> impl Iterator<Item = &Action> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn decls(&self) -> &[Arc<Decl>] {
        &self.decls
    }

    pub fn initial_id(&self) -> StateId {
        self.init
    }

    pub fn initial(&self) -> &GuardedState {
        self.state(self.init)
    }

    pub fn state(&self, id: StateId) -> &GuardedState {
        &self.states[id.index()]
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &GuardedState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId(i as u32), s))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}
