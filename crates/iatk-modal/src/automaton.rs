//! Arena representation of a modal automaton.

use ahash::AHashMap;
use iatk_core::{Action, ActionKind, StateId};
use std::collections::{BTreeMap, BTreeSet};

/// A must transition: satisfying any one destination of the disjunctive set
/// discharges the obligation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustStep {
    pub action: Action,
    pub dsts: Vec<StateId>,
}

/// A may transition with a single destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MayStep {
    pub dst: StateId,
}

/// A modal state. Must/may membership is tracked per action kind so
/// composition-rule lookups and rendering can tell the strengths apart.
#[derive(Debug, Clone)]
pub struct ModalState {
    name: String,
    is_initial: bool,
    is_error: bool,
    inputs: BTreeSet<Action>,
    outputs: BTreeSet<Action>,
    internals: BTreeSet<Action>,
    must_strength: BTreeSet<Action>,
    may_strength: BTreeSet<Action>,
    must: BTreeMap<Action, Vec<MustStep>>,
    may: BTreeMap<Action, Vec<MayStep>>,
}

impl ModalState {
    pub(crate) fn new(name: impl Into<String>, is_initial: bool) -> Self {
        Self {
            name: name.into(),
            is_initial,
            is_error: false,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            internals: BTreeSet::new(),
            must_strength: BTreeSet::new(),
            may_strength: BTreeSet::new(),
            must: BTreeMap::new(),
            may: BTreeMap::new(),
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

    /// Does this state offer the action at any strength?
    pub fn has_action(&self, action: &Action) -> bool {
        self.must.contains_key(action) || self.may.contains_key(action)
    }

    /// Is the action offered as a must transition here?
    pub fn offers_must(&self, action: &Action) -> bool {
        self.must_strength.contains(action)
    }

    /// Is the action offered as a may transition here?
    pub fn offers_may(&self, action: &Action) -> bool {
        self.may_strength.contains(action)
    }

    pub fn must_steps(&self, action: &Action) -> &[MustStep] {
        self.must.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn may_steps(&self, action: &Action) -> &[MayStep] {
        self.may.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_must_steps(&self) -> impl Iterator<Item = &MustStep> {
        self.must.values().flatten()
    }

    pub fn all_may_steps(&self) -> impl Iterator<Item = (&Action, &MayStep)> {
        self.may
            .iter()
            .flat_map(|(action, steps)| steps.iter().map(move |s| (action, s)))
    }

    /// Every destination offered for the action, must disjuncts flattened
    /// before may destinations.
    pub fn destinations(&self, action: &Action) -> Vec<StateId> {
        let mut dsts: Vec<StateId> = self
            .must_steps(action)
            .iter()
            .flat_map(|s| s.dsts.iter().copied())
            .collect();
        dsts.extend(self.may_steps(action).iter().map(|s| s.dst));
        dsts
    }

    pub(crate) fn add_must(&mut self, action: Action, dsts: Vec<StateId>) {
        self.register(&action, false);
        self.must.entry(action.clone()).or_default().push(MustStep { action, dsts });
    }

    pub(crate) fn add_may(&mut self, action: Action, dst: StateId) {
        self.register(&action, true);
        self.may.entry(action).or_default().push(MayStep { dst });
    }

    fn register(&mut self, action: &Action, is_may: bool) {
        if is_may {
            self.may_strength.insert(action.clone());
        } else {
            self.must_strength.insert(action.clone());
        }
        match action.kind {
            ActionKind::Input => self.inputs.insert(action.clone()),
            ActionKind::Output => self.outputs.insert(action.clone()),
            ActionKind::Internal => self.internals.insert(action.clone()),
        };
    }
}

/// An immutable modal automaton. Modal automata carry no shared-variable
/// declarations.
#[derive(Debug, Clone)]
pub struct ModalAutomaton {
    name: String,
    inputs: BTreeSet<Action>,
    outputs: BTreeSet<Action>,
    internals: BTreeSet<Action>,
    states: Vec<ModalState>,
    by_name: AHashMap<String, StateId>,
    init: StateId,
}

impl ModalAutomaton {
    pub(crate) fn new(
        name: String,
        inputs: BTreeSet<Action>,
        outputs: BTreeSet<Action>,
        internals: BTreeSet<Action>,
        states: Vec<ModalState>,
        by_name: AHashMap<String, StateId>,
        init: StateId,
    ) -> Self {
        Self {
            name,
            inputs,
            outputs,
            internals,
            states,
            by_name,
            init,
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

    pub fn io_actions(&self) -> impl Iterator<Item = &Action> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn initial_id(&self) -> StateId {
        self.init
    }

    pub fn initial(&self) -> &ModalState {
        self.state(self.init)
    }

    pub fn state(&self, id: StateId) -> &ModalState {
        &self.states[id.index()]
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &ModalState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId(i as u32), s))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}
