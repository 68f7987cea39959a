//! The simulation graph produced by refinement checking.

use iatk_core::{Action, StateId, TAU_SYMBOL};
use iatk_expr::Expr;
use std::fmt;

/// The side whose transitions are refined ("strong") within a family, and
/// the side leading an attack step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrongSide {
    Spec,
    Impl,
}

/// Classification of one side of an attack action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomKind {
    Input,
    Output,
    Internal,
    /// The side stays put while the other moves through internal steps.
    Epsilon,
    /// The side has no matching action at all.
    Error,
}

/// One side of an attack action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub name: String,
    pub kind: AtomKind,
}

impl Atom {
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AtomKind::Input,
        }
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AtomKind::Output,
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AtomKind::Internal,
        }
    }

    pub fn epsilon() -> Self {
        Self {
            name: String::new(),
            kind: AtomKind::Epsilon,
        }
    }

    pub fn error() -> Self {
        Self {
            name: String::new(),
            kind: AtomKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == AtomKind::Error
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AtomKind::Input => write!(f, "{}?", self.name),
            AtomKind::Output => write!(f, "{}!", self.name),
            AtomKind::Internal => write!(f, "{TAU_SYMBOL}"),
            AtomKind::Epsilon => write!(f, "\u{03B5}"),
            AtomKind::Error => write!(f, "error"),
        }
    }
}

/// An attack action: what the specification side and the implementation side
/// each contribute, and which side leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttackLabel {
    pub spec: Atom,
    pub impl_side: Atom,
    pub led_by: StrongSide,
}

impl AttackLabel {
    pub fn is_error(&self) -> bool {
        self.spec.is_error() || self.impl_side.is_error()
    }
}

impl fmt::Display for AttackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.spec, self.impl_side)
    }
}

/// Handle of a composite state within one [`SimGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimId(pub u32);

impl SimId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Snapshot of one component transition, self-contained for renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct SimStep {
    pub action: Action,
    pub pre: Expr,
    pub post: Expr,
    /// Destination state name in the owning automaton.
    pub dst: String,
}

/// One member of a family: a component step and the composite state it leads
/// to.
#[derive(Debug, Clone)]
pub struct RefinementStep {
    pub step: SimStep,
    pub dst: SimId,
}

/// A minimal set of peer steps that jointly discharge the anchor step.
#[derive(Debug, Clone)]
pub struct RefinementFamily {
    /// The refined side the members belong to.
    pub strong: StrongSide,
    pub members: Vec<RefinementStep>,
}

/// One anchor step with every minimal valid defence family found for it.
/// An empty family list means the defence failed.
#[derive(Debug, Clone)]
pub struct FamilyStep {
    pub anchor: SimStep,
    /// The side the anchor step belongs to.
    pub led: StrongSide,
    pub families: Vec<RefinementFamily>,
}

impl FamilyStep {
    pub fn has_no_families(&self) -> bool {
        self.families.is_empty()
    }
}

/// All results recorded for one attack action at one composite state.
#[derive(Debug, Clone)]
pub struct AttackOption {
    pub label: AttackLabel,
    /// Direct destinations: internal moves, or the error anchor of a
    /// missing action.
    pub state_steps: Vec<SimId>,
    pub family_steps: Vec<FamilyStep>,
}

impl AttackOption {
    fn new(label: AttackLabel) -> Self {
        Self {
            label,
            state_steps: Vec::new(),
            family_steps: Vec::new(),
        }
    }

    /// Every destination reachable through this option.
    pub fn destinations(&self) -> impl Iterator<Item = SimId> + '_ {
        self.state_steps.iter().copied().chain(
            self.family_steps
                .iter()
                .flat_map(|fs| fs.families.iter())
                .flat_map(|family| family.members.iter().map(|m| m.dst)),
        )
    }
}

/// A reachable composite pair. Either side may be absent, denoting the
/// anchor of a missing-action error.
#[derive(Debug)]
pub struct SimState {
    id: String,
    spec: Option<StateId>,
    impl_state: Option<StateId>,
    options: Vec<AttackOption>,
}

impl SimState {
    pub(crate) fn new(id: String, spec: Option<StateId>, impl_state: Option<StateId>) -> Self {
        Self {
            id,
            spec,
            impl_state,
            options: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spec_component(&self) -> Option<StateId> {
        self.spec
    }

    pub fn impl_component(&self) -> Option<StateId> {
        self.impl_state
    }

    /// A pair missing one side cannot defend anything.
    pub fn is_incomplete(&self) -> bool {
        self.spec.is_none() || self.impl_state.is_none()
    }

    pub fn options(&self) -> &[AttackOption] {
        &self.options
    }

    fn option_mut(&mut self, label: AttackLabel) -> &mut AttackOption {
        let pos = match self.options.iter().position(|o| o.label == label) {
            Some(pos) => pos,
            None => {
                self.options.push(AttackOption::new(label));
                self.options.len() - 1
            }
        };
        &mut self.options[pos]
    }

    pub(crate) fn add_state_step(&mut self, label: AttackLabel, dst: SimId) {
        self.option_mut(label).state_steps.push(dst);
    }

    pub(crate) fn add_family_step(&mut self, label: AttackLabel, family_step: FamilyStep) {
        self.option_mut(label).family_steps.push(family_step);
    }
}

/// The refinement result: every visited composite pair with its options.
#[derive(Debug)]
pub struct SimGraph {
    name: String,
    spec_name: String,
    impl_name: String,
    states: Vec<SimState>,
    init: SimId,
}

impl SimGraph {
    pub(crate) fn new(
        name: String,
        spec_name: String,
        impl_name: String,
        states: Vec<SimState>,
        init: SimId,
    ) -> Self {
        Self {
            name,
            spec_name,
            impl_name,
            states,
            init,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec_name(&self) -> &str {
        &self.spec_name
    }

    pub fn impl_name(&self) -> &str {
        &self.impl_name
    }

    pub fn init_id(&self) -> SimId {
        self.init
    }

    pub fn state(&self, id: SimId) -> &SimState {
        &self.states[id.index()]
    }

    pub fn states(&self) -> impl Iterator<Item = (SimId, &SimState)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (SimId(i as u32), s))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn find(&self, id: &str) -> Option<SimId> {
        self.states
            .iter()
            .position(|s| s.id() == id)
            .map(|i| SimId(i as u32))
    }
}
