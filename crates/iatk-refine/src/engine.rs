//! The refinement engine: drives the traversal over (specification,
//! implementation) pairs and assembles the simulation graph.
//!
//! Inputs are driven by the specification, internal actions and outputs by
//! the implementation expanded through the specification's epsilon closure.

use crate::closure::EpsilonClosure;
use crate::family::find_families;
use crate::graph::{
    Atom, AttackLabel, FamilyStep, RefinementFamily, RefinementStep, SimGraph, SimId, SimState,
    SimStep, StrongSide,
};
use ahash::AHashMap;
use iatk_core::{io_compatible, traverse, Composite, Frontier, StateId};
use iatk_guarded::{GuardedAutomaton, GuardedStep};
use iatk_solver::{ConstraintOracle, OracleError};
use thiserror::Error;
use tracing::{debug, info};

/// Refinement failure. Alphabet incompatibility is detected before the
/// traversal starts; oracle failures abort it wherever they strike.
#[derive(Debug, Error)]
pub enum RefineError {
    #[error("alphabets are not input/output compatible: spec '{spec}', implementation '{implementation}'")]
    IncompatibleAlphabets {
        spec: String,
        implementation: String,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Worklist item: a graph state plus its canonical pair id.
struct Visit {
    sim: SimId,
    id: String,
}

impl Composite for Visit {
    fn canonical_id(&self) -> &str {
        &self.id
    }
}

/// Checks that every behavior of `implementation` is permitted by `spec`,
/// relative to the constraint oracle.
pub struct RefinementEngine<'a, O: ConstraintOracle> {
    oracle: &'a O,
    spec: &'a GuardedAutomaton,
    implementation: &'a GuardedAutomaton,
    closures: EpsilonClosure<'a>,
    states: Vec<SimState>,
    by_id: AHashMap<String, SimId>,
}

impl<'a, O: ConstraintOracle> RefinementEngine<'a, O> {
    pub fn new(
        oracle: &'a O,
        spec: &'a GuardedAutomaton,
        implementation: &'a GuardedAutomaton,
    ) -> Self {
        Self {
            oracle,
            spec,
            implementation,
            closures: EpsilonClosure::new(spec),
            states: Vec::new(),
            by_id: AHashMap::new(),
        }
    }

    /// Run the check and return the simulation graph.
    pub fn start(mut self) -> Result<SimGraph, RefineError> {
        let missing = self.oracle.missing_tools();
        if !missing.is_empty() {
            return Err(OracleError::MissingTools(missing).into());
        }
        if !io_compatible(
            self.spec.inputs(),
            self.spec.outputs(),
            self.implementation.inputs(),
            self.implementation.outputs(),
        ) {
            return Err(RefineError::IncompatibleAlphabets {
                spec: self.spec.name().to_string(),
                implementation: self.implementation.name().to_string(),
            });
        }

        let name = format!("{}_{}", self.implementation.name(), self.spec.name());
        info!(name = %name, "starting refinement check");

        let init = self.intern(
            Some(self.spec.initial_id()),
            Some(self.implementation.initial_id()),
        );
        let init_visit = Visit {
            sim: init,
            id: self.states[init.index()].id().to_string(),
        };
        traverse(init_visit, |visit, frontier| {
            let successors = self.expand(visit.sim)?;
            for sim in successors {
                frontier.push(Visit {
                    id: self.states[sim.index()].id().to_string(),
                    sim,
                });
            }
            Ok::<(), RefineError>(())
        })?;

        Ok(SimGraph::new(
            name,
            self.spec.name().to_string(),
            self.implementation.name().to_string(),
            self.states,
            init,
        ))
    }

    fn intern(&mut self, spec: Option<StateId>, implementation: Option<StateId>) -> SimId {
        let id = format!(
            "{}_{}",
            spec.map(|s| self.spec.state(s).name()).unwrap_or(""),
            implementation
                .map(|s| self.implementation.state(s).name())
                .unwrap_or("")
        );
        if let Some(&sim) = self.by_id.get(&id) {
            return sim;
        }
        let sim = SimId(self.states.len() as u32);
        self.states.push(SimState::new(id.clone(), spec, implementation));
        self.by_id.insert(id, sim);
        sim
    }

    fn state_mut(&mut self, sim: SimId) -> &mut SimState {
        &mut self.states[sim.index()]
    }

    /// Expand one pair; returns the composite states to enqueue.
    fn expand(&mut self, sim: SimId) -> Result<Vec<SimId>, RefineError> {
        let state = &self.states[sim.index()];
        let (Some(spec_id), Some(impl_id)) = (state.spec_component(), state.impl_component())
        else {
            // Incomplete pairs are error anchors with no behavior of their own.
            return Ok(Vec::new());
        };
        debug!(id = self.states[sim.index()].id(), "expanding refinement pair");

        let spec_state = self.spec.state(spec_id);
        let impl_state = self.implementation.state(impl_id);
        let mut successors = Vec::new();

        // Input actions, driven by the specification.
        for action in spec_state.input_actions() {
            let spec_steps = spec_state.steps(action);
            if impl_state.has_action(action) {
                let label = AttackLabel {
                    spec: Atom::input(action.name.clone()),
                    impl_side: Atom::input(action.name.clone()),
                    led_by: StrongSide::Spec,
                };
                for anchor in spec_steps {
                    let family_step = self.family_step(
                        StrongSide::Spec,
                        anchor,
                        impl_state.steps(action),
                        &mut successors,
                    )?;
                    self.state_mut(sim).add_family_step(label.clone(), family_step);
                }
            } else {
                // The implementation refuses an input the specification
                // demands: a single explicit error step.
                let label = AttackLabel {
                    spec: Atom::input(action.name.clone()),
                    impl_side: Atom::error(),
                    led_by: StrongSide::Spec,
                };
                let dst = self.intern(Some(spec_steps[0].dst), None);
                self.state_mut(sim).add_state_step(label, dst);
                successors.push(dst);
            }
        }

        let closure = self.closures.get(spec_id);

        // Internal actions, driven by the implementation, crossed with the
        // specification's epsilon closure.
        for action in impl_state.internal_actions() {
            let label = AttackLabel {
                spec: Atom::epsilon(),
                impl_side: Atom::internal(action.name.clone()),
                led_by: StrongSide::Impl,
            };
            for &closure_state in closure.iter() {
                for step in impl_state.steps(action) {
                    let dst = self.intern(Some(closure_state), Some(step.dst));
                    self.state_mut(sim).add_state_step(label.clone(), dst);
                    successors.push(dst);
                }
            }
        }

        // Output actions, driven by the implementation against the closure's
        // candidate steps.
        for action in impl_state.output_actions() {
            let impl_steps = impl_state.steps(action);
            let closure_steps: Vec<GuardedStep> = closure
                .iter()
                .flat_map(|&c| self.spec.state(c).steps(action).iter().cloned())
                .collect();
            if closure_steps.is_empty() {
                // No state of the closure offers the output at all.
                let label = AttackLabel {
                    spec: Atom::error(),
                    impl_side: Atom::output(action.name.clone()),
                    led_by: StrongSide::Impl,
                };
                let dst = self.intern(None, Some(impl_steps[0].dst));
                self.state_mut(sim).add_state_step(label, dst);
                successors.push(dst);
            } else {
                let label = AttackLabel {
                    spec: Atom::output(action.name.clone()),
                    impl_side: Atom::output(action.name.clone()),
                    led_by: StrongSide::Impl,
                };
                for anchor in impl_steps {
                    let family_step = self.family_step(
                        StrongSide::Impl,
                        anchor,
                        &closure_steps,
                        &mut successors,
                    )?;
                    self.state_mut(sim).add_family_step(label.clone(), family_step);
                }
            }
        }

        Ok(successors)
    }

    /// Run the family search for one anchor step and materialize the
    /// accepted families as graph records.
    ///
    /// `led` names the side the anchor belongs to; the members belong to the
    /// opposite, refined side.
    fn family_step(
        &mut self,
        led: StrongSide,
        anchor: &GuardedStep,
        candidates: &[GuardedStep],
        successors: &mut Vec<SimId>,
    ) -> Result<FamilyStep, RefineError> {
        let accepted = find_families(self.oracle, anchor, candidates)?;
        let strong = match led {
            StrongSide::Spec => StrongSide::Impl,
            StrongSide::Impl => StrongSide::Spec,
        };
        let (anchor_owner, member_owner) = match led {
            StrongSide::Spec => (self.spec, self.implementation),
            StrongSide::Impl => (self.implementation, self.spec),
        };

        let mut families = Vec::new();
        for subset in accepted {
            let mut members = Vec::new();
            for &index in &subset {
                let member = &candidates[index];
                let dst = match led {
                    StrongSide::Spec => self.intern(Some(anchor.dst), Some(member.dst)),
                    StrongSide::Impl => self.intern(Some(member.dst), Some(anchor.dst)),
                };
                successors.push(dst);
                members.push(RefinementStep {
                    step: snapshot(member, member_owner),
                    dst,
                });
            }
            families.push(RefinementFamily { strong, members });
        }

        Ok(FamilyStep {
            anchor: snapshot(anchor, anchor_owner),
            led,
            families,
        })
    }
}

/// Self-contained copy of a component step for the graph.
fn snapshot(step: &GuardedStep, owner: &GuardedAutomaton) -> SimStep {
    SimStep {
        action: step.action.clone(),
        pre: step.pre.clone(),
        post: step.post.clone(),
        dst: owner.state(step.dst).name().to_string(),
    }
}
