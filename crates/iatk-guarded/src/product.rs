//! Parallel product of two guarded automata.
//!
//! Shared actions synchronize an output of one side with the inputs of the
//! other; the constraint oracle validates each synchronization pair. Failed
//! validations flag error states but never abort the pass, so one traversal
//! discovers every reachable error.

use crate::automaton::{GuardedAutomaton, GuardedStep};
use crate::builder::GuardedBuilder;
use iatk_core::{
    guarded_composable, shared_io_names, traverse, Action, ComposeError, Composite, Frontier,
    StateId,
};
use iatk_expr::Expr;
use iatk_solver::{ConstraintOracle, OracleError};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

/// Guarded product failure. Both variants are detected before or during
/// construction and abort the whole operation.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// A composite state of the product: one component per input automaton.
struct ProductPair {
    left: StateId,
    right: StateId,
    id: String,
}

impl Composite for ProductPair {
    fn canonical_id(&self) -> &str {
        &self.id
    }
}

/// Which side of the pair owns the output of a shared synchronization.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// The guarded product engine. `build` consumes the two automata read-only
/// and emits a fresh automaton through the builder.
pub struct GuardedProduct<'a, O: ConstraintOracle> {
    oracle: &'a O,
    left: &'a GuardedAutomaton,
    right: &'a GuardedAutomaton,
    name: String,
    diagnostics: Vec<String>,
}

impl<'a, O: ConstraintOracle> GuardedProduct<'a, O> {
    pub fn new(
        oracle: &'a O,
        left: &'a GuardedAutomaton,
        right: &'a GuardedAutomaton,
        name: impl Into<String>,
    ) -> Self {
        Self {
            oracle,
            left,
            right,
            name: name.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Messages describing every error state flagged during the last build.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn build(&mut self) -> Result<GuardedAutomaton, ProductError> {
        let missing = self.oracle.missing_tools();
        if !missing.is_empty() {
            return Err(OracleError::MissingTools(missing).into());
        }

        let (left, right) = (self.left, self.right);
        if !guarded_composable(left.inputs(), left.outputs(), right.inputs(), right.outputs()) {
            return Err(ComposeError::not_composable(
                left.name(),
                left.io_actions(),
                right.name(),
                right.io_actions(),
            )
            .into());
        }

        let shared = shared_io_names(left.inputs(), left.outputs(), right.inputs(), right.outputs());
        info!(
            name = %self.name,
            shared = shared.len(),
            "starting guarded product"
        );

        let init = self.make_pair(left.initial_id(), right.initial_id());
        let mut builder = GuardedBuilder::new(self.name.clone(), &init.id);

        // Declarations merge by name, first occurrence wins.
        for decl in left.decls().iter().chain(right.decls()) {
            builder.add_decl(decl.clone());
        }
        // Non-shared I/O actions survive into the product alphabet even if
        // no reachable state ends up firing them.
        for action in left.io_actions().chain(right.io_actions()) {
            if !shared.contains(&action.name) {
                builder.add_action(action.clone());
            }
        }

        traverse(init, |pair, frontier| {
            self.expand(&mut builder, &shared, pair, frontier)
        })?;

        Ok(builder.build())
    }

    fn make_pair(&self, left: StateId, right: StateId) -> ProductPair {
        let id = format!(
            "{}_{}",
            self.left.state(left).name(),
            self.right.state(right).name()
        );
        ProductPair { left, right, id }
    }

    fn expand(
        &mut self,
        builder: &mut GuardedBuilder,
        shared: &BTreeSet<String>,
        pair: &ProductPair,
        frontier: &mut Frontier<'_, ProductPair>,
    ) -> Result<(), ProductError> {
        let s1 = self.left.state(pair.left);
        let s2 = self.right.state(pair.right);

        // Outputs first: shared ones synchronize, local ones propagate.
        for action in s1.output_actions() {
            if shared.contains(&action.name) {
                self.shared_output(builder, frontier, pair, action, Side::Left)?;
            } else {
                self.local_steps(builder, frontier, pair, action, Side::Left);
            }
        }
        for action in s2.output_actions() {
            if shared.contains(&action.name) {
                self.shared_output(builder, frontier, pair, action, Side::Right)?;
            } else {
                self.local_steps(builder, frontier, pair, action, Side::Right);
            }
        }

        // Non-shared inputs and all internal actions propagate locally.
        for action in s1.input_actions() {
            if !shared.contains(&action.name) {
                self.local_steps(builder, frontier, pair, action, Side::Left);
            }
        }
        for action in s1.internal_actions() {
            self.local_steps(builder, frontier, pair, action, Side::Left);
        }
        for action in s2.input_actions() {
            if !shared.contains(&action.name) {
                self.local_steps(builder, frontier, pair, action, Side::Right);
            }
        }
        for action in s2.internal_actions() {
            self.local_steps(builder, frontier, pair, action, Side::Right);
        }
        Ok(())
    }

    /// An action private to one side: the other side's component stays fixed.
    fn local_steps(
        &mut self,
        builder: &mut GuardedBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        action: &Action,
        side: Side,
    ) {
        let mover = match side {
            Side::Left => self.left.state(pair.left),
            Side::Right => self.right.state(pair.right),
        };
        for step in mover.steps(action) {
            let dst = match side {
                Side::Left => self.make_pair(step.dst, pair.right),
                Side::Right => self.make_pair(pair.left, step.dst),
            };
            debug!(src = %pair.id, action = %step.action, dst = %dst.id, "local product step");
            builder.add_transition(
                &pair.id,
                &dst.id,
                step.action.clone(),
                step.pre.clone(),
                step.post.clone(),
            );
            frontier.push(dst);
        }
    }

    /// A shared output crossed against the peer state's matching inputs.
    fn shared_output(
        &mut self,
        builder: &mut GuardedBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        out_action: &Action,
        side: Side,
    ) -> Result<(), ProductError> {
        let (out_state, in_state) = match side {
            Side::Left => (self.left.state(pair.left), self.right.state(pair.right)),
            Side::Right => (self.right.state(pair.right), self.left.state(pair.left)),
        };
        let in_action = Action::input(out_action.name.clone());

        // Communication error: the peer state offers no matching input step.
        if !in_state.has_action(&in_action) {
            let message = format!(
                "no transition with {} to match {} at {}",
                in_action.formatted(),
                out_action.formatted(),
                pair.id
            );
            self.flag_error(builder, &pair.id, message);
            return Ok(());
        }

        for out_step in out_state.steps(out_action) {
            self.shared_cross(builder, frontier, pair, out_step, in_state.steps(&in_action), side)?;
        }
        Ok(())
    }

    /// Validate one output step against every candidate input step.
    fn shared_cross(
        &mut self,
        builder: &mut GuardedBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        out_step: &GuardedStep,
        in_steps: &[GuardedStep],
        side: Side,
    ) -> Result<(), ProductError> {
        let mut any_pre_sat = false;
        let mut first_failure: Option<String> = None;

        for in_step in in_steps {
            let cmp_pre = Expr::and(in_step.pre.clone(), out_step.pre.clone());
            if !self.oracle.is_satisfiable(&cmp_pre)? {
                if first_failure.is_none() {
                    first_failure = Some(format!(
                        "unsatisfiable synchronization precondition at {}: {}",
                        pair.id, cmp_pre
                    ));
                }
                continue;
            }
            any_pre_sat = true;

            let dst = match side {
                Side::Left => self.make_pair(out_step.dst, in_step.dst),
                Side::Right => self.make_pair(in_step.dst, out_step.dst),
            };
            debug!(src = %pair.id, dst = %dst.id, pre = %cmp_pre, "synchronized product step");
            builder.add_transition(
                &pair.id,
                &dst.id,
                Action::tau(),
                cmp_pre.clone(),
                in_step.post.clone(),
            );

            // A failed post-condition implication flags the destination but
            // the transition stays: the pass must reach everything behind it.
            let premise = Expr::and(cmp_pre, in_step.post.clone());
            if !self.oracle.implies_for_all(&premise, &out_step.post)? {
                let message = format!(
                    "post-condition implication failed: ({}) does not entail ({})",
                    premise, out_step.post
                );
                self.flag_error(builder, &dst.id, message);
            }
            frontier.push(dst);
        }

        // Candidates existed but none synchronized: the source is an error,
        // keyed to the first failing pair in iteration order.
        if !any_pre_sat {
            if let Some(message) = first_failure {
                self.flag_error(builder, &pair.id, message);
            }
        }
        Ok(())
    }

    fn flag_error(&mut self, builder: &mut GuardedBuilder, state_id: &str, message: String) {
        debug!(state = state_id, %message, "marking error state");
        builder.mark_error(state_id);
        self.diagnostics.push(message);
    }
}
