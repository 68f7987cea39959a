//! Parallel product of two modal automata.
//!
//! Outputs synchronize with matching inputs into internal actions named
//! after the synchronizing pair; shared inputs synchronize into inputs.
//! Strength combines as must only when both sides offer must steps.

use crate::automaton::ModalAutomaton;
use crate::builder::ModalBuilder;
use iatk_core::{modal_composable, traverse, Action, ComposeError, Composite, Frontier, StateId};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A composite state of the modal product.
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

/// Which side of the pair owns a local action.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// The modal product engine.
pub struct ModalProduct<'a> {
    left: &'a ModalAutomaton,
    right: &'a ModalAutomaton,
    name: String,
}

impl<'a> ModalProduct<'a> {
    pub fn new(left: &'a ModalAutomaton, right: &'a ModalAutomaton) -> Self {
        let name = format!("product_{}_{}", left.name(), right.name());
        Self { left, right, name }
    }

    pub fn build(&mut self) -> Result<ModalAutomaton, ComposeError> {
        let (left, right) = (self.left, self.right);
        if !modal_composable(left.outputs(), right.outputs()) {
            return Err(ComposeError::not_composable(
                left.name(),
                left.io_actions(),
                right.name(),
                right.io_actions(),
            ));
        }

        let shared = self.shared_names();
        info!(name = %self.name, shared = shared.len(), "starting modal product");

        let init = self.make_pair(left.initial_id(), right.initial_id());
        let mut builder = ModalBuilder::new(self.name.clone(), &init.id);
        traverse(init, |pair, frontier| {
            self.expand(&mut builder, &shared, pair, frontier);
            Ok(())
        })?;

        Ok(builder.build())
    }

    /// An input name is shared if the peer offers it as input or output; an
    /// output name is shared if the peer offers it as input.
    fn shared_names(&self) -> BTreeSet<String> {
        let mut shared = BTreeSet::new();
        let peers = [(self.left, self.right), (self.right, self.left)];
        for (own, peer) in peers {
            for action in own.inputs() {
                if peer.inputs().contains(&Action::input(action.name.clone()))
                    || peer.outputs().contains(&Action::output(action.name.clone()))
                {
                    shared.insert(action.name.clone());
                }
            }
            for action in own.outputs() {
                if peer.inputs().contains(&Action::input(action.name.clone())) {
                    shared.insert(action.name.clone());
                }
            }
        }
        shared
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
        builder: &mut ModalBuilder,
        shared: &BTreeSet<String>,
        pair: &ProductPair,
        frontier: &mut Frontier<'_, ProductPair>,
    ) {
        let s1 = self.left.state(pair.left);
        let s2 = self.right.state(pair.right);

        for action in s1.output_actions() {
            if shared.contains(&action.name) {
                self.sync_output(builder, frontier, pair, action, Side::Left);
            } else {
                self.local_steps(builder, frontier, pair, action, Side::Left);
            }
        }
        for action in s2.output_actions() {
            if shared.contains(&action.name) {
                self.sync_output(builder, frontier, pair, action, Side::Right);
            } else {
                self.local_steps(builder, frontier, pair, action, Side::Right);
            }
        }

        for action in s1.input_actions() {
            if shared.contains(&action.name) {
                // Input×input synchronization fires only when both states
                // offer the action; output-driven sharing is handled above.
                if s2.has_action(action) {
                    self.sync_actions(builder, frontier, pair, action, action, action.clone());
                }
            } else {
                self.local_steps(builder, frontier, pair, action, Side::Left);
            }
        }
        for action in s2.input_actions() {
            if !shared.contains(&action.name) {
                self.local_steps(builder, frontier, pair, action, Side::Right);
            }
        }

        for action in s1.internal_actions() {
            self.local_steps(builder, frontier, pair, action, Side::Left);
        }
        for action in s2.internal_actions() {
            self.local_steps(builder, frontier, pair, action, Side::Right);
        }
    }

    /// A local action propagates one side and preserves its strength.
    fn local_steps(
        &mut self,
        builder: &mut ModalBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        action: &Action,
        side: Side,
    ) {
        let mover = match side {
            Side::Left => self.left.state(pair.left),
            Side::Right => self.right.state(pair.right),
        };
        for step in mover.must_steps(action) {
            let dst_pairs: Vec<ProductPair> = step
                .dsts
                .iter()
                .map(|&d| match side {
                    Side::Left => self.make_pair(d, pair.right),
                    Side::Right => self.make_pair(pair.left, d),
                })
                .collect();
            self.add_must(builder, frontier, pair, action.clone(), dst_pairs);
        }
        for step in mover.may_steps(action) {
            let dst = match side {
                Side::Left => self.make_pair(step.dst, pair.right),
                Side::Right => self.make_pair(pair.left, step.dst),
            };
            debug!(src = %pair.id, action = %action, dst = %dst.id, "local may step");
            builder.add_may_transition(&pair.id, action.clone(), &dst.id);
            frontier.push(dst);
        }
    }

    /// A shared output crossed against the peer's matching input. The result
    /// is a tau-class internal action named after the synchronizing pair.
    fn sync_output(
        &mut self,
        builder: &mut ModalBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        out_action: &Action,
        side: Side,
    ) {
        let in_action = Action::input(out_action.name.clone());
        let peer = match side {
            Side::Left => self.right.state(pair.right),
            Side::Right => self.left.state(pair.left),
        };

        // A shared output the peer cannot receive is a product failure.
        if !peer.has_action(&in_action) {
            debug!(state = %pair.id, action = %out_action, "unmatched shared output");
            builder.mark_error(&pair.id);
            return;
        }

        let result = Action::internal(out_action.name.clone());
        match side {
            Side::Left => {
                self.sync_actions(builder, frontier, pair, out_action, &in_action, result)
            }
            Side::Right => {
                self.sync_actions(builder, frontier, pair, &in_action, out_action, result)
            }
        }
    }

    /// Synchronize `left_action` fired by the left component with
    /// `right_action` fired by the right one. Must×must yields one must
    /// result per step pair whose disjunctive destination set is the cross
    /// product of the two disjunct sets; anything else falls back to may.
    fn sync_actions(
        &mut self,
        builder: &mut ModalBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        left_action: &Action,
        right_action: &Action,
        result: Action,
    ) {
        let s1 = self.left.state(pair.left);
        let s2 = self.right.state(pair.right);

        let left_must = s1.must_steps(left_action);
        let right_must = s2.must_steps(right_action);
        if !left_must.is_empty() && !right_must.is_empty() {
            for m1 in left_must {
                for m2 in right_must {
                    let mut dst_pairs = Vec::new();
                    for &d1 in &m1.dsts {
                        for &d2 in &m2.dsts {
                            dst_pairs.push(self.make_pair(d1, d2));
                        }
                    }
                    self.add_must(builder, frontier, pair, result.clone(), dst_pairs);
                }
            }
            return;
        }

        // May fallback: one successor per cross pair, must disjuncts
        // flattened alongside may destinations.
        for d1 in s1.destinations(left_action) {
            for d2 in s2.destinations(right_action) {
                let dst = self.make_pair(d1, d2);
                debug!(src = %pair.id, action = %result, dst = %dst.id, "synchronized may step");
                builder.add_may_transition(&pair.id, result.clone(), &dst.id);
                frontier.push(dst);
            }
        }
    }

    fn add_must(
        &self,
        builder: &mut ModalBuilder,
        frontier: &mut Frontier<'_, ProductPair>,
        pair: &ProductPair,
        action: Action,
        dst_pairs: Vec<ProductPair>,
    ) {
        let names: Vec<String> = dst_pairs.iter().map(|p| p.id.clone()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        debug!(src = %pair.id, action = %action, dsts = ?names, "must step");
        builder.add_must_transition(&pair.id, action, &refs);
        for dst in dst_pairs {
            frontier.push(dst);
        }
    }
}
