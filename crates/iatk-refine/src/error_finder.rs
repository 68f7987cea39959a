//! Back-propagation of refinement errors over the simulation graph.
//!
//! A state is an error if it is directly flagged (incomplete pair, missing
//! action, anchor with no defence family) or if some attack option lands
//! only on already-marked error states. Marking runs to a fixed point so
//! interactive exploration can be biased toward witnessing counterexamples.

use crate::graph::{SimGraph, SimId, SimState};
use tracing::debug;

/// Error marking computed once over a finished [`SimGraph`].
pub struct ErrorStateIndex {
    marked: Vec<bool>,
}

impl ErrorStateIndex {
    pub fn new(graph: &SimGraph) -> Self {
        let mut marked = vec![false; graph.state_count()];

        // Seed with directly flagged states.
        for (sim, state) in graph.states() {
            if Self::directly_flagged(state) {
                marked[sim.index()] = true;
            }
        }

        // Fixed point: an option whose whole destination set is marked
        // forces its source into the error set.
        loop {
            let mut changed = false;
            for (sim, state) in graph.states() {
                if marked[sim.index()] {
                    continue;
                }
                let forced = state.options().iter().any(|option| {
                    let mut any = false;
                    let all = option.destinations().all(|dst| {
                        any = true;
                        marked[dst.index()]
                    });
                    any && all
                });
                if forced {
                    marked[sim.index()] = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let count = marked.iter().filter(|&&m| m).count();
        debug!(errors = count, states = graph.state_count(), "error states indexed");
        Self { marked }
    }

    fn directly_flagged(state: &SimState) -> bool {
        if state.is_incomplete() {
            return true;
        }
        state.options().iter().any(|option| {
            option.label.is_error()
                || option.family_steps.iter().any(|fs| fs.has_no_families())
        })
    }

    pub fn is_error(&self, id: SimId) -> bool {
        self.marked[id.index()]
    }

    /// All marked states, in graph order.
    pub fn error_ids(&self) -> impl Iterator<Item = SimId> + '_ {
        self.marked
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| SimId(i as u32))
    }
}
