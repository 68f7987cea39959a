//! Generic worklist traversal over composite pair states.
//!
//! Both product engines and the refinement engine plug into this driver via
//! an expansion callback. De-duplication is by canonical id at enqueue time;
//! the id set only grows and the composite space is finite, so traversal
//! terminates.

use ahash::AHashSet;
use std::collections::VecDeque;
use tracing::trace;

/// A composite state with a canonical identifier — a pure function of the
/// ordered component pair.
pub trait Composite {
    fn canonical_id(&self) -> &str;
}

/// Handle the expansion callback uses to report discovered successors.
pub struct Frontier<'a, S> {
    queue: &'a mut VecDeque<S>,
    visited: &'a mut AHashSet<String>,
}

impl<S: Composite> Frontier<'_, S> {
    /// Enqueue a successor unless its canonical id was already seen.
    pub fn push(&mut self, state: S) {
        let id = state.canonical_id();
        if self.visited.contains(id) {
            return;
        }
        self.visited.insert(id.to_string());
        self.queue.push_back(state);
    }
}

/// Run the worklist to exhaustion: pop one composite state at a time and let
/// `expand` report its successors through the [`Frontier`].
pub fn traverse<S, E, F>(init: S, mut expand: F) -> Result<(), E>
where
    S: Composite,
    F: FnMut(&S, &mut Frontier<'_, S>) -> Result<(), E>,
{
    let mut queue = VecDeque::new();
    let mut visited = AHashSet::new();
    visited.insert(init.canonical_id().to_string());
    queue.push_back(init);

    while let Some(state) = queue.pop_front() {
        trace!(id = state.canonical_id(), "expanding composite state");
        let mut frontier = Frontier {
            queue: &mut queue,
            visited: &mut visited,
        };
        expand(&state, &mut frontier)?;
    }
    Ok(())
}
