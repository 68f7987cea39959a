//! Family search: minimal candidate subsets that discharge an anchor step.
//!
//! Subsets are enumerated by increasing size so every accepted family is
//! minimal; supersets of accepted families are pruned without re-validation.

use iatk_expr::Expr;
use iatk_guarded::GuardedStep;
use iatk_solver::{ConstraintOracle, OracleResult};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Candidate indices forming one family.
pub(crate) type FamilyIndices = SmallVec<[usize; 4]>;

/// Enumerate all minimal valid families among `candidates` for `anchor`.
///
/// A family is valid iff the anchor's precondition is implied by the
/// disjunction of the members' preconditions, and every member's effect
/// under the anchor's precondition entails the anchor's postcondition.
pub(crate) fn find_families<O: ConstraintOracle>(
    oracle: &O,
    anchor: &GuardedStep,
    candidates: &[GuardedStep],
) -> OracleResult<Vec<FamilyIndices>> {
    let mut accepted: Vec<FamilyIndices> = Vec::new();

    for size in 1..=candidates.len() {
        debug!(size, accepted = accepted.len(), "family search level");
        for subset in Combinations::new(candidates.len(), size) {
            // Monotonic pruning: a superset of an accepted family is never
            // minimal, so it is neither re-validated nor re-reported.
            if accepted
                .iter()
                .any(|family| family.iter().all(|i| subset.contains(i)))
            {
                trace!(?subset, "superset of an accepted family, skipped");
                continue;
            }
            if validate_family(oracle, anchor, candidates, &subset)? {
                trace!(?subset, "family accepted");
                accepted.push(subset);
            }
        }
    }
    Ok(accepted)
}

fn validate_family<O: ConstraintOracle>(
    oracle: &O,
    anchor: &GuardedStep,
    candidates: &[GuardedStep],
    subset: &FamilyIndices,
) -> OracleResult<bool> {
    // Coverage: the members' preconditions jointly cover the anchor's.
    let pre_union = Expr::or_all(subset.iter().map(|&i| candidates[i].pre.clone()).collect());
    if !oracle.implies_for_all(&anchor.pre, &pre_union)? {
        trace!("family rejected: preconditions do not cover the anchor");
        return Ok(false);
    }

    // Every member's effect must land inside the anchor's postcondition.
    for &i in subset {
        let member = &candidates[i];
        let premise = Expr::and(
            Expr::and(anchor.pre.clone(), member.pre.clone()),
            member.post.clone(),
        );
        if !oracle.implies_for_all(&premise, &anchor.post)? {
            trace!(member = i, "family rejected: postcondition not entailed");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Lexicographic k-subsets of `0..n`.
struct Combinations {
    n: usize,
    indices: FamilyIndices,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n || k == 0,
        }
    }
}

impl Iterator for Combinations {
    type Item = FamilyIndices;

    fn next(&mut self) -> Option<FamilyIndices> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        // Advance: find the rightmost index that can still move up.
        let k = self.indices.len();
        let mut pos = k;
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            if self.indices[pos] < self.n - (k - pos) {
                self.indices[pos] += 1;
                for later in pos + 1..k {
                    self.indices[later] = self.indices[later - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}
