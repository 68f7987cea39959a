//! Alphabet compatibility for refinement checking.

use crate::action::Action;
use std::collections::BTreeSet;
use tracing::debug;

/// An implementation may accept more inputs and produce fewer outputs than
/// its specification: `impl.inputs ⊇ spec.inputs` and
/// `spec.outputs ⊇ impl.outputs`.
pub fn io_compatible(
    spec_inputs: &BTreeSet<Action>,
    spec_outputs: &BTreeSet<Action>,
    impl_inputs: &BTreeSet<Action>,
    impl_outputs: &BTreeSet<Action>,
) -> bool {
    if !spec_inputs.is_subset(impl_inputs) {
        debug!("some specification inputs are missing in the implementation");
        return false;
    }
    if !impl_outputs.is_subset(spec_outputs) {
        debug!("some implementation outputs are missing in the specification");
        return false;
    }
    true
}
