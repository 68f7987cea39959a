//! Composability rules and shared-action computation for parallel products.

use crate::action::Action;
use std::collections::BTreeSet;
use thiserror::Error;

/// Pre-traversal composition failure. Not recoverable: the product is never
/// started on incompatible alphabets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("automata are not composable: '{left}' and '{right}' ({left_alphabet} -- {right_alphabet})")]
    NotComposable {
        left: String,
        right: String,
        left_alphabet: String,
        right_alphabet: String,
    },
}

impl ComposeError {
    pub fn not_composable<'a>(
        left: &str,
        left_io: impl IntoIterator<Item = &'a Action>,
        right: &str,
        right_io: impl IntoIterator<Item = &'a Action>,
    ) -> Self {
        ComposeError::NotComposable {
            left: left.to_string(),
            right: right.to_string(),
            left_alphabet: format_alphabet(left_io),
            right_alphabet: format_alphabet(right_io),
        }
    }
}

/// Render an alphabet for diagnostics.
pub fn format_alphabet<'a>(actions: impl IntoIterator<Item = &'a Action>) -> String {
    actions
        .into_iter()
        .map(Action::formatted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Names synchronized by the guarded product: inputs of one side that the
/// other offers as outputs, and vice versa.
pub fn shared_io_names(
    in1: &BTreeSet<Action>,
    out1: &BTreeSet<Action>,
    in2: &BTreeSet<Action>,
    out2: &BTreeSet<Action>,
) -> BTreeSet<String> {
    let mut shared = BTreeSet::new();
    for action in in1 {
        if out2.contains(&Action::output(action.name.clone())) {
            shared.insert(action.name.clone());
        }
    }
    for action in out1 {
        if in2.contains(&Action::input(action.name.clone())) {
            shared.insert(action.name.clone());
        }
    }
    shared
}

/// Guarded-rule composability: input alphabets disjoint and output alphabets
/// disjoint. Internal actions are all distinct tau events and impose nothing.
pub fn guarded_composable(
    in1: &BTreeSet<Action>,
    out1: &BTreeSet<Action>,
    in2: &BTreeSet<Action>,
    out2: &BTreeSet<Action>,
) -> bool {
    in1.is_disjoint(in2) && out1.is_disjoint(out2)
}

/// Modal-rule composability: an output can never be produced by both sides,
/// so the output alphabets must not intersect. Inputs may be shared freely.
pub fn modal_composable(out1: &BTreeSet<Action>, out2: &BTreeSet<Action>) -> bool {
    out1.is_disjoint(out2)
}
