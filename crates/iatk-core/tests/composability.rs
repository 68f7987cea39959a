//! Property: composability is symmetric under both product rules.

use iatk_core::{guarded_composable, modal_composable, shared_io_names, Action};
use proptest::prelude::*;
use std::collections::BTreeSet;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

fn arb_alphabet() -> impl Strategy<Value = (BTreeSet<Action>, BTreeSet<Action>)> {
    // For each name: absent, input, or output. Keeps each alphabet partitioned
    // by kind, as the data model requires.
    proptest::collection::vec(0u8..3, NAMES.len()).prop_map(|choices| {
        let mut inputs = BTreeSet::new();
        let mut outputs = BTreeSet::new();
        for (name, choice) in NAMES.iter().zip(choices) {
            match choice {
                1 => {
                    inputs.insert(Action::input(*name));
                }
                2 => {
                    outputs.insert(Action::output(*name));
                }
                _ => {}
            }
        }
        (inputs, outputs)
    })
}

proptest! {
    #[test]
    fn guarded_composability_is_symmetric(a in arb_alphabet(), b in arb_alphabet()) {
        let (in1, out1) = &a;
        let (in2, out2) = &b;
        prop_assert_eq!(
            guarded_composable(in1, out1, in2, out2),
            guarded_composable(in2, out2, in1, out1)
        );
    }

    #[test]
    fn modal_composability_is_symmetric(a in arb_alphabet(), b in arb_alphabet()) {
        let (_, out1) = &a;
        let (_, out2) = &b;
        prop_assert_eq!(modal_composable(out1, out2), modal_composable(out2, out1));
    }

    #[test]
    fn shared_io_names_are_symmetric(a in arb_alphabet(), b in arb_alphabet()) {
        let (in1, out1) = &a;
        let (in2, out2) = &b;
        prop_assert_eq!(
            shared_io_names(in1, out1, in2, out2),
            shared_io_names(in2, out2, in1, out1)
        );
    }
}
