//! Integration tests for the modal product engine.

use iatk_core::{Action, ComposeError};
use iatk_modal::{ModalAutomaton, ModalBuilder, ModalProduct};

fn product(left: &ModalAutomaton, right: &ModalAutomaton) -> Result<ModalAutomaton, ComposeError> {
    ModalProduct::new(left, right).build()
}

#[test]
fn test_intersecting_outputs_are_not_composable() {
    let mut a = ModalBuilder::new("A", "s0");
    a.add_may_transition("s0", Action::output("x"), "s1");
    let mut b = ModalBuilder::new("B", "t0");
    b.add_may_transition("t0", Action::output("x"), "t1");

    let err = product(&a.build(), &b.build()).unwrap_err();
    assert!(err.to_string().contains("not composable"));
}

#[test]
fn test_shared_inputs_are_composable() {
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::input("c"), &["s1"]);
    let mut b = ModalBuilder::new("B", "t0");
    b.add_must_transition("t0", Action::input("c"), &["t1"]);

    let result = product(&a.build(), &b.build()).unwrap();

    // Input×input synchronizes into an input of the same name.
    let steps = result.initial().must_steps(&Action::input("c"));
    assert_eq!(steps.len(), 1);
    let names: Vec<&str> = steps[0]
        .dsts
        .iter()
        .map(|&id| result.state(id).name())
        .collect();
    assert_eq!(names, vec!["s1_t1"]);
    assert!(result.inputs().contains(&Action::input("c")));
}

#[test]
fn test_must_must_cross_product() {
    // must a! with {d1, d2} against must a? with {e1} yields one must
    // tau-class transition with the disjunctive set {(d1,e1), (d2,e1)}.
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::output("a"), &["d1", "d2"]);
    let mut b = ModalBuilder::new("B", "t0");
    b.add_must_transition("t0", Action::input("a"), &["e1"]);

    let result = product(&a.build(), &b.build()).unwrap();

    let sync = Action::internal("a");
    let steps = result.initial().must_steps(&sync);
    assert_eq!(steps.len(), 1);
    let names: Vec<&str> = steps[0]
        .dsts
        .iter()
        .map(|&id| result.state(id).name())
        .collect();
    assert_eq!(names, vec!["d1_e1", "d2_e1"]);
    assert!(result.internals().contains(&sync));
    assert!(!result.initial().is_error());
}

#[test]
fn test_may_fallback_when_either_side_is_may() {
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::output("a"), &["d1", "d2"]);
    let mut b = ModalBuilder::new("B", "t0");
    b.add_may_transition("t0", Action::input("a"), "e1");

    let result = product(&a.build(), &b.build()).unwrap();

    let sync = Action::internal("a");
    let init = result.initial();
    assert!(init.must_steps(&sync).is_empty());
    let may: Vec<&str> = init
        .may_steps(&sync)
        .iter()
        .map(|s| result.state(s.dst).name())
        .collect();
    assert_eq!(may, vec!["d1_e1", "d2_e1"]);
}

#[test]
fn test_unmatched_shared_output_marks_error_and_continues() {
    // B can receive a, but only after w; at (s0,t0) the output is
    // unmatched. The state is flagged and its other actions still fire.
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::output("a"), &["s1"]);
    let mut b = ModalBuilder::new("B", "t0");
    b.add_may_transition("t0", Action::internal("w"), "t1");
    b.add_must_transition("t1", Action::input("a"), &["t2"]);

    let result = product(&a.build(), &b.build()).unwrap();

    let init = result.initial();
    assert!(init.is_error());
    // The internal step of B was still explored.
    let w_steps = init.may_steps(&Action::internal("w"));
    assert_eq!(w_steps.len(), 1);
    let mid = w_steps[0].dst;
    assert_eq!(result.state(mid).name(), "s0_t1");
    // At (s0,t1) the synchronization succeeds.
    let sync_steps = result.state(mid).must_steps(&Action::internal("a"));
    assert_eq!(sync_steps.len(), 1);
    assert!(!result.state(mid).is_error());
}

#[test]
fn test_local_actions_preserve_strength_and_hold_peer_fixed() {
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::output("x"), &["s1"]);
    a.add_may_transition("s0", Action::internal("w"), "s2");
    let mut b = ModalBuilder::new("B", "t0");
    b.add_may_transition("t0", Action::input("y"), "t1");

    let result = product(&a.build(), &b.build()).unwrap();
    let init = result.initial();

    let must = init.must_steps(&Action::output("x"));
    assert_eq!(must.len(), 1);
    assert_eq!(result.state(must[0].dsts[0]).name(), "s1_t0");

    let may_internal = init.may_steps(&Action::internal("w"));
    assert_eq!(may_internal.len(), 1);
    assert_eq!(result.state(may_internal[0].dst).name(), "s2_t0");

    let may_input = init.may_steps(&Action::input("y"));
    assert_eq!(may_input.len(), 1);
    assert_eq!(result.state(may_input[0].dst).name(), "s0_t1");
}

#[test]
fn test_input_output_sharing_consumes_the_input_side_too() {
    // The shared input never fires alone: at (s0,t0) only the
    // synchronized transition exists, not a lone b? step.
    let mut a = ModalBuilder::new("A", "s0");
    a.add_must_transition("s0", Action::output("b"), &["s1"]);
    let mut b = ModalBuilder::new("B", "t0");
    b.add_must_transition("t0", Action::input("b"), &["t1"]);

    let result = product(&a.build(), &b.build()).unwrap();
    let init = result.initial();
    assert!(init.must_steps(&Action::input("b")).is_empty());
    assert_eq!(init.must_steps(&Action::internal("b")).len(), 1);
}
