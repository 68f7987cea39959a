//! Integration tests for the refinement engine and the error index, run
//! against the bounded in-memory oracle.

use iatk_core::Action;
use iatk_expr::{Decl, Expr, Span};
use iatk_guarded::{GuardedAutomaton, GuardedBuilder};
use iatk_refine::{
    AtomKind, ErrorStateIndex, RefineError, RefinementEngine, SimGraph, StrongSide,
};
use iatk_solver::BoundedOracle;
use std::sync::Arc;

fn x() -> Arc<Decl> {
    Arc::new(Decl::int("x"))
}

fn xv() -> Expr {
    Expr::var(x(), false, Span::dummy())
}

fn xp() -> Expr {
    Expr::var(x(), true, Span::dummy())
}

fn int(n: i64) -> Expr {
    Expr::const_int(n, Span::dummy())
}

fn tt() -> Expr {
    Expr::const_bool(true, Span::dummy())
}

fn run(spec: &GuardedAutomaton, implementation: &GuardedAutomaton) -> SimGraph {
    let oracle = BoundedOracle::new();
    RefinementEngine::new(&oracle, spec, implementation)
        .start()
        .unwrap()
}

#[test]
fn test_successful_input_refinement() {
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition("s0", "s1", Action::input("a"), tt(), Expr::eq(xp(), int(0)));
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition("t0", "t1", Action::input("a"), tt(), Expr::eq(xp(), int(0)));
    let imp = imp.build();

    let graph = run(&spec, &imp);
    assert_eq!(graph.state_count(), 2);

    let init = graph.state(graph.init_id());
    assert_eq!(init.id(), "s0_t0");
    assert_eq!(init.options().len(), 1);

    let option = &init.options()[0];
    assert_eq!(option.label.spec.kind, AtomKind::Input);
    assert_eq!(option.label.led_by, StrongSide::Spec);
    assert!(!option.label.is_error());
    assert_eq!(option.family_steps.len(), 1);

    let family_step = &option.family_steps[0];
    assert_eq!(family_step.families.len(), 1);
    let family = &family_step.families[0];
    // The implementation is the refined side of a spec-led input.
    assert_eq!(family.strong, StrongSide::Impl);
    assert_eq!(family.members.len(), 1);
    assert_eq!(graph.state(family.members[0].dst).id(), "s1_t1");

    let errors = ErrorStateIndex::new(&graph);
    assert_eq!(errors.error_ids().count(), 0);
}

#[test]
fn test_missing_input_propagates_to_the_root() {
    // The implementation accepts a but then refuses b; the b-refusal is a
    // forced error that back-propagates to the initial pair.
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition("s0", "s1", Action::input("a"), tt(), Expr::eq(xp(), int(0)));
    spec.add_transition("s1", "s2", Action::input("b"), tt(), tt());
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition("t0", "t1", Action::input("a"), tt(), Expr::eq(xp(), int(0)));
    // Keeps b in the implementation alphabet without offering it at t1.
    imp.add_transition("u", "u", Action::input("b"), tt(), tt());
    let imp = imp.build();

    let graph = run(&spec, &imp);
    assert_eq!(graph.state_count(), 3);

    let mid = graph.find("s1_t1").unwrap();
    let error_option = &graph.state(mid).options()[0];
    assert!(error_option.label.is_error());
    assert_eq!(error_option.label.impl_side.kind, AtomKind::Error);
    assert_eq!(error_option.state_steps.len(), 1);
    let anchor = error_option.state_steps[0];
    assert_eq!(graph.state(anchor).id(), "s2_");
    assert!(graph.state(anchor).is_incomplete());

    let errors = ErrorStateIndex::new(&graph);
    assert!(errors.is_error(anchor));
    assert!(errors.is_error(mid));
    // Fixed-point marking reaches the root: its only option lands solely on
    // marked states.
    assert!(errors.is_error(graph.init_id()));
}

#[test]
fn test_output_through_epsilon_closure() {
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition("s0", "s1", Action::tau(), tt(), tt());
    spec.add_transition("s1", "s2", Action::output("c"), Expr::gt(xv(), int(0)), Expr::eq(xp(), int(1)));
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition("t0", "t1", Action::output("c"), Expr::gt(xv(), int(0)), Expr::eq(xp(), int(1)));
    let imp = imp.build();

    let graph = run(&spec, &imp);

    let init = graph.state(graph.init_id());
    let option = init
        .options()
        .iter()
        .find(|o| o.label.impl_side.kind == AtomKind::Output)
        .unwrap();
    assert_eq!(option.label.led_by, StrongSide::Impl);
    assert_eq!(option.family_steps.len(), 1);

    let family_step = &option.family_steps[0];
    assert_eq!(family_step.led, StrongSide::Impl);
    assert_eq!(family_step.families.len(), 1);
    let family = &family_step.families[0];
    // The specification is the refined side of an impl-led output.
    assert_eq!(family.strong, StrongSide::Spec);
    assert_eq!(graph.state(family.members[0].dst).id(), "s2_t1");

    let errors = ErrorStateIndex::new(&graph);
    assert_eq!(errors.error_ids().count(), 0);
}

#[test]
fn test_output_unmatched_by_the_closure() {
    // The spec alphabet carries c! but no state of the closure offers it.
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_action(Action::output("c"));
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition("t0", "t1", Action::output("c"), tt(), tt());
    let imp = imp.build();

    let graph = run(&spec, &imp);

    let init = graph.state(graph.init_id());
    assert_eq!(init.options().len(), 1);
    let option = &init.options()[0];
    assert_eq!(option.label.spec.kind, AtomKind::Error);
    assert_eq!(option.label.impl_side.kind, AtomKind::Output);
    assert_eq!(graph.state(option.state_steps[0]).id(), "_t1");

    let errors = ErrorStateIndex::new(&graph);
    assert!(errors.is_error(graph.init_id()));
}

#[test]
fn test_internal_actions_cross_the_closure() {
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition("s0", "s1", Action::tau(), tt(), tt());
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition("t0", "t1", Action::internal("w"), tt(), tt());
    let imp = imp.build();

    let graph = run(&spec, &imp);

    let init = graph.state(graph.init_id());
    let option = init
        .options()
        .iter()
        .find(|o| o.label.spec.kind == AtomKind::Epsilon)
        .unwrap();
    assert_eq!(option.label.led_by, StrongSide::Impl);
    let mut dsts: Vec<&str> = option
        .state_steps
        .iter()
        .map(|&sim| graph.state(sim).id())
        .collect();
    dsts.sort();
    assert_eq!(dsts, vec!["s0_t1", "s1_t1"]);

    // Deadlocked pairs without options are not errors.
    let errors = ErrorStateIndex::new(&graph);
    assert_eq!(errors.error_ids().count(), 0);
}

#[test]
fn test_incompatible_alphabets_abort_before_traversal() {
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition("s0", "s1", Action::input("a"), tt(), tt());
    let spec = spec.build();

    let imp = GuardedBuilder::new("I", "t0").build();

    let oracle = BoundedOracle::new();
    match RefinementEngine::new(&oracle, &spec, &imp).start() {
        Err(RefineError::IncompatibleAlphabets { spec, implementation }) => {
            assert_eq!(spec, "S");
            assert_eq!(implementation, "I");
        }
        other => panic!("expected alphabet incompatibility, got {other:?}"),
    }
}

#[test]
fn test_missing_solver_tools_abort_before_traversal() {
    use iatk_solver::{OracleError, SmtProcessOracle, SolverConfig};

    let oracle = SmtProcessOracle::new(SolverConfig {
        binary: "iatk-no-such-solver-binary".to_string(),
        ..SolverConfig::default()
    });
    let spec = GuardedBuilder::new("S", "s0").build();
    let imp = GuardedBuilder::new("I", "t0").build();

    match RefinementEngine::new(&oracle, &spec, &imp).start() {
        Err(RefineError::Oracle(OracleError::MissingTools(tools))) => {
            assert_eq!(tools, vec!["iatk-no-such-solver-binary".to_string()]);
        }
        other => panic!("expected missing-tools failure, got {other:?}"),
    }
}

#[test]
fn test_two_member_family_via_the_engine() {
    // The spec demands a under x>=0; the implementation splits the domain
    // between two steps that only cover it jointly.
    let mut spec = GuardedBuilder::new("S", "s0");
    spec.add_transition(
        "s0",
        "s1",
        Action::input("a"),
        Expr::ge(xv(), int(0)),
        Expr::gt(xp(), xv()),
    );
    let spec = spec.build();

    let mut imp = GuardedBuilder::new("I", "t0");
    imp.add_transition(
        "t0",
        "t1",
        Action::input("a"),
        Expr::gt(xv(), int(0)),
        Expr::eq(xp(), Expr::add(xv(), int(1))),
    );
    imp.add_transition(
        "t0",
        "t2",
        Action::input("a"),
        Expr::eq(xv(), int(0)),
        Expr::eq(xp(), int(1)),
    );
    let imp = imp.build();

    let graph = run(&spec, &imp);

    let option = &graph.state(graph.init_id()).options()[0];
    let family_step = &option.family_steps[0];
    assert_eq!(family_step.families.len(), 1);
    let family = &family_step.families[0];
    assert_eq!(family.members.len(), 2);
    let mut dsts: Vec<&str> = family
        .members
        .iter()
        .map(|m| graph.state(m.dst).id())
        .collect();
    dsts.sort();
    assert_eq!(dsts, vec!["s1_t1", "s1_t2"]);

    let errors = ErrorStateIndex::new(&graph);
    assert_eq!(errors.error_ids().count(), 0);
}
