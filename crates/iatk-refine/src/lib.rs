//! Refinement checking between guarded interface automata.
//!
//! For each reachable (specification, implementation) state pair the engine
//! partitions candidate implementation transitions into minimal families
//! that jointly discharge one specification transition, validated through
//! quantified implication queries against the constraint oracle. The result
//! is a [`SimGraph`] consumed by external renderers and debuggers.

pub mod closure;
pub mod engine;
pub mod error_finder;
pub mod family;
pub mod graph;

pub use engine::{RefineError, RefinementEngine};
pub use error_finder::ErrorStateIndex;
pub use graph::{
    Atom, AtomKind, AttackLabel, AttackOption, FamilyStep, RefinementFamily, RefinementStep,
    SimGraph, SimId, SimState, SimStep, StrongSide,
};
