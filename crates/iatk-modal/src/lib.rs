//! Modal interface automata (MIA) and their parallel product.
//!
//! Transitions are classified as must or may; the destination of a must
//! transition is a disjunctive set of alternatives, any one of which
//! discharges the obligation.

pub mod automaton;
pub mod builder;
pub mod clone;
pub mod product;

pub use automaton::{MayStep, ModalAutomaton, ModalState, MustStep};
pub use builder::ModalBuilder;
pub use clone::clone_with_name;
pub use product::ModalProduct;
