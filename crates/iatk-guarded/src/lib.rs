//! Guarded-transition interface automata (IAM) and their parallel product.
//!
//! Transitions carry pre- and post-conditions over shared declared variables;
//! the product engine validates synchronization pairs against the constraint
//! oracle and derives error states where synchronization fails.

pub mod automaton;
pub mod builder;
pub mod clone;
pub mod product;

pub use automaton::{GuardedAutomaton, GuardedState, GuardedStep};
pub use builder::GuardedBuilder;
pub use clone::clone_with_name;
pub use product::{GuardedProduct, ProductError};
