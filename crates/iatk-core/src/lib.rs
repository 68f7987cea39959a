//! Shared automaton concepts: actions, the pair-state traversal driver, and
//! the composability and refinement-compatibility rules both automaton
//! variants build on.

pub mod action;
pub mod compose;
pub mod refinement;
pub mod traversal;

pub use action::{Action, ActionKind, StateId, TAU_NAME, TAU_SYMBOL};
pub use compose::{
    format_alphabet, guarded_composable, modal_composable, shared_io_names, ComposeError,
};
pub use refinement::io_compatible;
pub use traversal::{traverse, Composite, Frontier};
