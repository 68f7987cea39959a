//! Constraint oracle for the verification engines.
//!
//! The engines delegate every satisfiability and universal-implication
//! question to a [`ConstraintOracle`]. The production backend talks to an
//! external SMT solver process over a text protocol; a bounded in-memory
//! backend serves tests so the combinatorial cores run without a solver
//! installed.

pub mod bounded;
pub mod oracle;
pub mod smt_process;
pub mod toolpath;

pub use bounded::{BoundedDomain, BoundedOracle};
pub use oracle::{ConstraintOracle, OracleError, OracleResult};
pub use smt_process::{ImpliesEncoding, SmtProcessOracle, SolverConfig};
