//! Expression model for guarded interface automata.
//!
//! Transition pre- and post-conditions are immutable trees over booleans,
//! integers and finite enumerations. The same trees are rendered to the
//! SMT-LIB subset understood by the constraint oracle.

pub mod expr;
pub mod fold;
pub mod smt;

pub use expr::{BinOp, Decl, EnumType, Expr, ExprKind, Span, VarType};
pub use fold::Const;
pub use smt::{check_sat_script, forall_implies_script, negated_implies_script, DeclIndex};
