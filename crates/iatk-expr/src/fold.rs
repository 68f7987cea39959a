//! Best-effort constant folding over literal-only subtrees.
//!
//! The oracle uses this as a quick path: a condition that folds to a boolean
//! constant never reaches the solver process.

use crate::expr::{BinOp, Expr, ExprKind};

/// A folded constant. Enumeration members fold to their zero-based index,
/// matching the solver encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Const {
    Int(i64),
    Bool(bool),
}

impl Const {
    fn as_int(self) -> Option<i64> {
        match self {
            Const::Int(n) => Some(n),
            Const::Bool(_) => None,
        }
    }

    fn as_bool(self) -> Option<bool> {
        match self {
            Const::Bool(b) => Some(b),
            Const::Int(_) => None,
        }
    }
}

impl Expr {
    /// Fold the expression to a constant, if every leaf is a literal.
    /// Division or modulo by zero and arithmetic overflow fold to `None`.
    pub fn fold_const(&self) -> Option<Const> {
        match &self.kind {
            ExprKind::Int(n) => Some(Const::Int(*n)),
            ExprKind::Bool(b) => Some(Const::Bool(*b)),
            ExprKind::EnumMember { ty, member } => {
                ty.member_index(member).map(|i| Const::Int(i as i64))
            }
            ExprKind::Var { .. } => None,
            ExprKind::Not(inner) => inner.fold_const()?.as_bool().map(|b| Const::Bool(!b)),
            ExprKind::Group(inner) => inner.fold_const(),
            ExprKind::Binary { op, left, right } => {
                let lhs = left.fold_const()?;
                let rhs = right.fold_const()?;
                fold_binary(*op, lhs, rhs)
            }
        }
    }

    /// Fold to a boolean constant, if possible.
    pub fn fold_bool(&self) -> Option<bool> {
        self.fold_const()?.as_bool()
    }
}

fn fold_binary(op: BinOp, lhs: Const, rhs: Const) -> Option<Const> {
    match op {
        BinOp::And => Some(Const::Bool(lhs.as_bool()? && rhs.as_bool()?)),
        BinOp::Or => Some(Const::Bool(lhs.as_bool()? || rhs.as_bool()?)),
        BinOp::Implies => Some(Const::Bool(!lhs.as_bool()? || rhs.as_bool()?)),
        BinOp::Eq => Some(Const::Bool(lhs == rhs)),
        BinOp::Ne => Some(Const::Bool(lhs != rhs)),
        BinOp::Gt => Some(Const::Bool(lhs.as_int()? > rhs.as_int()?)),
        BinOp::Ge => Some(Const::Bool(lhs.as_int()? >= rhs.as_int()?)),
        BinOp::Lt => Some(Const::Bool(lhs.as_int()? < rhs.as_int()?)),
        BinOp::Le => Some(Const::Bool(lhs.as_int()? <= rhs.as_int()?)),
        BinOp::Add => lhs.as_int()?.checked_add(rhs.as_int()?).map(Const::Int),
        BinOp::Sub => lhs.as_int()?.checked_sub(rhs.as_int()?).map(Const::Int),
        BinOp::Mul => lhs.as_int()?.checked_mul(rhs.as_int()?).map(Const::Int),
        BinOp::Div => lhs.as_int()?.checked_div(rhs.as_int()?).map(Const::Int),
        BinOp::Mod => lhs.as_int()?.checked_rem(rhs.as_int()?).map(Const::Int),
    }
}
