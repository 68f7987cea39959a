//! In-memory oracle over bounded domains.
//!
//! Answers by exhaustive evaluation: booleans and enumeration members range
//! over their full domains, integers over a configurable window. Engine tests
//! run against this backend so no solver install is needed. Answers are exact
//! for formulas whose relevant behavior lies inside the window, which is the
//! contract the test suites rely on.

use crate::oracle::{ConstraintOracle, OracleResult};
use ahash::AHashMap;
use iatk_expr::{BinOp, Decl, Expr, ExprKind, VarType};
use std::sync::Arc;
use tracing::trace;

/// Integer window the bounded evaluation ranges over.
#[derive(Debug, Clone, Copy)]
pub struct BoundedDomain {
    pub int_min: i64,
    pub int_max: i64,
}

impl Default for BoundedDomain {
    fn default() -> Self {
        Self {
            int_min: -8,
            int_max: 8,
        }
    }
}

/// Exhaustive-evaluation oracle for tests.
#[derive(Debug, Default)]
pub struct BoundedOracle {
    domain: BoundedDomain,
}

impl BoundedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(domain: BoundedDomain) -> Self {
        Self { domain }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Int(i64),
    Bool(bool),
}

/// Variables referenced by the queried expressions, in first-reference order.
/// A primed reference is a variable of its own.
#[derive(Default)]
struct Vars {
    order: Vec<(Arc<Decl>, bool)>,
    lookup: AHashMap<(String, bool), usize>,
}

impl Vars {
    fn collect<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> Self {
        let mut vars = Self::default();
        for expr in exprs {
            vars.visit(expr);
        }
        vars
    }

    fn visit(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Var { decl, primed } => {
                let key = (decl.name.clone(), *primed);
                if !self.lookup.contains_key(&key) {
                    self.lookup.insert(key, self.order.len());
                    self.order.push((decl.clone(), *primed));
                }
            }
            ExprKind::Not(inner) | ExprKind::Group(inner) => self.visit(inner),
            ExprKind::Binary { left, right, .. } => {
                self.visit(left);
                self.visit(right);
            }
            ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::EnumMember { .. } => {}
        }
    }

    fn domain_of(&self, idx: usize, window: &BoundedDomain) -> Vec<Value> {
        match &self.order[idx].0.ty {
            VarType::Bool => vec![Value::Bool(false), Value::Bool(true)],
            VarType::Int => (window.int_min..=window.int_max).map(Value::Int).collect(),
            VarType::Enum(ty) => (0..ty.members.len() as i64).map(Value::Int).collect(),
        }
    }
}

fn eval(expr: &Expr, vars: &Vars, env: &[Value]) -> Option<Value> {
    match &expr.kind {
        ExprKind::Int(n) => Some(Value::Int(*n)),
        ExprKind::Bool(b) => Some(Value::Bool(*b)),
        ExprKind::EnumMember { ty, member } => {
            ty.member_index(member).map(|i| Value::Int(i as i64))
        }
        ExprKind::Var { decl, primed } => {
            let idx = *vars.lookup.get(&(decl.name.clone(), *primed))?;
            Some(env[idx])
        }
        ExprKind::Not(inner) => match eval(inner, vars, env)? {
            Value::Bool(b) => Some(Value::Bool(!b)),
            Value::Int(_) => None,
        },
        ExprKind::Group(inner) => eval(inner, vars, env),
        ExprKind::Binary { op, left, right } => {
            let lhs = eval(left, vars, env)?;
            let rhs = eval(right, vars, env)?;
            eval_binary(*op, lhs, rhs)
        }
    }
}

fn eval_binary(op: BinOp, lhs: Value, rhs: Value) -> Option<Value> {
    use Value::{Bool, Int};
    match (op, lhs, rhs) {
        (BinOp::And, Bool(a), Bool(b)) => Some(Bool(a && b)),
        (BinOp::Or, Bool(a), Bool(b)) => Some(Bool(a || b)),
        (BinOp::Implies, Bool(a), Bool(b)) => Some(Bool(!a || b)),
        (BinOp::Eq, a, b) => Some(Bool(a == b)),
        (BinOp::Ne, a, b) => Some(Bool(a != b)),
        (BinOp::Gt, Int(a), Int(b)) => Some(Bool(a > b)),
        (BinOp::Ge, Int(a), Int(b)) => Some(Bool(a >= b)),
        (BinOp::Lt, Int(a), Int(b)) => Some(Bool(a < b)),
        (BinOp::Le, Int(a), Int(b)) => Some(Bool(a <= b)),
        (BinOp::Add, Int(a), Int(b)) => a.checked_add(b).map(Int),
        (BinOp::Sub, Int(a), Int(b)) => a.checked_sub(b).map(Int),
        (BinOp::Mul, Int(a), Int(b)) => a.checked_mul(b).map(Int),
        (BinOp::Div, Int(a), Int(b)) => a.checked_div(b).map(Int),
        (BinOp::Mod, Int(a), Int(b)) => a.checked_rem(b).map(Int),
        _ => None,
    }
}

/// Visit every assignment over the variable domains. The callback returns
/// `false` to stop early.
fn for_each_assignment(
    vars: &Vars,
    window: &BoundedDomain,
    mut visit: impl FnMut(&[Value]) -> bool,
) {
    let domains: Vec<Vec<Value>> = (0..vars.order.len())
        .map(|i| vars.domain_of(i, window))
        .collect();
    if domains.iter().any(|d| d.is_empty()) {
        return;
    }

    let mut positions = vec![0usize; domains.len()];
    let mut env: Vec<Value> = domains.iter().map(|d| d[0]).collect();
    loop {
        if !visit(&env) {
            return;
        }
        // Odometer advance.
        let mut level = 0;
        loop {
            if level == domains.len() {
                return;
            }
            positions[level] += 1;
            if positions[level] < domains[level].len() {
                env[level] = domains[level][positions[level]];
                break;
            }
            positions[level] = 0;
            env[level] = domains[level][0];
            level += 1;
        }
    }
}

impl ConstraintOracle for BoundedOracle {
    fn is_satisfiable(&self, expr: &Expr) -> OracleResult<bool> {
        if let Some(value) = expr.fold_bool() {
            return Ok(value);
        }
        let vars = Vars::collect([expr]);
        let mut satisfiable = false;
        for_each_assignment(&vars, &self.domain, |env| {
            if eval(expr, &vars, env) == Some(Value::Bool(true)) {
                satisfiable = true;
                return false;
            }
            true
        });
        trace!(expr = %expr, satisfiable, "bounded satisfiability");
        Ok(satisfiable)
    }

    fn implies_for_all(&self, condition: &Expr, consequence: &Expr) -> OracleResult<bool> {
        let vars = Vars::collect([condition, consequence]);
        let mut holds = true;
        for_each_assignment(&vars, &self.domain, |env| {
            if eval(condition, &vars, env) != Some(Value::Bool(true)) {
                return true;
            }
            // Assignments where the consequence is undefined (e.g. division
            // by zero) are vacuous rather than counterexamples.
            match eval(consequence, &vars, env) {
                Some(Value::Bool(false)) => {
                    holds = false;
                    false
                }
                _ => true,
            }
        });
        trace!(condition = %condition, consequence = %consequence, holds, "bounded implication");
        Ok(holds)
    }
}
