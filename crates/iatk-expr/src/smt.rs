//! Rendering expressions to the SMT-LIB subset spoken by the oracle.
//!
//! Primed variable references denote post-state values and become fresh
//! solver-side constants (`__z_t<N>`); the unprimed declaration is always
//! registered alongside so both states are visible to the solver.

use crate::expr::{BinOp, Expr, ExprKind, VarType};
use ahash::AHashMap;
use std::fmt::Write;

/// One solver-side constant derived from a variable reference.
#[derive(Debug, Clone)]
pub struct SmtDecl {
    /// Name used in the emitted script.
    pub smt_name: String,
    /// Declared type of the underlying variable.
    pub ty: VarType,
    /// Whether this constant stands for the primed (post-state) reference.
    pub primed: bool,
}

impl SmtDecl {
    fn sort(&self) -> &'static str {
        if self.ty.is_bool() {
            "Bool"
        } else {
            "Int"
        }
    }
}

/// Declarations collected from one or more expressions, in first-reference
/// order so emitted scripts are deterministic.
#[derive(Debug, Default)]
pub struct DeclIndex {
    entries: Vec<SmtDecl>,
    lookup: AHashMap<(String, bool), usize>,
}

impl DeclIndex {
    /// Collect every variable reference in the given expressions.
    pub fn collect<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> Self {
        let mut index = Self::default();
        for expr in exprs {
            index.visit(expr);
        }
        index
    }

    fn visit(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Var { decl, primed } => {
                // The unprimed constant is always registered first.
                self.register(&decl.name, &decl.ty, false);
                if *primed {
                    self.register(&decl.name, &decl.ty, true);
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

    fn register(&mut self, name: &str, ty: &VarType, primed: bool) {
        let key = (name.to_string(), primed);
        if self.lookup.contains_key(&key) {
            return;
        }
        let smt_name = if primed {
            format!("__z_t{}", self.entries.iter().filter(|e| e.primed).count())
        } else {
            name.to_string()
        };
        self.lookup.insert(key, self.entries.len());
        self.entries.push(SmtDecl {
            smt_name,
            ty: ty.clone(),
            primed,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmtDecl> {
        self.entries.iter()
    }

    fn smt_name(&self, name: &str, primed: bool) -> &str {
        // References outside the collected set cannot occur: the index was
        // built from the same expressions being rendered.
        let idx = self.lookup[&(name.to_string(), primed)];
        &self.entries[idx].smt_name
    }
}

/// Render an expression as an S-expression against the collected declarations.
pub fn render(expr: &Expr, decls: &DeclIndex) -> String {
    match &expr.kind {
        ExprKind::Int(n) => {
            if *n < 0 {
                format!("(- {})", n.unsigned_abs())
            } else {
                n.to_string()
            }
        }
        ExprKind::Bool(b) => b.to_string(),
        // Enumeration members are encoded as their zero-based index.
        ExprKind::EnumMember { ty, member } => ty
            .member_index(member)
            .map(|i| i.to_string())
            .unwrap_or_else(|| "0".to_string()),
        ExprKind::Var { decl, primed } => decls.smt_name(&decl.name, *primed).to_string(),
        ExprKind::Not(inner) => format!("(not {})", render(inner, decls)),
        ExprKind::Group(inner) => render(inner, decls),
        ExprKind::Binary { op, left, right } => {
            let lhs = render(left, decls);
            let rhs = render(right, decls);
            match op {
                BinOp::And => format!("(and {lhs} {rhs})"),
                BinOp::Or => format!("(or {lhs} {rhs})"),
                BinOp::Implies => format!("(=> {lhs} {rhs})"),
                BinOp::Eq => format!("(= {lhs} {rhs})"),
                BinOp::Ne => format!("(not (= {lhs} {rhs}))"),
                BinOp::Gt => format!("(> {lhs} {rhs})"),
                BinOp::Ge => format!("(>= {lhs} {rhs})"),
                BinOp::Lt => format!("(< {lhs} {rhs})"),
                BinOp::Le => format!("(<= {lhs} {rhs})"),
                BinOp::Add => format!("(+ {lhs} {rhs})"),
                BinOp::Sub => format!("(- {lhs} {rhs})"),
                BinOp::Mul => format!("(* {lhs} {rhs})"),
                BinOp::Div => format!("(/ {lhs} {rhs})"),
                BinOp::Mod => format!("(% {lhs} {rhs})"),
            }
        }
    }
}

/// Script asking whether the expression is satisfiable.
pub fn check_sat_script(expr: &Expr) -> String {
    let decls = DeclIndex::collect([expr]);
    let body = render(expr, &decls);
    assemble(&decls, &body)
}

/// Script asking whether `condition` implies `consequence` for all variable
/// values, via a universally quantified implication. The solver answers `sat`
/// exactly when the closed formula is valid.
pub fn forall_implies_script(condition: &Expr, consequence: &Expr) -> String {
    let decls = DeclIndex::collect([condition, consequence]);
    let body = format!(
        "(=> {} {})",
        render(condition, &decls),
        render(consequence, &decls)
    );
    if decls.is_empty() {
        return format!("(assert {body})\n(check-sat)");
    }
    let mut params = String::new();
    for decl in decls.iter() {
        let _ = write!(params, "({} {})", decl.smt_name, decl.sort());
    }
    format!("(assert (forall ({params}) {body}))\n(check-sat)")
}

/// Script encoding the same implication by negating the consequence; the
/// implication holds exactly when the solver answers `unsat`.
pub fn negated_implies_script(condition: &Expr, consequence: &Expr) -> String {
    let decls = DeclIndex::collect([condition, consequence]);
    let body = format!(
        "(and {} (not {}))",
        render(condition, &decls),
        render(consequence, &decls)
    );
    assemble(&decls, &body)
}

fn assemble(decls: &DeclIndex, body: &str) -> String {
    let mut script = String::new();
    for decl in decls.iter() {
        let _ = writeln!(script, "(declare-const {} {})", decl.smt_name, decl.sort());
    }
    let _ = writeln!(script, "(assert {body})");
    script.push_str("(check-sat)");
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Decl, EnumType, Span};
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

    #[test]
    fn test_render_operators() {
        let decls = DeclIndex::collect([&xv()]);
        assert_eq!(render(&Expr::ne(xv(), int(1)), &decls), "(not (= x 1))");
        assert_eq!(render(&Expr::modulo(xv(), int(2)), &decls), "(% x 2)");
        assert_eq!(render(&int(-5), &decls), "(- 5)");
    }

    #[test]
    fn test_enum_member_renders_as_index() {
        let coin = Arc::new(EnumType::new("Coin", ["C1", "C2"]));
        let e = Expr::eq(
            Expr::var(
                Arc::new(Decl::enumeration("c", coin.clone())),
                false,
                Span::dummy(),
            ),
            Expr::enum_member(coin, "C2", Span::dummy()),
        );
        let decls = DeclIndex::collect([&e]);
        assert_eq!(render(&e, &decls), "(= c 1)");
    }

    #[test]
    fn test_primed_reference_gets_fresh_constant() {
        let e = Expr::gt(xp(), xv());
        let decls = DeclIndex::collect([&e]);
        let names: Vec<&str> = decls.iter().map(|d| d.smt_name.as_str()).collect();
        assert_eq!(names, ["x", "__z_t0"]);
        assert_eq!(render(&e, &decls), "(> __z_t0 x)");
    }

    #[test]
    fn test_check_sat_script_shape() {
        let script = check_sat_script(&Expr::ge(xv(), int(0)));
        assert_eq!(
            script,
            "(declare-const x Int)\n(assert (>= x 0))\n(check-sat)"
        );
    }

    #[test]
    fn test_forall_script_quantifies_all_decls() {
        let script = forall_implies_script(&Expr::ge(xv(), int(0)), &Expr::gt(xp(), xv()));
        assert_eq!(
            script,
            "(assert (forall ((x Int)(__z_t0 Int)) (=> (>= x 0) (> __z_t0 x))))\n(check-sat)"
        );
    }

    #[test]
    fn test_forall_script_without_decls_is_plain_assert() {
        let script = forall_implies_script(
            &Expr::const_bool(true, Span::dummy()),
            &Expr::const_bool(true, Span::dummy()),
        );
        assert_eq!(script, "(assert (=> true true))\n(check-sat)");
    }

    #[test]
    fn test_negated_script_shape() {
        let script = negated_implies_script(&Expr::gt(xv(), int(0)), &Expr::ge(xv(), int(0)));
        assert_eq!(
            script,
            "(declare-const x Int)\n(assert (and (> x 0) (not (>= x 0))))\n(check-sat)"
        );
    }

    #[test]
    fn test_bool_sort() {
        let flag = Arc::new(Decl::boolean("flag"));
        let e = Expr::var(flag, false, Span::dummy());
        let script = check_sat_script(&e);
        assert_eq!(
            script,
            "(declare-const flag Bool)\n(assert flag)\n(check-sat)"
        );
    }
}
