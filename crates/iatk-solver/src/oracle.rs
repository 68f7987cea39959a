//! The oracle trait and its error type.

use iatk_expr::Expr;
use thiserror::Error;
use tracing::debug;

/// Oracle failure. Every variant is fatal for the construction that issued
/// the query: the engines never retry and never degrade to a guess.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("required solver tools missing from PATH: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("solver call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("failed to run solver process: {0}")]
    Io(#[from] std::io::Error),

    #[error("solver process exited with failure: {stderr}")]
    Process { stderr: String },

    #[error("unexpected solver response: {response:?}")]
    Malformed { response: String },
}

pub type OracleResult<T> = Result<T, OracleError>;

/// Answers satisfiability and universal-implication questions over guard
/// expressions. Implementations are synchronous; a call may block on an
/// external process round-trip.
pub trait ConstraintOracle {
    /// Is there an assignment satisfying `expr`?
    fn is_satisfiable(&self, expr: &Expr) -> OracleResult<bool>;

    /// Does `condition` entail `consequence` for every assignment?
    fn implies_for_all(&self, condition: &Expr, consequence: &Expr) -> OracleResult<bool>;

    /// Names of external binaries required but absent, for the fail-fast
    /// check engines run before any traversal.
    fn missing_tools(&self) -> Vec<String> {
        Vec::new()
    }

    /// Is the conjunction of `exprs` satisfiable? A member that folds to a
    /// constant `false` settles the answer without touching the solver.
    fn is_satisfiable_conjunction(&self, exprs: &[Expr]) -> OracleResult<bool> {
        for expr in exprs {
            if expr.fold_bool() == Some(false) {
                debug!(expr = %expr, "conjunction member folds to false");
                return Ok(false);
            }
        }
        self.is_satisfiable(&Expr::and_all(exprs.to_vec()))
    }
}
