//! SMT solver backend over an external process.
//!
//! Scripts are written to the solver's standard input and the verdict is read
//! back as a single `sat`/`unsat` (or `true`/`false`) token. Calls carry a
//! timeout; an overrunning solver is killed and reported as a distinct
//! failure instead of blocking the construction forever.

use crate::oracle::{ConstraintOracle, OracleError, OracleResult};
use crate::toolpath;
use iatk_expr::{check_sat_script, forall_implies_script, negated_implies_script, Expr};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// How universal implications are put to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpliesEncoding {
    /// Quantify all constants: `(forall (...) (=> cond cons))`, valid iff `sat`.
    Forall,
    /// Negate the consequence: `cond ∧ ¬cons`, valid iff `unsat`.
    NegatedSat,
}

/// Configuration for the subprocess oracle.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Solver binary name or path.
    pub binary: String,
    /// Arguments putting the solver into read-from-stdin mode.
    pub args: Vec<String>,
    /// Per-call timeout.
    pub timeout: Duration,
    pub implies_encoding: ImpliesEncoding,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            binary: "z3".to_string(),
            args: vec!["-in".to_string()],
            timeout: Duration::from_secs(10),
            implies_encoding: ImpliesEncoding::Forall,
        }
    }
}

/// Oracle backed by an external SMT solver process.
pub struct SmtProcessOracle {
    config: SolverConfig,
    resolved: Option<PathBuf>,
}

impl SmtProcessOracle {
    pub fn new(config: SolverConfig) -> Self {
        let resolved = toolpath::find_in_path(&config.binary);
        debug!(binary = %config.binary, found = resolved.is_some(), "resolved solver binary");
        Self { config, resolved }
    }

    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    fn run_script(&self, script: &str) -> OracleResult<String> {
        let path = self
            .resolved
            .as_ref()
            .ok_or_else(|| OracleError::MissingTools(vec![self.config.binary.clone()]))?;

        trace!(script, "solver query");
        let mut child = Command::new(path)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes())?;
            // Dropping the handle closes the pipe so the solver sees EOF.
        }

        let deadline = Instant::now() + self.config.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(OracleError::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(Duration::from_millis(5));
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)?;
        }

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                pipe.read_to_string(&mut stderr)?;
            }
            return Err(OracleError::Process {
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout.trim().to_string())
    }

    fn parse_verdict(&self, response: &str) -> OracleResult<bool> {
        match response {
            "sat" | "true" => Ok(true),
            "unsat" | "false" => Ok(false),
            other => Err(OracleError::Malformed {
                response: other.to_string(),
            }),
        }
    }
}

impl ConstraintOracle for SmtProcessOracle {
    fn is_satisfiable(&self, expr: &Expr) -> OracleResult<bool> {
        // Literal-only guards never reach the process.
        if let Some(value) = expr.fold_bool() {
            debug!(expr = %expr, value, "satisfiability folded");
            return Ok(value);
        }
        let response = self.run_script(&check_sat_script(expr))?;
        self.parse_verdict(&response)
    }

    fn implies_for_all(&self, condition: &Expr, consequence: &Expr) -> OracleResult<bool> {
        match self.config.implies_encoding {
            ImpliesEncoding::Forall => {
                let response = self.run_script(&forall_implies_script(condition, consequence))?;
                self.parse_verdict(&response)
            }
            ImpliesEncoding::NegatedSat => {
                let response = self.run_script(&negated_implies_script(condition, consequence))?;
                self.parse_verdict(&response).map(|sat| !sat)
            }
        }
    }

    fn missing_tools(&self) -> Vec<String> {
        if self.resolved.is_none() {
            vec![self.config.binary.clone()]
        } else {
            Vec::new()
        }
    }
}
