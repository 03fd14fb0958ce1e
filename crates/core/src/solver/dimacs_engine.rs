//! A [`Solver`] that dispatches to an external SAT engine over the standard
//! DIMACS CNF / SAT-competition-output protocol.
//!
//! The engine itself is explicitly out of scope here: we never link against
//! a solver's C API, we just shell out to whatever binary the caller points
//! us at (`cadical`, `kissat`, `minisat`, ...) and speak the format every
//! CDCL solver already understands. This keeps the engine a genuinely
//! external, non-reentrant, write-only collaborator, exactly as the rest of
//! this crate expects it to be.

use std::borrow::Cow;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

use log::{debug, info};

use crate::error::{EngineError, IoSnafu, NonZeroExitSnafu, SpawnSnafu};
use crate::lit::Lit;
use crate::solver::api::Solver;
use crate::solver::types::{LitValue, SolveResponse};
use snafu::ResultExt;

/// Dispatches `solve()` to an external SAT binary speaking DIMACS.
///
/// Clauses are accumulated in memory and only serialized to disk when
/// [`Solver::solve`] is called.
pub struct DimacsProcessEngine {
    command: PathBuf,
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
    model: Vec<bool>,
    last_response: SolveResponse,
}

impl DimacsProcessEngine {
    /// `command` is resolved via `PATH` (e.g. `"cadical"`, `"kissat"`), or
    /// may be an absolute path to a solver binary.
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            num_vars: 0,
            clauses: Vec::new(),
            model: Vec::new(),
            last_response: SolveResponse::Unknown,
        }
    }

    fn to_dimacs(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::new();
        writeln!(out, "p cnf {} {}", self.num_vars, self.clauses.len()).unwrap();
        for clause in &self.clauses {
            for lit in clause {
                write!(out, "{} ", lit).unwrap();
            }
            writeln!(out, "0").unwrap();
        }
        out
    }

    fn run_external(&self) -> Result<(SolveResponse, Vec<bool>), EngineError> {
        let dimacs = self.to_dimacs();

        let mut path = std::env::temp_dir();
        path.push(format!("equivcheck-{}.cnf", std::process::id()));
        {
            let mut f = std::fs::File::create(&path).context(IoSnafu)?;
            f.write_all(dimacs.as_bytes()).context(IoSnafu)?;
        }

        debug!("invoking '{}' on {}", self.command.display(), path.display());
        let output = Command::new(&self.command)
            .arg(&path)
            .output()
            .context(SpawnSnafu {
                command: self.command.display().to_string(),
            })?;
        let _ = std::fs::remove_file(&path);

        // Most SAT-competition solvers exit 10 (SAT) / 20 (UNSAT), not 0.
        let code = output.status.code().unwrap_or(-1);
        if code != 0 && code != 10 && code != 20 {
            return NonZeroExitSnafu {
                command: self.command.display().to_string(),
                status: code,
            }
            .fail();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_sat_output(&stdout, self.num_vars)
    }
}

fn parse_sat_output(stdout: &str, num_vars: usize) -> Result<(SolveResponse, Vec<bool>), EngineError> {
    let mut response = None;
    let mut model = vec![false; num_vars + 1];

    for line in stdout.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("s ") {
            response = Some(match rest.trim() {
                "SATISFIABLE" => SolveResponse::Sat,
                "UNSATISFIABLE" => SolveResponse::Unsat,
                _ => SolveResponse::Unknown,
            });
        } else if let Some(rest) = line.strip_prefix("v ") {
            for tok in rest.split_whitespace() {
                let lit: i32 = tok.parse().map_err(|_| EngineError::BadOutput {
                    reason: format!("non-integer literal in model line: '{tok}'"),
                })?;
                if lit == 0 {
                    continue;
                }
                let var = lit.unsigned_abs() as usize;
                if var <= num_vars {
                    model[var] = lit > 0;
                }
            }
        }
    }

    let response = response.ok_or_else(|| EngineError::BadOutput {
        reason: "no 's ...' status line found in engine output".to_string(),
    })?;
    Ok((response, model))
}

impl Solver for DimacsProcessEngine {
    fn signature(&self) -> Cow<str> {
        Cow::Owned(format!("DimacsProcessEngine({})", self.command.display()))
    }

    fn reset(&mut self) {
        self.num_vars = 0;
        self.clauses.clear();
        self.model.clear();
        self.last_response = SolveResponse::Unknown;
    }

    fn release(&mut self) {
        self.reset();
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    fn new_var(&mut self) -> Lit {
        self.num_vars += 1;
        Lit::new(self.num_vars as i32)
    }

    fn assume<L>(&mut self, lit: L)
    where
        L: Into<Lit>,
    {
        // Plain DIMACS has no assumption mechanism; fold the assumption in
        // as a unit clause for the next solve.
        self.add_unit(lit.into());
    }

    fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        let clause: Vec<Lit> = lits.into_iter().map(Into::into).collect();
        assert!(!clause.is_empty(), "clause must not be empty");
        self.clauses.push(clause);
    }

    fn solve(&mut self) -> SolveResponse {
        match self.run_external() {
            Ok((response, model)) => {
                info!("external engine returned {}", response);
                self.model = model;
                self.last_response = response;
                response
            }
            Err(err) => {
                info!("external engine failed: {}", err);
                self.last_response = SolveResponse::Unknown;
                SolveResponse::Unknown
            }
        }
    }

    fn value<L>(&self, lit: L) -> LitValue
    where
        L: Into<Lit>,
    {
        let lit = lit.into();
        let var = lit.var() as usize;
        match self.model.get(var) {
            Some(&value) => {
                let positive = lit.get() > 0;
                if value == positive {
                    LitValue::True
                } else {
                    LitValue::False
                }
            }
            None => LitValue::DontCare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sat_output_sat() {
        let stdout = "c comment\ns SATISFIABLE\nv 1 -2 3 0\n";
        let (response, model) = parse_sat_output(stdout, 3).unwrap();
        assert_eq!(response, SolveResponse::Sat);
        assert!(model[1]);
        assert!(!model[2]);
        assert!(model[3]);
    }

    #[test]
    fn test_parse_sat_output_unsat() {
        let stdout = "s UNSATISFIABLE\n";
        let (response, _model) = parse_sat_output(stdout, 0).unwrap();
        assert_eq!(response, SolveResponse::Unsat);
    }

    #[test]
    fn test_to_dimacs() {
        let mut engine = DimacsProcessEngine::new("cadical");
        let a = engine.new_var();
        let b = engine.new_var();
        engine.add_clause([a, -b]);
        let dimacs = engine.to_dimacs();
        assert!(dimacs.starts_with("p cnf 2 1\n"));
        assert!(dimacs.contains("1 -2 0"));
    }
}
