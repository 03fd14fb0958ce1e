//! A deterministic in-memory solver used by tests and by callers that only
//! want to exercise CNF construction without dispatching to an external
//! engine.
//!
//! [`MockSolver`] accepts clauses unconditionally and reports `Sat` with an
//! all-false model. It never actually searches for a satisfying assignment;
//! swap in [`super::DimacsProcessEngine`] (or any other [`Solver`]) to get a
//! real verdict.

use std::borrow::Cow;

use crate::lit::Lit;
use crate::solver::api::Solver;
use crate::solver::types::{LitValue, SolveResponse};

#[derive(Debug, Default)]
pub struct MockSolver {
    num_vars: usize,
    num_clauses: usize,
    pub clauses: Vec<Vec<Lit>>,
}

impl MockSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Solver for MockSolver {
    fn signature(&self) -> Cow<str> {
        Cow::Borrowed("MockSolver")
    }

    fn reset(&mut self) {
        self.num_vars = 0;
        self.num_clauses = 0;
        self.clauses.clear();
    }

    fn release(&mut self) {
        self.reset();
    }

    fn num_vars(&self) -> usize {
        self.num_vars
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }

    fn new_var(&mut self) -> Lit {
        self.num_vars += 1;
        Lit::new(self.num_vars as i32)
    }

    fn assume<L>(&mut self, _lit: L)
    where
        L: Into<Lit>,
    {
    }

    fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator,
        I::Item: Into<Lit>,
    {
        let clause = lits.into_iter().map(Into::into).collect();
        self.clauses.push(clause);
        self.num_clauses += 1;
    }

    fn solve(&mut self) -> SolveResponse {
        SolveResponse::Sat
    }

    fn value<L>(&self, _lit: L) -> LitValue
    where
        L: Into<Lit>,
    {
        LitValue::False
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_solver() {
        let mut solver = MockSolver::new();
        let a = solver.new_var();
        let b = solver.new_var();
        solver.add_clause([a, -b]);
        assert_eq!(solver.num_vars(), 2);
        assert_eq!(solver.num_clauses(), 1);
        assert_eq!(solver.solve(), SolveResponse::Sat);
    }
}
