//! Builds and dispatches the miter: the classic combinational-equivalence
//! construction that XORs each pair of matched primary outputs together and
//! ORs the results, so the miter is satisfiable exactly when some input
//! assignment makes the two netlists disagree.
//!
//! Tseitin-encodes the miter expression into CNF (every gate, `Not` included,
//! introduces one fresh variable and a small clause template enforcing its
//! equivalence to the gate), hands it to a [`Solver`], and turns the verdict
//! back into which primary outputs actually differ and under what input
//! assignment.

use std::collections::HashMap;

use crate::error::{EquivError, InputDataError};
use crate::expr::BoolExpr;
use crate::lit::Lit;
use crate::netlist::{CellLibrary, Netlist};
use crate::po_builder::{build_primary_output_clauses, GlobalVarAllocator, PrimaryOutputClause};
use crate::solver::{Solver, SolveResponse};

/// The result of comparing two netlists.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every primary output is the same Boolean function of the (matched)
    /// primary inputs.
    Equivalent,
    /// At least one primary output differs; `differing_outputs` names every
    /// one the solver's model disagreed on, `witness` one input assignment
    /// that reproduces the disagreement.
    Different {
        differing_outputs: Vec<Vec<String>>,
        witness: HashMap<Vec<String>, bool>,
    },
    /// The two netlists aren't comparable as given (primary output count or
    /// path mismatch) — not a verdict about their logic, a refusal to
    /// compare at all.
    NonComparable { reason: String },
    /// The SAT engine gave up without a definite answer.
    Unknown,
}

/// Compares `net_a` against `net_b`, expanding cones up to `max_cone_inputs`
/// inputs each and dispatching the resulting miter to `solver`.
pub fn check_equivalence(
    net_a: &impl Netlist,
    lib_a: &impl CellLibrary,
    net_b: &impl Netlist,
    lib_b: &impl CellLibrary,
    solver: &mut impl Solver,
    max_cone_inputs: usize,
) -> Result<Verdict, EquivError> {
    let mut allocator = GlobalVarAllocator::new();
    let clauses_a = build_primary_output_clauses(net_a, lib_a, max_cone_inputs, &mut allocator)?;
    let clauses_b = build_primary_output_clauses(net_b, lib_b, max_cone_inputs, &mut allocator)?;

    if clauses_a.len() != clauses_b.len() {
        return Err(InputDataError::PrimaryOutputCountMismatch {
            lhs: "lhs".to_string(),
            lhs_count: clauses_a.len(),
            rhs: "rhs".to_string(),
            rhs_count: clauses_b.len(),
        }
        .into());
    }

    let matched = match match_outputs(clauses_a, clauses_b) {
        Ok(matched) => matched,
        Err(path) => return Ok(Verdict::NonComparable { reason: format!("no matching primary output for path {path}") }),
    };

    let diffs: Vec<(Vec<String>, BoolExpr)> = matched
        .into_iter()
        .map(|(path, a, b)| {
            let d = BoolExpr::xor([a, b]);
            (path, d)
        })
        .collect();

    let miter_expr = BoolExpr::or(diffs.iter().map(|(_, d)| d.clone()));

    if miter_expr.is_const(false) {
        return Ok(Verdict::Equivalent);
    }

    let mut var_lits: HashMap<u32, Lit> = HashMap::new();
    let (miter_lit, node_lits) = tseitin_encode(&miter_expr, solver, &mut var_lits);
    solver.add_unit(miter_lit);

    match solver.solve() {
        SolveResponse::Unsat => Ok(Verdict::Equivalent),
        SolveResponse::Unknown => Ok(Verdict::Unknown),
        SolveResponse::Sat => {
            let mut differing_outputs = Vec::new();
            for (path, d) in &diffs {
                let lit = node_lits.get(&d.ptr_id()).copied().expect("every diff is a direct child of the encoded miter OR");
                if solver.value(lit).bool() {
                    differing_outputs.push(path.clone());
                }
            }

            let mut witness = HashMap::new();
            for (path, &global_var) in allocator.by_path.iter() {
                if let Some(&lit) = var_lits.get(&global_var) {
                    witness.insert(path.clone(), solver.value(lit).bool());
                }
            }

            Ok(Verdict::Different { differing_outputs, witness })
        }
    }
}

/// Pairs up clauses from both sides by output path, failing on the first
/// path present on one side only.
fn match_outputs(clauses_a: Vec<PrimaryOutputClause>, clauses_b: Vec<PrimaryOutputClause>) -> Result<Vec<(Vec<String>, BoolExpr, BoolExpr)>, String> {
    let mut by_path_b: HashMap<Vec<String>, BoolExpr> = clauses_b.into_iter().map(|c| (c.output_path, c.expr)).collect();

    let mut pairs = Vec::with_capacity(clauses_a.len());
    for clause_a in clauses_a {
        let expr_b = by_path_b.remove(&clause_a.output_path).ok_or_else(|| clause_a.output_path.join("/"))?;
        pairs.push((clause_a.output_path, clause_a.expr, expr_b));
    }
    if let Some((path, _)) = by_path_b.into_iter().next() {
        return Err(path.join("/"));
    }
    Ok(pairs)
}

/// Iterative (explicit-stack) Tseitin encoding of `expr` into `solver`,
/// memoized by node identity so a DAG with shared sub-expressions only gets
/// encoded once. Returns the root's literal together with the full memo
/// table, so a caller can look up the literal for any sub-expression it
/// still holds a handle to (used here to read back each per-output XOR's
/// truth value from the model without re-encoding it).
fn tseitin_encode(expr: &BoolExpr, solver: &mut impl Solver, var_lits: &mut HashMap<u32, Lit>) -> (Lit, HashMap<usize, Lit>) {
    use crate::expr::ExprNode;

    enum Frame {
        Enter(BoolExpr),
        Exit(BoolExpr),
    }

    let mut node_lits: HashMap<usize, Lit> = HashMap::new();
    let mut true_lit: Option<Lit> = None;
    let mut stack = vec![Frame::Enter(expr.clone())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                if node_lits.contains_key(&node.ptr_id()) {
                    continue;
                }
                let children: Vec<&BoolExpr> = match node.node() {
                    ExprNode::Var(_) | ExprNode::Const(_) => vec![],
                    ExprNode::Not(a) => vec![a],
                    ExprNode::And(args) | ExprNode::Or(args) | ExprNode::Xor(args) => args.iter().collect(),
                };
                stack.push(Frame::Exit(node.clone()));
                for child in children {
                    if !node_lits.contains_key(&child.ptr_id()) {
                        stack.push(Frame::Enter(child.clone()));
                    }
                }
            }
            Frame::Exit(node) => {
                let key = node.ptr_id();
                if node_lits.contains_key(&key) {
                    continue;
                }
                let lit = match node.node() {
                    ExprNode::Var(i) => *var_lits.entry(*i).or_insert_with(|| solver.new_var()),
                    ExprNode::Const(true) => *true_lit.get_or_insert_with(|| {
                        let l = solver.new_var();
                        solver.add_unit(l);
                        l
                    }),
                    ExprNode::Const(false) => {
                        let t = *true_lit.get_or_insert_with(|| {
                            let l = solver.new_var();
                            solver.add_unit(l);
                            l
                        });
                        -t
                    }
                    ExprNode::Not(a) => {
                        let x = node_lits[&a.ptr_id()];
                        let z = solver.new_var();
                        solver.add_clause(vec![-z, -x]);
                        solver.add_clause(vec![z, x]);
                        z
                    }
                    ExprNode::And(args) => {
                        let xs: Vec<Lit> = args.iter().map(|a| node_lits[&a.ptr_id()]).collect();
                        let z = solver.new_var();
                        let mut at_least = vec![z];
                        at_least.extend(xs.iter().map(|&x| -x));
                        solver.add_clause(at_least);
                        for &x in &xs {
                            solver.add_clause(vec![-z, x]);
                        }
                        z
                    }
                    ExprNode::Or(args) => {
                        let xs: Vec<Lit> = args.iter().map(|a| node_lits[&a.ptr_id()]).collect();
                        let z = solver.new_var();
                        let mut at_most = vec![-z];
                        at_most.extend(xs.iter().copied());
                        solver.add_clause(at_most);
                        for &x in &xs {
                            solver.add_clause(vec![z, -x]);
                        }
                        z
                    }
                    ExprNode::Xor(args) => {
                        let xs: Vec<Lit> = args.iter().map(|a| node_lits[&a.ptr_id()]).collect();
                        let mut acc = xs[0];
                        for &x in &xs[1..] {
                            acc = binary_xor_tseitin(solver, acc, x);
                        }
                        acc
                    }
                };
                node_lits.insert(key, lit);
            }
        }
    }

    let root_lit = node_lits[&expr.ptr_id()];
    (root_lit, node_lits)
}

/// `z <=> (a XOR b)`, as four clauses.
fn binary_xor_tseitin(solver: &mut impl Solver, a: Lit, b: Lit) -> Lit {
    let z = solver.new_var();
    solver.add_clause(vec![-z, a, b]);
    solver.add_clause(vec![-z, -a, -b]);
    solver.add_clause(vec![z, a, -b]);
    solver.add_clause(vec![z, -a, b]);
    z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{standard_cell_library, Driver, InMemoryNetlist};
    use crate::solver::mock::MockSolver;

    fn nand_via_not_and() -> InMemoryNetlist {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "AND2", vec!["top".into(), "g0".into()], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_cell(1, "NOT", vec!["top".into(), "g1".into()], vec![Driver::Node(0)]);
        net.add_primary_input(vec!["a".into()]);
        net.add_primary_input(vec!["b".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(1));
        net
    }

    fn nand_direct() -> InMemoryNetlist {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "NAND2", vec!["top".into(), "g0".into()], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_primary_input(vec!["a".into()]);
        net.add_primary_input(vec!["b".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(0));
        net
    }

    fn different_and() -> InMemoryNetlist {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "OR2", vec!["top".into(), "g0".into()], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_primary_input(vec!["a".into()]);
        net.add_primary_input(vec!["b".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(0));
        net
    }

    #[test]
    fn test_equivalent_nand_is_detected_without_solver_for_folded_case() {
        // NOT(AND(a,b)) vs NAND(a,b): the miter folds straight to Const(false)
        // once both cones are converted, since NOT∘AND and NAND are the very
        // same BoolExpr shape once interned — no SAT call should be needed,
        // but we still dispatch through a real (mock) solver path to cover it.
        let net_a = nand_via_not_and();
        let net_b = nand_direct();
        let lib = standard_cell_library();
        let mut solver = MockSolver::new();
        let verdict = check_equivalence(&net_a, &lib, &net_b, &lib, &mut solver, 24).unwrap();
        assert_eq!(verdict, Verdict::Equivalent);
    }

    #[test]
    fn test_different_gates_are_reported_different_with_witness() {
        use crate::solver::{LitValue, Solver as _};

        struct AlwaysSat {
            num_vars: usize,
        }
        impl Solver for AlwaysSat {
            fn signature(&self) -> std::borrow::Cow<str> {
                "always-sat".into()
            }
            fn reset(&mut self) {}
            fn release(&mut self) {}
            fn num_vars(&self) -> usize {
                self.num_vars
            }
            fn num_clauses(&self) -> usize {
                0
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
            fn add_clause<I>(&mut self, _lits: I)
            where
                I: IntoIterator,
                I::Item: Into<Lit>,
            {
            }
            fn solve(&mut self) -> SolveResponse {
                SolveResponse::Sat
            }
            fn value<L>(&self, _lit: L) -> LitValue
            where
                L: Into<Lit>,
            {
                LitValue::True
            }
        }

        let net_a = different_and();
        let net_b = nand_direct();
        let lib = standard_cell_library();
        let mut solver = AlwaysSat { num_vars: 0 };
        let verdict = check_equivalence(&net_a, &lib, &net_b, &lib, &mut solver, 24).unwrap();
        match verdict {
            Verdict::Different { differing_outputs, .. } => {
                assert_eq!(differing_outputs, vec![vec!["y".to_string()]]);
            }
            other => panic!("expected Different, got {other:?}"),
        }
    }

    #[test]
    fn test_output_path_mismatch_is_non_comparable() {
        let mut net_a = InMemoryNetlist::new();
        net_a.add_primary_input(vec!["a".into()]);
        net_a.add_primary_output(vec!["y".into()], Driver::PrimaryInput(0));

        let mut net_b = InMemoryNetlist::new();
        net_b.add_primary_input(vec!["a".into()]);
        net_b.add_primary_output(vec!["z".into()], Driver::PrimaryInput(0));

        let lib = standard_cell_library();
        let mut solver = MockSolver::new();
        let verdict = check_equivalence(&net_a, &lib, &net_b, &lib, &mut solver, 24).unwrap();
        assert!(matches!(verdict, Verdict::NonComparable { .. }));
    }
}
