//! Converts a [`TruthTableTree`] into a [`BoolExpr`], pruning each table
//! down to the inputs it actually depends on before expanding it as a
//! sum of minterms.
//!
//! Traversal is iterative post-order (explicit stack, no recursion) and
//! memoized by tree-node index, matching [`crate::expr::BoolExpr::eval`]'s
//! traversal shape: a cone with thousands of nested tables must not blow
//! the call stack, and a table referenced indirectly through multiple
//! `concat` splices should only be converted once.

use crate::error::{CapacityError, SupportTooWideSnafu};
use crate::expr::BoolExpr;
use crate::tree::{Node, TruthTableTree};
use crate::truth_table::{TruthTable, MAX_SUPPORT_WIDTH};
use snafu::ensure;

/// Converts using each leaf's raw tree-local external-input index as its
/// [`BoolExpr::var`] id. Good enough for a single, standalone cone; a miter
/// comparing two netlists needs [`tree_to_bool_expr_with`] instead, so that
/// matched primary inputs on both sides become the same variable.
pub fn tree_to_bool_expr(tree: &TruthTableTree) -> Result<BoolExpr, CapacityError> {
    tree_to_bool_expr_with(tree, |ext_index| ext_index as u32)
}

/// Converts `tree`, mapping each leaf's tree-local external-input index to
/// a caller-chosen global variable id via `var_of`.
pub fn tree_to_bool_expr_with(tree: &TruthTableTree, var_of: impl Fn(usize) -> u32) -> Result<BoolExpr, CapacityError> {
    enum Frame {
        Enter(usize),
        Exit(usize),
    }

    let mut memo: Vec<Option<BoolExpr>> = vec![None; tree.num_nodes()];
    let mut stack = vec![Frame::Enter(tree.root_index())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(index) => match tree.node_at(index) {
                Node::Input { ext_index } => {
                    memo[index] = Some(BoolExpr::var(var_of(*ext_index)));
                }
                Node::Table { children, .. } => {
                    stack.push(Frame::Exit(index));
                    for &child in children {
                        stack.push(Frame::Enter(child));
                    }
                }
            },
            Frame::Exit(index) => {
                if let Node::Table { table, children } = tree.node_at(index) {
                    let child_exprs: Vec<BoolExpr> = children
                        .iter()
                        .map(|&c| memo[c].clone().expect("child converted before parent in post-order"))
                        .collect();
                    memo[index] = Some(convert_table_node(table, &child_exprs)?);
                }
            }
        }
    }

    Ok(memo[tree.root_index()].clone().expect("root must be converted"))
}

/// Support-pruned sum-of-minterms conversion of a single table node, given
/// its children already converted to [`BoolExpr`].
fn convert_table_node(table: &TruthTable, child_exprs: &[BoolExpr]) -> Result<BoolExpr, CapacityError> {
    if table.is_all_zeros() {
        return Ok(BoolExpr::constant(false));
    }
    if table.is_all_ones() {
        return Ok(BoolExpr::constant(true));
    }

    let relevant = table.support();
    if relevant.is_empty() {
        // Every row agrees but neither all-0 nor all-1 can't happen for a
        // well-formed table; fail safe the way the dense-table conversion
        // in the original design does.
        return Ok(BoolExpr::constant(false));
    }

    ensure!(
        relevant.len() <= MAX_SUPPORT_WIDTH,
        SupportTooWideSnafu {
            size: relevant.len(),
            max: MAX_SUPPORT_WIDTH,
        }
    );

    let mut minterms = Vec::new();
    for combo in 0..(1usize << relevant.len()) {
        let mut packed = 0usize;
        for (bit_pos, &input_index) in relevant.iter().enumerate() {
            if (combo >> bit_pos) & 1 == 1 {
                packed |= 1 << input_index;
            }
        }
        if table.eval(packed) {
            let literals: Vec<BoolExpr> = relevant
                .iter()
                .enumerate()
                .map(|(bit_pos, &input_index)| {
                    let var = child_exprs[input_index].clone();
                    if (combo >> bit_pos) & 1 == 1 {
                        var
                    } else {
                        BoolExpr::not(var)
                    }
                })
                .collect();
            minterms.push(BoolExpr::and(literals));
        }
    }

    Ok(if minterms.is_empty() {
        BoolExpr::constant(false)
    } else {
        BoolExpr::or(minterms)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn eval_expr(expr: &BoolExpr, assignment: &HashMap<u32, bool>) -> bool {
        expr.eval(&|i| *assignment.get(&i).unwrap_or(&false))
    }

    #[test]
    fn test_and_gate_converts_and_evaluates() {
        // f(a, b) = a & b
        let table = TruthTable::from_bits(2, &[false, false, false, true]).unwrap();
        let tree = TruthTableTree::new(table);
        let expr = tree_to_bool_expr(&tree).unwrap();

        let mut assign = HashMap::new();
        assign.insert(0, true);
        assign.insert(1, true);
        assert!(eval_expr(&expr, &assign));

        assign.insert(1, false);
        assert!(!eval_expr(&expr, &assign));
    }

    #[test]
    fn test_support_pruning_drops_unused_input() {
        // f(a, b, c) = a & b, independent of c: the converted expression
        // must never reference variable 2 (c's external index).
        let bits: Vec<bool> = (0..8).map(|i| (i & 1 == 1) && (i & 2 == 2)).collect();
        let table = TruthTable::from_bits(3, &bits).unwrap();
        let tree = TruthTableTree::new(table);
        let expr = tree_to_bool_expr(&tree).unwrap();

        // If c were referenced, flipping it while holding a=b=true would
        // change eval(); it must not.
        let val_c0 = expr.eval(&|i| i == 0 || i == 1);
        let val_c1 = expr.eval(&|i| i == 0 || i == 1 || i == 2);
        assert_eq!(val_c0, val_c1);
        assert!(val_c0);
    }

    #[test]
    fn test_constant_folding_xor_self() {
        // f(a) = a ^ a = 0, across the tree converter too.
        let table = TruthTable::constant(1, false);
        let tree = TruthTableTree::new(table);
        let expr = tree_to_bool_expr(&tree).unwrap();
        assert!(expr.is_const(false));
    }
}
