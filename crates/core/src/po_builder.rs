//! Collects one [`BoolExpr`] per primary output, in a stable order derived
//! from hierarchical path rather than declaration order, so two netlists
//! whose outputs were elaborated in a different order still line up.
//!
//! Each output's expression is built from its own [`LogicCone`], with every
//! leaf's variable chosen through a [`GlobalVarAllocator`] keyed on
//! [`driver_path`] — so an input shared by path across two different
//! netlists collapses onto the same variable, rather than needing a
//! separate normalization pass afterwards.

use std::collections::HashMap;

use crate::cone::build_cone;
use crate::convert::tree_to_bool_expr_with;
use crate::error::Result;
use crate::expr::BoolExpr;
use crate::netlist::{driver_path, CellLibrary, Netlist};

/// Assigns a stable global variable id to each distinct hierarchical path
/// seen across however many netlists share this allocator. Built once and
/// threaded through every [`build_primary_output_clauses`] call that needs
/// to agree on variable identity (comparing two netlists means calling this
/// twice against the same allocator).
#[derive(Debug, Default)]
pub struct GlobalVarAllocator {
    next: u32,
    pub by_path: HashMap<Vec<String>, u32>,
}

impl GlobalVarAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_alloc(&mut self, path: &[String]) -> u32 {
        if let Some(&v) = self.by_path.get(path) {
            return v;
        }
        let v = self.next;
        self.next += 1;
        self.by_path.insert(path.to_vec(), v);
        v
    }
}

/// One primary output's comparison-ready expression, plus enough of its
/// cone's leaf identities to later explain a counterexample.
pub struct PrimaryOutputClause {
    pub output_path: Vec<String>,
    pub expr: BoolExpr,
    /// Global variable id -> hierarchical path, for every leaf this
    /// output's cone actually depends on.
    pub leaf_paths: HashMap<u32, Vec<String>>,
}

/// Builds one [`PrimaryOutputClause`] per primary output of `netlist`,
/// ordered by hierarchical path. `allocator` is shared across both sides of
/// a comparison so that matching input paths resolve to the same variable.
pub fn build_primary_output_clauses(
    netlist: &impl Netlist,
    lib: &impl CellLibrary,
    max_cone_inputs: usize,
    allocator: &mut GlobalVarAllocator,
) -> Result<Vec<PrimaryOutputClause>> {
    let mut indices: Vec<usize> = (0..netlist.primary_output_count()).collect();
    indices.sort_by_key(|&i| netlist.primary_output_path(i));

    let mut clauses = Vec::with_capacity(indices.len());
    for index in indices {
        let output_path = netlist.primary_output_path(index);
        let driver = netlist.primary_output_driver(index);
        let cone = build_cone(netlist, lib, driver, max_cone_inputs)?;

        let mut leaf_paths = HashMap::new();
        let ext_indices = cone.tree.external_inputs();
        let mut var_of_ext: HashMap<usize, u32> = HashMap::with_capacity(ext_indices.len());
        for (i, ext_index) in ext_indices.into_iter().enumerate() {
            let path = driver_path(netlist, cone.leaf_drivers[i]);
            let global_var = allocator.get_or_alloc(&path);
            var_of_ext.insert(ext_index, global_var);
            leaf_paths.insert(global_var, path);
        }

        let expr = tree_to_bool_expr_with(&cone.tree, |ext_index| var_of_ext[&ext_index])?;
        clauses.push(PrimaryOutputClause { output_path, expr, leaf_paths });
    }

    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{standard_cell_library, Driver, InMemoryNetlist};

    #[test]
    fn test_single_output_clause_matches_gate() {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "AND2", vec!["top".into(), "g0".into()], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_primary_input(vec!["a".into()]);
        net.add_primary_input(vec!["b".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(0));

        let lib = standard_cell_library();
        let mut allocator = GlobalVarAllocator::new();
        let clauses = build_primary_output_clauses(&net, &lib, 24, &mut allocator).unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].output_path, vec!["y".to_string()]);

        let a_var = allocator.by_path[&vec!["a".to_string()]];
        let b_var = allocator.by_path[&vec!["b".to_string()]];
        assert!(clauses[0].expr.eval(&|i| i == a_var || i == b_var));
        assert!(!clauses[0].expr.eval(&|i| i == a_var));
    }

    #[test]
    fn test_outputs_ordered_by_path_not_declaration() {
        let mut net = InMemoryNetlist::new();
        net.add_primary_output(vec!["z".into()], Driver::PrimaryInput(0));
        net.add_primary_output(vec!["a".into()], Driver::PrimaryInput(0));
        net.add_primary_input(vec!["in".into()]);

        let lib = standard_cell_library();
        let mut allocator = GlobalVarAllocator::new();
        let clauses = build_primary_output_clauses(&net, &lib, 24, &mut allocator).unwrap();
        assert_eq!(clauses[0].output_path, vec!["a".to_string()]);
        assert_eq!(clauses[1].output_path, vec!["z".to_string()]);
    }

    #[test]
    fn test_shared_input_path_reuses_variable_across_allocator_calls() {
        let mut net_a = InMemoryNetlist::new();
        net_a.add_primary_input(vec!["a".into()]);
        net_a.add_primary_output(vec!["y".into()], Driver::PrimaryInput(0));

        let mut net_b = InMemoryNetlist::new();
        net_b.add_primary_input(vec!["a".into()]);
        net_b.add_primary_output(vec!["y".into()], Driver::PrimaryInput(0));

        let lib = standard_cell_library();
        let mut allocator = GlobalVarAllocator::new();
        let clauses_a = build_primary_output_clauses(&net_a, &lib, 24, &mut allocator).unwrap();
        let clauses_b = build_primary_output_clauses(&net_b, &lib, 24, &mut allocator).unwrap();

        assert!(clauses_a[0].expr.ptr_eq(&clauses_b[0].expr));
    }
}
