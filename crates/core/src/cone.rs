//! Builds a [`TruthTableTree`] backward from a single output, fanning in
//! through combinational cells and stopping at cut points: primary inputs,
//! sequential-cell boundaries, and zero-input multi-output "free variable"
//! cells.
//!
//! Expansion proceeds one gate at a time via [`TruthTableTree::concat`]
//! rather than building a single flat truth table for the whole cone: each
//! iteration looks at the tree's current border leaves, expands the first
//! one whose driver is still a combinational cell, and re-reads the border
//! leaf list from scratch afterwards, since splicing shifts every later
//! leaf's position.

use std::collections::HashMap;

use crate::error::{ConeTooLargeSnafu, EquivError};
use crate::netlist::{CellLibrary, Driver, Netlist, NodeId};
use crate::truth_table::TruthTable;
use crate::tree::TruthTableTree;
use snafu::ensure;

/// A cone's tree together with what each of its remaining free inputs
/// actually is in the source netlist, so callers can match them up across
/// two netlists being compared.
pub struct LogicCone {
    pub tree: TruthTableTree,
    pub leaf_drivers: Vec<Driver>,
}

fn is_expandable(netlist: &impl Netlist, lib: &impl CellLibrary, node: NodeId) -> Option<TruthTable> {
    let kind = netlist.cell_kind(node);
    if lib.is_sequential(kind) {
        return None;
    }
    lib.truth_table(kind, netlist.num_inputs(node))
}

/// Builds the logic cone rooted at `root_driver`, expanding cells until
/// every remaining free input is a genuine cut point, or `max_inputs` is
/// exceeded.
pub fn build_cone(
    netlist: &impl Netlist,
    lib: &impl CellLibrary,
    root_driver: Driver,
    max_inputs: usize,
) -> Result<LogicCone, EquivError> {
    let mut ext_to_driver: HashMap<usize, Driver> = HashMap::new();

    let root_table = match root_driver {
        Driver::Node(id) => match is_expandable(netlist, lib, id) {
            Some(table) => table,
            None => TruthTable::projection(1, 0).expect("1-input projection always constructible"),
        },
        _ => TruthTable::projection(1, 0).expect("1-input projection always constructible"),
    };
    let mut tree = TruthTableTree::new(root_table);

    match root_driver {
        Driver::Node(id) if is_expandable(netlist, lib, id).is_some() => {
            for port in 0..netlist.num_inputs(id) {
                ext_to_driver.insert(port, netlist.input_driver(id, port));
            }
        }
        other => {
            ext_to_driver.insert(0, other);
        }
    }

    loop {
        let leaves = tree.external_inputs();
        ensure!(
            leaves.len() <= max_inputs,
            ConeTooLargeSnafu {
                output: "<cone>".to_string(),
                max: max_inputs,
            }
        );

        let next = leaves.iter().enumerate().find_map(|(border_index, ext_index)| match ext_to_driver.get(ext_index) {
            Some(Driver::Node(id)) => is_expandable(netlist, lib, *id).map(|table| (border_index, *id, table)),
            _ => None,
        });

        match next {
            None => break,
            Some((border_index, id, table)) => {
                let new_ext_indices = tree.concat(border_index, table)?;
                for (port, new_ext) in new_ext_indices.into_iter().enumerate() {
                    ext_to_driver.insert(new_ext, netlist.input_driver(id, port));
                }
            }
        }
    }

    let leaves = tree.external_inputs();
    let leaf_drivers = leaves
        .iter()
        .map(|ext| *ext_to_driver.get(ext).expect("every remaining leaf was seeded with a driver"))
        .collect();

    Ok(LogicCone { tree, leaf_drivers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{standard_cell_library, InMemoryNetlist};

    #[test]
    fn test_nand_cone_matches_not_and() {
        // top = NAND2(pi0, pi1)
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "NAND2", vec!["top".into(), "g0".into()], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_primary_input(vec!["a".into()]);
        net.add_primary_input(vec!["b".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(0));

        let lib = standard_cell_library();
        let cone = build_cone(&net, &lib, net.primary_output_driver(0), 24).unwrap();
        assert_eq!(cone.leaf_drivers.len(), 2);

        assert!(cone.tree.eval(&[false, false]));
        assert!(cone.tree.eval(&[true, false]));
        assert!(!cone.tree.eval(&[true, true]));
    }

    #[test]
    fn test_cone_stops_at_sequential_boundary() {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "DFF", vec!["top".into(), "ff0".into()], vec![Driver::PrimaryInput(0)]);
        net.add_cell(1, "NOT", vec!["top".into(), "g0".into()], vec![Driver::Node(0)]);
        net.add_primary_input(vec!["d".into()]);
        net.add_primary_output(vec!["y".into()], Driver::Node(1));

        let lib = standard_cell_library();
        let cone = build_cone(&net, &lib, net.primary_output_driver(0), 24).unwrap();
        // NOT expands, but its input (the DFF output) must not be expanded further.
        assert_eq!(cone.leaf_drivers.len(), 1);
        assert!(matches!(cone.leaf_drivers[0], Driver::Node(0)));
    }

    #[test]
    fn test_cone_too_large_is_capacity_error() {
        let mut net = InMemoryNetlist::new();
        net.add_cell(0, "AND2", vec![], vec![Driver::PrimaryInput(0), Driver::PrimaryInput(1)]);
        net.add_primary_output(vec!["y".into()], Driver::Node(0));

        let lib = standard_cell_library();
        let err = build_cone(&net, &lib, net.primary_output_driver(0), 1).unwrap_err();
        assert!(matches!(err, EquivError::Capacity { .. }));
    }
}
