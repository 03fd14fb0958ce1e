//! External collaborator traits this crate depends on but never implements
//! for real: an actual netlist comes from elaborating RTL or reading a
//! gate-level format, and neither is this crate's job. [`Netlist`] and
//! [`CellLibrary`] are the seam a real front end plugs into; [`InMemoryNetlist`]
//! is a minimal in-memory implementation used by tests, examples, and the
//! `check` CLI's own tiny textual fixture format.

use std::collections::HashMap;

use crate::truth_table::TruthTable;

pub type NodeId = u32;

/// What drives a cell's input pin or a primary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// Tied directly to one of the design's primary inputs.
    PrimaryInput(usize),
    /// Driven by the (single) output of a combinational cell.
    Node(NodeId),
    /// A zero-input, multi-output cell's port — treated as an atomic free
    /// variable rather than expanded, since it has nothing upstream to
    /// expand into.
    FreeVar(NodeId, usize),
    /// The output of a sequential cell (flip-flop, latch, ...) — a cut
    /// point, since its value isn't a combinational function of the
    /// current-cycle primary inputs.
    SequentialOutput(NodeId, usize),
}

/// A fully elaborated, flat (post-hierarchy-flattening) combinational/
/// sequential netlist.
pub trait Netlist {
    fn nodes(&self) -> Vec<NodeId>;
    fn cell_kind(&self, node: NodeId) -> &str;
    fn num_inputs(&self, node: NodeId) -> usize;
    fn num_outputs(&self, node: NodeId) -> usize;
    fn input_driver(&self, node: NodeId, port: usize) -> Driver;
    fn hierarchical_path(&self, node: NodeId) -> Vec<String>;

    fn primary_input_count(&self) -> usize;
    fn primary_input_path(&self, index: usize) -> Vec<String>;

    fn primary_output_count(&self) -> usize;
    fn primary_output_path(&self, index: usize) -> Vec<String>;
    fn primary_output_driver(&self, index: usize) -> Driver;
}

/// Per-cell-kind combinational/sequential semantics. Kept separate from
/// [`Netlist`] because a cell library is shared across many netlists (a
/// process design kit) while a netlist instance is not.
pub trait CellLibrary {
    /// `Some(table)` for a purely combinational cell of this kind;
    /// `None` for a sequential or black-box cell.
    fn truth_table(&self, kind: &str, num_inputs: usize) -> Option<TruthTable>;

    fn is_sequential(&self, kind: &str) -> bool;
}

/// A trivial in-memory [`Netlist`] + [`CellLibrary`] pair, built directly
/// from Rust values. Good enough to drive the checker end-to-end in tests
/// without writing a netlist parser, which is explicitly out of scope.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNetlist {
    pub cells: HashMap<NodeId, CellInstance>,
    pub primary_inputs: Vec<Vec<String>>,
    pub primary_outputs: Vec<(Vec<String>, Driver)>,
}

#[derive(Debug, Clone)]
pub struct CellInstance {
    pub kind: String,
    pub path: Vec<String>,
    pub num_outputs: usize,
    pub input_drivers: Vec<Driver>,
}

impl InMemoryNetlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, id: NodeId, kind: impl Into<String>, path: Vec<String>, input_drivers: Vec<Driver>) {
        self.cells.insert(
            id,
            CellInstance {
                kind: kind.into(),
                path,
                num_outputs: 1,
                input_drivers,
            },
        );
    }

    pub fn add_primary_input(&mut self, path: Vec<String>) -> usize {
        self.primary_inputs.push(path);
        self.primary_inputs.len() - 1
    }

    pub fn add_primary_output(&mut self, path: Vec<String>, driver: Driver) {
        self.primary_outputs.push((path, driver));
    }
}

impl Netlist for InMemoryNetlist {
    fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.cells.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn cell_kind(&self, node: NodeId) -> &str {
        &self.cells[&node].kind
    }

    fn num_inputs(&self, node: NodeId) -> usize {
        self.cells[&node].input_drivers.len()
    }

    fn num_outputs(&self, node: NodeId) -> usize {
        self.cells[&node].num_outputs
    }

    fn input_driver(&self, node: NodeId, port: usize) -> Driver {
        self.cells[&node].input_drivers[port]
    }

    fn hierarchical_path(&self, node: NodeId) -> Vec<String> {
        self.cells[&node].path.clone()
    }

    fn primary_input_count(&self) -> usize {
        self.primary_inputs.len()
    }

    fn primary_input_path(&self, index: usize) -> Vec<String> {
        self.primary_inputs[index].clone()
    }

    fn primary_output_count(&self) -> usize {
        self.primary_outputs.len()
    }

    fn primary_output_path(&self, index: usize) -> Vec<String> {
        self.primary_outputs[index].0.clone()
    }

    fn primary_output_driver(&self, index: usize) -> Driver {
        self.primary_outputs[index].1
    }
}

/// A library keyed on cell-kind name, built directly from Rust values.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCellLibrary {
    pub combinational: HashMap<String, TruthTable>,
    pub sequential_kinds: Vec<String>,
}

impl InMemoryCellLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_combinational(&mut self, kind: impl Into<String>, table: TruthTable) {
        self.combinational.insert(kind.into(), table);
    }

    pub fn add_sequential(&mut self, kind: impl Into<String>) {
        self.sequential_kinds.push(kind.into());
    }
}

impl CellLibrary for InMemoryCellLibrary {
    fn truth_table(&self, kind: &str, num_inputs: usize) -> Option<TruthTable> {
        let table = self.combinational.get(kind)?;
        debug_assert_eq!(table.num_inputs(), num_inputs);
        Some(table.clone())
    }

    fn is_sequential(&self, kind: &str) -> bool {
        self.sequential_kinds.iter().any(|k| k == kind)
    }
}

/// The hierarchical identity of whatever drives a pin: a primary input's own
/// path, or the node it came from. Two cones (possibly from two different
/// netlists) that resolve to the same path refer to the same signal.
pub fn driver_path(netlist: &impl Netlist, driver: Driver) -> Vec<String> {
    match driver {
        Driver::PrimaryInput(index) => netlist.primary_input_path(index),
        Driver::Node(id) | Driver::FreeVar(id, _) | Driver::SequentialOutput(id, _) => netlist.hierarchical_path(id),
    }
}

/// A small library of common two-input gates, for tests and examples.
pub fn standard_cell_library() -> InMemoryCellLibrary {
    let mut lib = InMemoryCellLibrary::new();
    lib.add_combinational("BUF", TruthTable::projection(1, 0).unwrap());
    lib.add_combinational("NOT", TruthTable::from_bits(1, &[true, false]).unwrap());
    lib.add_combinational("AND2", TruthTable::from_bits(2, &[false, false, false, true]).unwrap());
    lib.add_combinational("NAND2", TruthTable::from_bits(2, &[true, true, true, false]).unwrap());
    lib.add_combinational("OR2", TruthTable::from_bits(2, &[false, true, true, true]).unwrap());
    lib.add_combinational("XOR2", TruthTable::from_bits(2, &[false, true, true, false]).unwrap());
    lib.add_sequential("DFF");
    lib
}
