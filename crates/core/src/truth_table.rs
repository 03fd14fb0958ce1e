//! Dense truth-table representation of a combinational function.
//!
//! A function of `k` boolean inputs has `2^k` rows. For `k <= 6` the whole
//! table fits in a single `u64` mask (bit `i` of the mask is the table's
//! value on input combination `i`, input `0` being the least significant
//! bit of `i`). Wider functions fall back to a heap bit-vector.

use std::fmt::{Display, Formatter};

use crate::error::{CapacityError, NotAPowerOfTwoSnafu, ShapeError, SupportTooWideSnafu};
use snafu::ensure;

/// Inputs wider than this no longer fit in the inline `u64` representation.
pub const MAX_DENSE_INPUTS: usize = 6;

/// Hard ceiling on how wide a truth table's support may be before we refuse
/// to materialize it at all (2^32 rows would exhaust memory regardless of
/// representation).
pub const MAX_SUPPORT_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Storage {
    Mask(u64),
    Bits(Vec<u64>),
}

/// A function of `num_inputs` boolean variables, represented as `2^num_inputs`
/// output bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    num_inputs: usize,
    storage: Storage,
}

impl TruthTable {
    /// Builds a table from an explicit row-major bit sequence (`bits[i]` is
    /// the table's output on input combination `i`).
    pub fn from_bits(num_inputs: usize, bits: &[bool]) -> Result<Self, ShapeError> {
        let expected = 1usize << num_inputs;
        ensure!(bits.len() == expected, NotAPowerOfTwoSnafu { actual: bits.len() });
        if num_inputs <= MAX_DENSE_INPUTS {
            let mut mask: u64 = 0;
            for (i, &bit) in bits.iter().enumerate() {
                if bit {
                    mask |= 1u64 << i;
                }
            }
            Ok(Self {
                num_inputs,
                storage: Storage::Mask(mask),
            })
        } else {
            let mut words = vec![0u64; expected.div_ceil(64)];
            for (i, &bit) in bits.iter().enumerate() {
                if bit {
                    words[i / 64] |= 1u64 << (i % 64);
                }
            }
            Ok(Self {
                num_inputs,
                storage: Storage::Bits(words),
            })
        }
    }

    /// The constant-`value` table over `num_inputs` variables.
    pub fn constant(num_inputs: usize, value: bool) -> Self {
        if num_inputs <= MAX_DENSE_INPUTS {
            let rows = 1usize << num_inputs;
            let mask = if value && rows == 64 { u64::MAX } else if value { (1u64 << rows) - 1 } else { 0 };
            Self {
                num_inputs,
                storage: Storage::Mask(mask),
            }
        } else {
            let expected = 1usize << num_inputs;
            let word = if value { u64::MAX } else { 0 };
            Self {
                num_inputs,
                storage: Storage::Bits(vec![word; expected.div_ceil(64)]),
            }
        }
    }

    /// The projection function `f(x0, ..., xk-1) = x_index`.
    pub fn projection(num_inputs: usize, index: usize) -> Result<Self, CapacityError> {
        ensure!(
            num_inputs <= MAX_SUPPORT_WIDTH,
            SupportTooWideSnafu {
                size: num_inputs,
                max: MAX_SUPPORT_WIDTH,
            }
        );
        let rows = 1usize << num_inputs;
        let bits: Vec<bool> = (0..rows).map(|i| (i >> index) & 1 == 1).collect();
        Ok(Self::from_bits(num_inputs, &bits).expect("row count matches by construction"))
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_rows(&self) -> usize {
        1usize << self.num_inputs
    }

    pub fn bit(&self, row: usize) -> bool {
        debug_assert!(row < self.num_rows());
        match &self.storage {
            Storage::Mask(mask) => (mask >> row) & 1 == 1,
            Storage::Bits(words) => (words[row / 64] >> (row % 64)) & 1 == 1,
        }
    }

    /// Evaluates the table on an assignment of its inputs, bit `i` of
    /// `inputs` feeding variable `i`.
    pub fn eval(&self, inputs: usize) -> bool {
        self.bit(inputs & (self.num_rows() - 1))
    }

    pub fn is_all_zeros(&self) -> bool {
        match &self.storage {
            Storage::Mask(mask) => {
                let relevant = if self.num_rows() == 64 { u64::MAX } else { (1u64 << self.num_rows()) - 1 };
                mask & relevant == 0
            }
            Storage::Bits(words) => words.iter().all(|&w| w == 0),
        }
    }

    pub fn is_all_ones(&self) -> bool {
        match &self.storage {
            Storage::Mask(mask) => {
                let relevant = if self.num_rows() == 64 { u64::MAX } else { (1u64 << self.num_rows()) - 1 };
                mask & relevant == relevant
            }
            Storage::Bits(words) => {
                let full_words = self.num_rows() / 64;
                let rem = self.num_rows() % 64;
                words[..full_words].iter().all(|&w| w == u64::MAX)
                    && (rem == 0 || words[full_words] & ((1u64 << rem) - 1) == (1u64 << rem) - 1)
            }
        }
    }

    /// Which of the `num_inputs` variables this table's output actually
    /// depends on, found by comparing each row against its Hamming-1
    /// neighbour along that input axis.
    pub fn support(&self) -> Vec<usize> {
        (0..self.num_inputs)
            .filter(|&j| (0..self.num_rows()).any(|m| self.bit(m) != self.bit(m ^ (1 << j))))
            .collect()
    }

    /// Composes `child` with one parent table per one of `child`'s inputs,
    /// into a single dense table over the concatenation of the parents'
    /// inputs (parent order, each parent's own input order preserved
    /// within it). This is the one-shot dense alternative to building the
    /// same composition incrementally via [`crate::tree::TruthTableTree::concat`];
    /// both must agree on every input assignment (see the `test_merge_tables_*`
    /// tests below).
    ///
    /// `child.num_inputs()` must equal `parents.len()`; the combined arity
    /// `parents.iter().map(TruthTable::num_inputs).sum()` must not exceed
    /// [`MAX_SUPPORT_WIDTH`].
    pub fn merge_tables(child: &TruthTable, parents: &[TruthTable]) -> crate::error::Result<Self> {
        use crate::error::ChildCountMismatchSnafu;
        ensure!(
            child.num_inputs == parents.len(),
            ChildCountMismatchSnafu {
                expected: child.num_inputs,
                actual: parents.len(),
            }
        );

        let widths: Vec<usize> = parents.iter().map(|p| p.num_inputs).collect();
        let total: usize = widths.iter().sum();
        ensure!(total <= MAX_SUPPORT_WIDTH, SupportTooWideSnafu { size: total, max: MAX_SUPPORT_WIDTH });

        let rows = 1usize << total;
        let mut bits = Vec::with_capacity(rows);
        for r in 0..rows {
            let mut offset = 0;
            let mut child_row = 0usize;
            for (i, parent) in parents.iter().enumerate() {
                let w = widths[i];
                let segment = (r >> offset) & ((1usize << w) - 1);
                if parent.eval(segment) {
                    child_row |= 1 << i;
                }
                offset += w;
            }
            bits.push(child.eval(child_row));
        }
        Ok(Self::from_bits(total, &bits).expect("row count matches by construction"))
    }
}

impl Display for TruthTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in (0..self.num_rows()).rev() {
            write!(f, "{}", if self.bit(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_roundtrip() {
        let bits = [false, true, true, false];
        let table = TruthTable::from_bits(2, &bits).unwrap();
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(table.bit(i), b);
        }
    }

    #[test]
    fn test_constant() {
        let t = TruthTable::constant(3, true);
        assert!(t.is_all_ones());
        assert!(!t.is_all_zeros());
        let f = TruthTable::constant(3, false);
        assert!(f.is_all_zeros());
    }

    #[test]
    fn test_support_drops_unused_input() {
        // f(a, b, c) = a & b, independent of c
        let bits: Vec<bool> = (0..8).map(|i| (i & 1 == 1) && (i & 2 == 2)).collect();
        let table = TruthTable::from_bits(3, &bits).unwrap();
        assert_eq!(table.support(), vec![0, 1]);
    }

    #[test]
    fn test_merge_tables_same_arity() {
        // child = AND(p0, p1), each parent a 1-input identity function.
        let child = TruthTable::from_bits(2, &[false, false, false, true]).unwrap();
        let p0 = TruthTable::projection(1, 0).unwrap();
        let p1 = TruthTable::projection(1, 0).unwrap();
        let merged = TruthTable::merge_tables(&child, &[p0, p1]).unwrap();
        assert_eq!(merged.num_inputs(), 2);
        assert_eq!(merged.bit(0b00), false);
        assert_eq!(merged.bit(0b01), false);
        assert_eq!(merged.bit(0b10), false);
        assert_eq!(merged.bit(0b11), true);
    }

    #[test]
    fn test_merge_tables_differing_arity() {
        // child(y0, y1) = y0 XOR y1.
        // parent 0: f(a) = a               (arity 1)
        // parent 1: g(b, c) = b & c         (arity 2)
        // merged(a, b, c) = a XOR (b & c)
        let child = TruthTable::from_bits(2, &[false, true, true, false]).unwrap();
        let p0 = TruthTable::projection(1, 0).unwrap();
        let p1 = TruthTable::from_bits(2, &[false, false, false, true]).unwrap();
        let merged = TruthTable::merge_tables(&child, &[p0, p1]).unwrap();
        assert_eq!(merged.num_inputs(), 3);
        for a in 0..2usize {
            for b in 0..2usize {
                for c in 0..2usize {
                    let row = a | (b << 1) | (c << 2);
                    let expected = (a == 1) ^ ((b == 1) && (c == 1));
                    assert_eq!(merged.bit(row), expected, "a={a} b={b} c={c}");
                }
            }
        }
    }

    #[test]
    fn test_merge_tables_rejects_arity_mismatch() {
        let child = TruthTable::projection(1, 0).unwrap();
        let parents = [TruthTable::projection(1, 0).unwrap(), TruthTable::projection(1, 0).unwrap()];
        assert!(TruthTable::merge_tables(&child, &parents).is_err());
    }

    #[test]
    fn test_wide_table() {
        let num_inputs = 8;
        let bits: Vec<bool> = (0..(1usize << num_inputs)).map(|i| i == (1usize << num_inputs) - 1).collect();
        let table = TruthTable::from_bits(num_inputs, &bits).unwrap();
        assert!(!table.is_all_ones());
        assert!(table.bit((1usize << num_inputs) - 1));
        assert!(!table.bit(0));
    }
}
