//! Error taxonomy for the equivalence-checking pipeline.
//!
//! Four independent families, matching how a failure should be handled by
//! the caller:
//!
//! - [`ShapeError`]: a structural mismatch (wrong arity, wrong child count)
//!   detected while building a single value. Always fatal to the operation
//!   that raised it.
//! - [`CapacityError`]: a resource ceiling (too many inputs for a dense
//!   truth table, too many variables for a single cone) was exceeded.
//!   Fatal to the cone being built, but the caller may still report
//!   `Unknown` for that output and keep going.
//! - [`InputDataError`]: the two netlists being compared don't line up
//!   (PI/PO count or path mismatch). Contaminates the overall verdict to
//!   [`crate::miter::Verdict::NonComparable`] rather than aborting outright.
//! - [`EngineError`]: the external SAT engine failed or returned garbage.
//!   Always an unrecoverable infrastructure failure.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ShapeError {
    #[snafu(display("truth table row count {actual} is not a power of two"))]
    NotAPowerOfTwo { actual: usize },

    #[snafu(display("expected {expected} children, got {actual}"))]
    ChildCountMismatch { expected: usize, actual: usize },

    #[snafu(display("border index {index} out of range (tree has {num_borders} border leaves)"))]
    BorderIndexOutOfRange { index: usize, num_borders: usize },

    #[snafu(display("concat_full expects {expected} tables, got {actual}"))]
    ConcatFullArityMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CapacityError {
    #[snafu(display("support size {size} exceeds the maximum of {max} inputs for a dense truth table"))]
    SupportTooWide { size: usize, max: usize },

    #[snafu(display("logic cone for output {output} exceeds the variable cap of {max}"))]
    ConeTooLarge { output: String, max: usize },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum InputDataError {
    #[snafu(display("primary input count mismatch: {lhs} has {lhs_count}, {rhs} has {rhs_count}"))]
    PrimaryInputCountMismatch {
        lhs: String,
        lhs_count: usize,
        rhs: String,
        rhs_count: usize,
    },

    #[snafu(display("primary output count mismatch: {lhs} has {lhs_count}, {rhs} has {rhs_count}"))]
    PrimaryOutputCountMismatch {
        lhs: String,
        lhs_count: usize,
        rhs: String,
        rhs_count: usize,
    },

    #[snafu(display("no common primary input path matches {path}"))]
    UnmatchedInputPath { path: String },

    #[snafu(display("no common primary output path matches {path}"))]
    UnmatchedOutputPath { path: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(display("failed to spawn SAT engine '{command}': {source}"))]
    Spawn { command: String, source: std::io::Error },

    #[snafu(display("SAT engine '{command}' exited with status {status}"))]
    NonZeroExit { command: String, status: i32 },

    #[snafu(display("could not parse SAT engine output: {reason}"))]
    BadOutput { reason: String },

    #[snafu(display("I/O error while talking to the SAT engine: {source}"))]
    Io { source: std::io::Error },
}

/// Top-level error returned by the driving operations in [`crate::miter`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EquivError {
    #[snafu(display("shape error: {source}"))]
    Shape { source: ShapeError },

    #[snafu(display("capacity error: {source}"))]
    Capacity { source: CapacityError },

    #[snafu(display("input data error: {source}"))]
    InputData { source: InputDataError },

    #[snafu(display("engine error: {source}"))]
    Engine { source: EngineError },
}

impl From<ShapeError> for EquivError {
    fn from(source: ShapeError) -> Self {
        EquivError::Shape { source }
    }
}

impl From<CapacityError> for EquivError {
    fn from(source: CapacityError) -> Self {
        EquivError::Capacity { source }
    }
}

impl From<InputDataError> for EquivError {
    fn from(source: InputDataError) -> Self {
        EquivError::InputData { source }
    }
}

impl From<EngineError> for EquivError {
    fn from(source: EngineError) -> Self {
        EquivError::Engine { source }
    }
}

pub type Result<T, E = EquivError> = std::result::Result<T, E>;
