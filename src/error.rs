//! Engine errors: bad static configuration and invalid-state programming errors.

use thiserror::Error;

/// Errors raised by the game core. Blocked moves are not errors; see `collision::is_valid`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("shape {shape}: rotation {rotation} must be {expected_rows} rows of {expected_cols} '*'/'.' cells")]
    MaskSize {
        shape: char,
        rotation: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("shape {0} has no rotation states")]
    NoRotations(char),

    #[error("catalog has no definition for shape {0}")]
    MissingShape(char),

    #[error("shape {shape}: rotation {rotation} has no occupied cells")]
    EmptyMask { shape: char, rotation: usize },

    #[error("fall-speed table is empty")]
    EmptyFallTable,

    #[error("invalid fall interval {0:?} (expected positive seconds)")]
    FallTable(String),

    #[error("grid must be at least 1x1 (got {rows} rows, {columns} columns)")]
    GridDimensions { rows: usize, columns: usize },
}
