//! Error types shared by the grammar, turtle, and terrain generators.

use thiserror::Error;

/// Failures raised by forest generation.
///
/// Structural faults (unbalanced brackets, out-of-range grid access) are fatal:
/// the offending pass is aborted rather than patched over, since a silently
/// clamped index or ignored pop would corrupt the generated geometry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenError {
    /// A `]` was interpreted with no matching `[` on the stack.
    #[error("unmatched ']' at symbol index {index}: pop on empty turtle stack")]
    UnbalancedPop { index: usize },

    /// A `[` would have pushed past the configured stack limit.
    #[error("turtle stack exceeded maximum depth {max_depth} at symbol index {index}")]
    StackOverflow { index: usize, max_depth: usize },

    /// Requested more rewriting iterations than the configured hard cap.
    #[error("iteration count {requested} exceeds maximum {max}")]
    IterationLimit { requested: u32, max: u32 },

    /// The rewritten string outgrew the configured length cap.
    #[error("expanded string length {len} exceeds maximum {max}")]
    ExpansionTooLarge { len: usize, max: usize },

    /// Heightfield sizes must be 2^k + 1 so midpoint subdivision terminates
    /// exactly on integer indices.
    #[error("grid size {0} is not of the form 2^k + 1 (k >= 1)")]
    InvalidGridSize(usize),

    /// An interior seed names a cell outside the grid.
    #[error("seed cell ({column}, {row}) lies outside the {size}x{size} grid")]
    SeedOutOfBounds {
        column: usize,
        row: usize,
        size: usize,
    },

    /// A continuous height lookup fell outside the grid extent.
    #[error("height query ({x}, {z}) lies outside the grid extent")]
    QueryOutOfBounds { x: f32, z: f32 },

    /// Stochastic production weights for a symbol do not partition [0, 1).
    #[error("production weights for '{symbol}' sum to {total}, expected 1.0")]
    InvalidRuleWeights { symbol: char, total: f32 },
}
