// src/error.rs - Error taxonomy for the traversal planner

use thiserror::Error;

/// Errors surfaced by section construction, traversal queries, and the
/// calculators.
///
/// Infeasibility of an individual planning case is *not* an error: the
/// section factory signals it with `Ok(None)` and the calculator falls
/// through to the next case. Only invalid caller input and internal
/// invariant violations reach this type.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// The caller supplied a physically meaningless argument
    /// (negative distance, out-of-range query time, bad limit signs, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested plan is impossible, or an internal invariant that
    /// should have been guaranteed by an earlier case was violated.
    #[error("traversal calculation failed: {0}")]
    Calculation(String),
}

pub type Result<T> = std::result::Result<T, TraversalError>;
