//! Error types for the core.
//!
//! Ordinary infeasibility is never an error — it is a normal
//! [`crate::problem::SolveMessage::Infeasible`] value. This enum is reserved for
//! the "internal failure" class described by the external-interface error
//! message: invariant violations and other unexpected conditions.

use thiserror::Error;

/// Internal failures the core can surface.
///
/// The exact-cover engine itself is total (it returns an empty solution set
/// rather than erroring on a legitimate dead end); these variants exist only
/// for programming-error invariant violations and malformed input that
/// cannot be treated as an ordinary infeasibility reason.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The board's dimensions or holes are not self-consistent.
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// A tile type's shape is empty or otherwise malformed.
    #[error("invalid tile type {name:?}: {reason}")]
    InvalidTileType { name: String, reason: String },

    /// The request payload is structurally invalid (e.g. a balanced-mode
    /// `balance` block missing required fields).
    #[error("invalid solve request: {0}")]
    InvalidRequest(String),

    /// A placement's covered cell was found in a cell index that does not
    /// belong to the free set — this can only happen if the enumerator's
    /// bookkeeping (`byCell` reverse index) is internally inconsistent.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Result alias used throughout the core.
pub type SolveResult<T> = Result<T, SolveError>;
