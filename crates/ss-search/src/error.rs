//! Search-subsystem error type.

use thiserror::Error;

use ss_core::NodeId;

/// Errors produced by `ss-search`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The open set drained without reaching the goal — disconnected
    /// component, or every feasible branch was pruned.
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    /// Wall-clock budget exceeded.  No partial result is emitted.
    #[error("search exceeded its {budget_ms} ms budget")]
    Timeout { budget_ms: u64 },

    /// The caller's cancellation token fired.
    #[error("search cancelled")]
    Cancelled,

    /// Invariant violation inside the search itself (e.g. a cycle during
    /// path reconstruction).  Indicates a bug, not bad input.
    #[error("internal search error: {0}")]
    Internal(String),
}

pub type SearchResult<T> = Result<T, SearchError>;
