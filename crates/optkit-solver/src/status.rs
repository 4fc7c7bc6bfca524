//! Termination status types.

use serde::{Deserialize, Serialize};

/// Outcome of a solve, normalized from whatever the backend reports.
///
/// Non-optimal outcomes are values, not errors: callers inspect the status
/// before querying results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationStatus {
    /// Optimal solution found.
    Optimal,
    /// Problem is infeasible.
    Infeasible,
    /// Problem is unbounded.
    Unbounded,
    /// A time or iteration limit stopped the solver (may carry a feasible point).
    Timeout,
    /// The solver failed or returned a status with no better classification.
    Error,
}

impl TerminationStatus {
    /// Check if the status indicates an optimal solution.
    pub fn is_optimal(self) -> bool {
        matches!(self, TerminationStatus::Optimal)
    }

    /// Check if the status indicates infeasibility.
    pub fn is_infeasible(self) -> bool {
        matches!(self, TerminationStatus::Infeasible)
    }

    /// Check if the status indicates unboundedness.
    pub fn is_unbounded(self) -> bool {
        matches!(self, TerminationStatus::Unbounded)
    }

    /// Check if a limit stopped the solver.
    pub fn is_timeout(self) -> bool {
        matches!(self, TerminationStatus::Timeout)
    }

    /// Statuses that may come with a primal point.
    pub fn may_have_solution(self) -> bool {
        matches!(self, TerminationStatus::Optimal | TerminationStatus::Timeout)
    }

    /// Get a human-readable string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationStatus::Optimal => "optimal",
            TerminationStatus::Infeasible => "infeasible",
            TerminationStatus::Unbounded => "unbounded",
            TerminationStatus::Timeout => "timeout",
            TerminationStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
