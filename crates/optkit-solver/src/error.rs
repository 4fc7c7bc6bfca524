//! Solver error types.
//!
//! These errors mean no solve was attempted, or the backend could not run at
//! all. Infeasible, unbounded and limit outcomes are reported through
//! [`crate::TerminationStatus`] instead.

/// Error type for solver operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No optimizer is attached to the problem.
    SolverUnavailable,
    /// Model has no variables.
    EmptyModel,
    /// No objective function set.
    NoObjective,
    /// A configuration value was rejected before solving.
    InvalidConfig { option: &'static str, reason: String },
    /// Backend-specific failure not covered by other variants.
    Internal(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::SolverUnavailable => "SOLVER_UNAVAILABLE",
            SolverError::EmptyModel => "MODEL_EMPTY",
            SolverError::NoObjective => "OBJECTIVE_MISSING",
            SolverError::InvalidConfig { .. } => "SOLVER_INVALID_CONFIG",
            SolverError::Internal(_) => "SOLVER_INTERNAL",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::SolverUnavailable => write!(
                f,
                "[{}] No optimizer configured for this problem",
                self.code()
            ),
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::NoObjective => write!(f, "[{}] Model has no objective", self.code()),
            SolverError::InvalidConfig { option, reason } => {
                write!(f, "[{}] Invalid {}: {}", self.code(), option, reason)
            }
            SolverError::Internal(msg) => {
                write!(f, "[{}] Solver internal error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}
