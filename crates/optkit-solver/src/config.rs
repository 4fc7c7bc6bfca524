//! Solver configuration types.

use crate::SolverError;

/// Configuration options for solver behavior.
///
/// Every field is optional; `None` leaves the backend default in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Wall-clock time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance. `None` uses solver default.
    pub mip_gap: Option<f64>,
    /// Verbosity level; 0 silences the backend. `None` uses solver default.
    pub verbosity: Option<u32>,
    /// Enable/disable presolve. `None` uses solver default.
    pub presolve: Option<bool>,
    /// Number of threads to use. `None` uses solver default.
    pub threads: Option<u32>,
    /// Primal and dual feasibility tolerance. `None` uses solver default.
    pub tolerance: Option<f64>,
    /// Print solver diagnostics to the console. Defaults to off.
    pub log_to_console: Option<bool>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Whether solver diagnostics should reach the console.
    pub fn is_verbose(&self) -> bool {
        self.log_to_console.unwrap_or(false) || self.verbosity.unwrap_or(0) > 0
    }

    /// Reject values no backend can honor.
    pub fn validate(&self) -> Result<(), SolverError> {
        if let Some(limit) = self.time_limit
            && (limit.is_nan() || limit <= 0.0)
        {
            return Err(SolverError::InvalidConfig {
                option: "time_limit",
                reason: format!("must be positive (got {limit})"),
            });
        }
        if let Some(gap) = self.mip_gap
            && (!gap.is_finite() || gap < 0.0)
        {
            return Err(SolverError::InvalidConfig {
                option: "mip_gap",
                reason: format!("must be finite and non-negative (got {gap})"),
            });
        }
        if let Some(tol) = self.tolerance
            && (!tol.is_finite() || tol <= 0.0)
        {
            return Err(SolverError::InvalidConfig {
                option: "tolerance",
                reason: format!("must be finite and positive (got {tol})"),
            });
        }
        if self.threads == Some(0) {
            return Err(SolverError::InvalidConfig {
                option: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.mip_gap.is_none()
            && self.verbosity.is_none()
            && self.presolve.is_none()
            && self.threads.is_none()
            && self.tolerance.is_none()
            && self.log_to_console.is_none()
    }
}
