//! Optimizer trait and the solve entry points.
//!
//! A backend implements [`Optimizer`]; a [`Problem`] owns at most one and
//! delegates to it from [`Problem::optimize`]. Whatever the backend reports
//! is stored as a [`SolveResult`] on the problem and read back through the
//! query methods.

use std::collections::BTreeMap;
use std::time::Instant;

use optkit_solver::{SolutionView, SolverConfig, SolverError, TerminationStatus};

use crate::Problem;

/// Trait that all solver backends must implement.
pub trait Optimizer {
    /// Short backend name, e.g. `"highs"`.
    fn name(&self) -> &str;

    /// Solve the problem and return a solver-agnostic result.
    ///
    /// Infeasible, unbounded and limit outcomes are `Ok` results carrying the
    /// matching [`TerminationStatus`]; `Err` means the solve could not run.
    fn optimize(
        &mut self,
        problem: &Problem,
        config: &SolverConfig,
    ) -> Result<SolveResult, SolverError>;
}

/// Solver-agnostic outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Normalized termination status.
    pub status: TerminationStatus,
    /// Objective value including the objective constant, when available.
    pub objective_value: Option<f64>,
    /// Primal values of variables indexed by their internal position.
    pub primal_values: Vec<f64>,
    /// Dual values of variables (reduced costs) indexed by their internal position.
    pub reduced_costs: Vec<f64>,
    /// Row activity values (constraint LHS evaluated at the solution) indexed by constraint position.
    pub row_values: Vec<f64>,
    /// Dual values of constraints (shadow prices) indexed by their internal position.
    pub row_duals: Vec<f64>,
    /// Solve time in seconds.
    pub solve_time_seconds: f64,
    /// Backend that produced the result.
    pub solver_name: String,
    /// Solver-agnostic metadata (e.g., iteration counts, gaps).
    pub metadata: BTreeMap<String, f64>,
}

impl SolveResult {
    /// A result with a status and nothing else, for outcomes without a point.
    pub fn without_solution(status: TerminationStatus, solver_name: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            primal_values: Vec::new(),
            reduced_costs: Vec::new(),
            row_values: Vec::new(),
            row_duals: Vec::new(),
            solve_time_seconds: 0.0,
            solver_name: solver_name.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> &'static str {
        self.status.as_str()
    }

    fn check_shape(&self, problem: &Problem) -> Result<(), SolverError> {
        if !self.status.may_have_solution() || self.primal_values.is_empty() {
            return Ok(());
        }
        let mismatch = |what: &str, got: usize, want: usize| {
            SolverError::Internal(format!("{what} has {got} entries, expected {want}"))
        };
        let vars = problem.num_variables();
        let rows = problem.num_constraints();
        if self.primal_values.len() != vars {
            return Err(mismatch("primal vector", self.primal_values.len(), vars));
        }
        if !self.reduced_costs.is_empty() && self.reduced_costs.len() != vars {
            return Err(mismatch("reduced cost vector", self.reduced_costs.len(), vars));
        }
        if !self.row_values.is_empty() && self.row_values.len() != rows {
            return Err(mismatch("row activity vector", self.row_values.len(), rows));
        }
        if !self.row_duals.is_empty() && self.row_duals.len() != rows {
            return Err(mismatch("row dual vector", self.row_duals.len(), rows));
        }
        Ok(())
    }
}

impl SolutionView for SolveResult {
    fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    fn status(&self) -> TerminationStatus {
        self.status
    }

    fn primal_values(&self) -> &[f64] {
        &self.primal_values
    }

    fn reduced_costs(&self) -> &[f64] {
        &self.reduced_costs
    }

    fn row_values(&self) -> &[f64] {
        &self.row_values
    }

    fn row_duals(&self) -> &[f64] {
        &self.row_duals
    }

    fn solve_time_seconds(&self) -> f64 {
        self.solve_time_seconds
    }
}

impl Problem {
    /// Attach the optimizer used by [`Problem::optimize`], replacing any
    /// previous one.
    pub fn set_optimizer(&mut self, optimizer: impl Optimizer + 'static) {
        tracing::debug!(
            component = "solver",
            operation = "set_optimizer",
            status = "success",
            solver = optimizer.name(),
            "Attached optimizer"
        );
        self.optimizer = Some(Box::new(optimizer));
    }

    /// Name of the attached optimizer, if any.
    pub fn optimizer_name(&self) -> Option<&str> {
        self.optimizer.as_ref().map(|optimizer| optimizer.name())
    }

    /// Solve with the attached optimizer and the problem's own
    /// [`SolverConfig`].
    pub fn optimize(&mut self) -> Result<TerminationStatus, SolverError> {
        let config = self.config.clone();
        self.optimize_with(&config)
    }

    /// Solve with the attached optimizer and an explicit configuration.
    ///
    /// On `Err` the previously stored result, if any, is left in place.
    pub fn optimize_with(&mut self, config: &SolverConfig) -> Result<TerminationStatus, SolverError> {
        let Some(mut optimizer) = self.optimizer.take() else {
            tracing::warn!(
                component = "solver",
                operation = "solve",
                status = "error",
                error_code = SolverError::SolverUnavailable.code(),
                "No optimizer configured"
            );
            return Err(SolverError::SolverUnavailable);
        };
        let outcome = self.run_optimizer(optimizer.as_mut(), config);
        self.optimizer = Some(optimizer);
        outcome
    }

    fn run_optimizer(
        &mut self,
        optimizer: &mut dyn Optimizer,
        config: &SolverConfig,
    ) -> Result<TerminationStatus, SolverError> {
        let started = Instant::now();
        let solver = optimizer.name().to_string();
        let outcome = self
            .check_solvable(config)
            .and_then(|()| optimizer.optimize(self, config))
            .and_then(|result| result.check_shape(self).map(|()| result));
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(
                    component = "solver",
                    operation = "solve",
                    status = "error",
                    solver = %solver,
                    error_code = err.code(),
                    error = %err,
                    "Solve failed"
                );
                return Err(err);
            }
        };

        let status = result.status;
        if status.is_optimal() {
            tracing::debug!(
                component = "solver",
                operation = "solve",
                status = "success",
                solver = %solver,
                termination = status.as_str(),
                objective = result.objective_value,
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Solve finished"
            );
        } else {
            tracing::warn!(
                component = "solver",
                operation = "solve",
                status = "non_optimal",
                solver = %solver,
                termination = status.as_str(),
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Solve finished without an optimal solution"
            );
        }
        self.result = Some(result);
        Ok(status)
    }

    fn check_solvable(&self, config: &SolverConfig) -> Result<(), SolverError> {
        if self.num_variables() == 0 {
            return Err(SolverError::EmptyModel);
        }
        if self.objective.is_none() {
            return Err(SolverError::NoObjective);
        }
        config.validate()
    }
}

/// Solve `problem` with its attached optimizer under `config`.
///
/// Equivalent to [`Problem::optimize_with`].
pub fn solve(problem: &mut Problem, config: &SolverConfig) -> Result<TerminationStatus, SolverError> {
    problem.optimize_with(config)
}
