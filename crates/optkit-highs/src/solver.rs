//! HiGHS implementation of [`Optimizer`].

use std::time::Instant;

use optkit_core::{Objective, Optimizer, Problem, SolveResult};
use optkit_solver::{SolutionView, SolverConfig, SolverError, TerminationStatus};
use tracing::{debug, trace, warn};

use crate::highs_model::{HighsModel, HighsModelError, HighsOption, HighsStatus, SolutionSnapshot};
use crate::status::{highs_may_have_point, highs_status_string, highs_to_termination};

const SOLVER_NAME: &str = "highs";
const DEFAULT_FEASIBILITY_TOLERANCE: f64 = 1e-6;

fn highs_model_error_to_solver_error(err: HighsModelError) -> SolverError {
    SolverError::Internal(err.to_string())
}

/// Solves a [`Problem`] with HiGHS.
///
/// Each call rebuilds the HiGHS model from the problem's current state, so
/// one optimizer can be reused across edits and re-solves.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsOptimizer;

impl HighsOptimizer {
    pub fn new() -> Self {
        Self
    }
}

impl Optimizer for HighsOptimizer {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    fn optimize(
        &mut self,
        problem: &Problem,
        config: &SolverConfig,
    ) -> Result<SolveResult, SolverError> {
        let started = Instant::now();
        let objective = problem.objective().ok_or(SolverError::NoObjective)?;
        let is_mip = problem.is_mip();

        debug!(
            component = "solver",
            operation = "solve",
            status = "success",
            solver = SOLVER_NAME,
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            nnz = problem.num_coefficients() as u64,
            is_mip,
            "Starting HiGHS solve"
        );

        let mut attempt = run_highs(problem, objective, config)?;
        let mut presolve_retries = 0.0;
        if needs_presolve_retry(attempt.status, config) {
            debug!(
                component = "solver",
                operation = "solve",
                status = "retry",
                solver = SOLVER_NAME,
                "Presolve could not classify the problem; re-solving without presolve"
            );
            let retry_config = config.clone().with_presolve(false);
            attempt = run_highs(problem, objective, &retry_config)?;
            presolve_retries = 1.0;
        }

        let tolerance = config.tolerance.unwrap_or(DEFAULT_FEASIBILITY_TOLERANCE);
        let feasible_point = attempt
            .snapshot
            .as_ref()
            .filter(|snapshot| is_primal_feasible(problem, snapshot, tolerance));
        let status = resolve_status(attempt.status, feasible_point.is_some());

        let mut result = SolveResult::without_solution(status, SOLVER_NAME);
        let point = match status {
            TerminationStatus::Optimal => attempt.snapshot.as_ref(),
            TerminationStatus::Timeout => feasible_point,
            _ => None,
        };
        if let Some(snapshot) = point {
            result.objective_value = attempt.objective.map(|value| value + objective.constant);
            result.primal_values = snapshot.col_values.clone();
            result.row_values = snapshot.row_values.clone();
            // HiGHS reports no meaningful duals for a MIP or an interrupted run.
            if status.is_optimal() && !is_mip {
                result.reduced_costs = snapshot.col_duals.clone();
                result.row_duals = snapshot.row_duals.clone();
            }
        }

        result.solve_time_seconds = started.elapsed().as_secs_f64();
        result
            .metadata
            .insert("presolve_retries".to_string(), presolve_retries);
        result
            .metadata
            .insert("num_columns".to_string(), problem.num_variables() as f64);
        result
            .metadata
            .insert("num_rows".to_string(), problem.num_constraints() as f64);
        if is_mip && attempt.mip_gap.is_finite() {
            result
                .metadata
                .insert("mip_gap".to_string(), attempt.mip_gap);
        }

        let duration_ms = result.solve_time_seconds * 1000.0;
        if status.is_optimal() {
            debug!(
                component = "solver",
                operation = "solve",
                status = "success",
                solver = SOLVER_NAME,
                solver_status = highs_status_string(attempt.status),
                objective_value = result.objective_value,
                presolve_retries,
                duration_ms,
                "HiGHS solve completed"
            );
        } else {
            warn!(
                component = "solver",
                operation = "solve",
                status = "warn",
                solver = SOLVER_NAME,
                solver_status = highs_status_string(attempt.status),
                termination = status.as_str(),
                has_point = result.has_primal(),
                presolve_retries,
                duration_ms,
                "HiGHS did not find an optimal solution"
            );
        }

        Ok(result)
    }
}

/// Presolve may stop at "unbounded or infeasible"; a run without it can
/// usually tell the two apart.
fn needs_presolve_retry(status: HighsStatus, config: &SolverConfig) -> bool {
    status == HighsStatus::UnboundedOrInfeasible && config.presolve != Some(false)
}

/// An unclassified outcome with a feasible point left behind is unbounded;
/// without one it is reported as infeasible.
fn resolve_status(status: HighsStatus, has_feasible_point: bool) -> TerminationStatus {
    match status {
        HighsStatus::UnboundedOrInfeasible if has_feasible_point => TerminationStatus::Unbounded,
        other => highs_to_termination(other),
    }
}

/// What one HiGHS run left behind.
struct Attempt {
    status: HighsStatus,
    objective: Option<f64>,
    snapshot: Option<SolutionSnapshot>,
    mip_gap: f64,
}

fn run_highs(
    problem: &Problem,
    objective: &Objective,
    config: &SolverConfig,
) -> Result<Attempt, SolverError> {
    let mut highs_model = HighsModel::new();
    apply_solver_config(&mut highs_model, config);
    highs_model.set_sense(objective.sense);
    add_columns(problem, objective, &mut highs_model);
    add_rows(problem, &mut highs_model)?;
    if let Some(start) = primal_start(problem) {
        highs_model
            .set_primal_start(start)
            .map_err(highs_model_error_to_solver_error)?;
    }

    let status = highs_model.solve();
    let (objective, snapshot) = if highs_may_have_point(status) {
        (
            highs_model.objective_value().ok(),
            highs_model.solution_snapshot().ok(),
        )
    } else {
        (None, None)
    };
    Ok(Attempt {
        status,
        objective,
        snapshot,
        mip_gap: highs_model.mip_gap(),
    })
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    highs_model.set_verbose(config.is_verbose());

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        highs_model.set_option("presolve", HighsOption::Str(presolve_str.to_string()));
    }
    if let Some(threads) = config.threads {
        let threads = i32::try_from(threads).unwrap_or(i32::MAX);
        highs_model.set_option("threads", HighsOption::Int(threads));
    }
    if let Some(tolerance) = config.tolerance {
        highs_model.set_option(
            "primal_feasibility_tolerance",
            HighsOption::Float(tolerance),
        );
        highs_model.set_option("dual_feasibility_tolerance", HighsOption::Float(tolerance));
    }
}

fn add_columns(problem: &Problem, objective: &Objective, highs_model: &mut HighsModel) {
    let mut costs = vec![0.0; problem.num_variables()];
    for (var_id, coeff) in &objective.terms {
        if let Some(cost) = costs.get_mut(var_id.index()) {
            *cost += *coeff;
        }
    }

    for ((var_id, var), cost) in problem.variables().zip(costs) {
        let domain = var.domain;
        let col_idx = if domain.integer {
            highs_model.add_integer_col(domain.lower, domain.upper, cost)
        } else {
            highs_model.add_col(domain.lower, domain.upper, cost)
        };
        trace!(
            component = "solver",
            operation = "add_variable",
            status = "success",
            var_id = var_id.inner(),
            col_idx,
            name = %var.name,
            "Added variable to HiGHS"
        );
    }

    debug!(
        component = "solver",
        operation = "add_variables",
        status = "success",
        num_vars = problem.num_variables(),
        "Added all variables to HiGHS"
    );
}

fn add_rows(problem: &Problem, highs_model: &mut HighsModel) -> Result<(), SolverError> {
    let matrix_build_started = Instant::now();
    for ((constraint_id, constraint), row) in problem.constraints().zip(problem.rows()) {
        let (columns, coefficients): (Vec<usize>, Vec<f64>) = row
            .iter()
            .map(|(var_id, coeff)| (var_id.index(), *coeff))
            .unzip();
        highs_model
            .add_row(
                constraint.bounds.lower,
                constraint.bounds.upper,
                &columns,
                &coefficients,
            )
            .map_err(highs_model_error_to_solver_error)?;
        trace!(
            component = "solver",
            operation = "add_constraint",
            status = "success",
            constraint_id = constraint_id.inner(),
            name = %constraint.name,
            num_coeffs = columns.len(),
            "Added constraint to HiGHS"
        );
    }

    debug!(
        component = "solver",
        operation = "add_constraints",
        status = "success",
        num_constraints = problem.num_constraints(),
        duration_ms = matrix_build_started.elapsed().as_secs_f64() * 1000.0,
        "Added all constraints to HiGHS"
    );
    Ok(())
}

/// Start values for every column, or `None` when no variable carries one.
fn primal_start(problem: &Problem) -> Option<Vec<f64>> {
    if problem
        .variables()
        .all(|(_, var)| var.domain.start.is_none())
    {
        return None;
    }
    let start: Vec<f64> = problem
        .variables()
        .map(|(_, var)| {
            var.domain
                .start
                .unwrap_or_else(|| default_primal_value(var.domain.lower, var.domain.upper))
        })
        .collect();
    debug!(
        component = "solver",
        operation = "prepare_warm_start",
        status = "success",
        num_hints = problem
            .variables()
            .filter(|(_, var)| var.domain.start.is_some())
            .count(),
        "Prepared primal start"
    );
    Some(start)
}

/// Value closest to zero inside `[lower, upper]`.
fn default_primal_value(lower: f64, upper: f64) -> f64 {
    if lower > 0.0 {
        lower
    } else if upper < 0.0 {
        upper
    } else {
        0.0
    }
}

fn within(value: f64, lower: f64, upper: f64, tolerance: f64) -> bool {
    let slack = |bound: f64| tolerance * bound.abs().max(1.0);
    value.is_finite()
        && (lower == f64::NEG_INFINITY || value >= lower - slack(lower))
        && (upper == f64::INFINITY || value <= upper + slack(upper))
}

/// Check a point HiGHS left behind against bounds, integrality and rows.
fn is_primal_feasible(problem: &Problem, snapshot: &SolutionSnapshot, tolerance: f64) -> bool {
    let values = &snapshot.col_values;
    if values.len() != problem.num_variables() {
        return false;
    }
    let columns_ok = problem.variables().zip(values).all(|((_, var), &value)| {
        within(value, var.domain.lower, var.domain.upper, tolerance)
            && (!var.domain.integer || (value - value.round()).abs() <= tolerance)
    });
    if !columns_ok {
        return false;
    }
    problem
        .constraints()
        .zip(problem.rows())
        .all(|((_, constraint), row)| {
            let activity: f64 = row
                .iter()
                .map(|(var_id, coeff)| coeff * values.get(var_id.index()).copied().unwrap_or(0.0))
                .sum();
            within(
                activity,
                constraint.bounds.lower,
                constraint.bounds.upper,
                tolerance,
            )
        })
}
