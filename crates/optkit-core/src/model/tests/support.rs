use crate::solver::{Optimizer, SolveResult};
use crate::types::Domain;
use optkit_expr::{ConstraintId, Expr, VariableId};
use optkit_solver::{SolverConfig, SolverError, TerminationStatus};

use super::Problem;

/// Optimizer returning a prepared result, for exercising the query layer
/// without a numerical backend.
pub(super) struct Scripted(pub(super) SolveResult);

impl Optimizer for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn optimize(
        &mut self,
        _problem: &Problem,
        _config: &SolverConfig,
    ) -> Result<SolveResult, SolverError> {
        Ok(self.0.clone())
    }
}

pub(super) struct DietModel {
    pub(super) problem: Problem,
    pub(super) x: VariableId,
    pub(super) y: VariableId,
    pub(super) protein: ConstraintId,
    pub(super) calories: ConstraintId,
}

/// minimize 12x + 20y s.t. 6x + 8y >= 100, 7x + 12y >= 120, x >= 0, 0 <= y <= 3.
pub(super) fn diet_model() -> DietModel {
    let mut problem = Problem::new();
    let x = problem.add_variable("x", Domain::non_negative()).unwrap();
    let y = problem.add_variable("y", Domain::bounded(0.0, 3.0)).unwrap();
    let protein = problem
        .add_constraint("protein", (x * 6.0 + y * 8.0).geq(100.0))
        .unwrap();
    let calories = problem
        .add_constraint("calories", (x * 7.0 + y * 12.0).geq(120.0))
        .unwrap();
    problem.minimize(x * 12.0 + y * 20.0).unwrap();
    DietModel {
        problem,
        x,
        y,
        protein,
        calories,
    }
}

/// The known optimum of [`diet_model`], as a backend would report it.
pub(super) fn diet_optimum() -> SolveResult {
    SolveResult {
        objective_value: Some(205.0),
        primal_values: vec![15.0, 1.25],
        reduced_costs: vec![0.0, 0.0],
        row_values: vec![100.0, 120.0],
        row_duals: vec![0.25, 1.5],
        ..SolveResult::without_solution(TerminationStatus::Optimal, "scripted")
    }
}

pub(super) fn solved_diet_model() -> DietModel {
    let mut model = diet_model();
    model.problem.set_optimizer(Scripted(diet_optimum()));
    model.problem.optimize().unwrap();
    model
}

pub(super) fn total_cost(model: &DietModel) -> Expr {
    model.x * 12.0 + model.y * 20.0
}
