//! Result queries against the latest solve.
//!
//! All queries are pure reads. They fail with [`QueryError::NoSolution`]
//! when the problem was never solved, the last solve produced no primal
//! point, or the problem changed after the solve.

use optkit_expr::{ConstraintId, Expr, VariableId};
use optkit_solver::{SolutionView, TerminationStatus};

use crate::model::error::{ModelError, QueryError};
use crate::model::index::VariableArray;
use crate::model::{NameEntry, Problem};
use crate::solver::SolveResult;

impl Problem {
    /// The latest solve result, if it is still current.
    pub fn result(&self) -> Option<&SolveResult> {
        self.result.as_ref()
    }

    /// Status of the latest solve, if it is still current.
    pub fn termination_status(&self) -> Option<TerminationStatus> {
        self.result.as_ref().map(|result| result.status)
    }

    /// Whether a primal point is available for queries.
    pub fn has_solution(&self) -> bool {
        self.solution().is_ok()
    }

    /// Optimal (or best found) value of a variable.
    pub fn value(&self, id: VariableId) -> Result<f64, QueryError> {
        self.ensure_variable(id)?;
        let solution = self.solution()?;
        solution
            .get_primal(id.index())
            .ok_or(QueryError::NoSolution)
    }

    /// Values of every member of a variable family, in key order.
    pub fn values(&self, family: &VariableArray) -> Result<Vec<f64>, QueryError> {
        family
            .handles()
            .iter()
            .map(|&id| self.value(id))
            .collect()
    }

    /// Reduced cost of a variable.
    pub fn reduced_cost(&self, id: VariableId) -> Result<f64, QueryError> {
        self.ensure_variable(id)?;
        let solution = self.solution()?;
        solution
            .get_reduced_cost(id.index())
            .ok_or(QueryError::DualUnavailable)
    }

    /// Row activity of a constraint at the solution.
    ///
    /// Constants of the defining relation were moved into the row bounds, so
    /// this is the value of the linear part only.
    pub fn constraint_value(&self, id: ConstraintId) -> Result<f64, QueryError> {
        self.ensure_constraint(id)?;
        let solution = self.solution()?;
        if let Some(value) = solution.get_row_value(id.index()) {
            return Ok(value);
        }
        let primal = solution.primal_values();
        Ok(self.columns().fold(0.0, |acc, (var_id, coeffs)| {
            coeffs
                .iter()
                .filter(|(con, _)| *con == id)
                .fold(acc, |acc, (_, coeff)| acc + coeff * primal[var_id.index()])
        }))
    }

    /// Shadow price of a constraint.
    pub fn dual(&self, id: ConstraintId) -> Result<f64, QueryError> {
        self.ensure_constraint(id)?;
        let solution = self.solution()?;
        solution
            .get_row_dual(id.index())
            .ok_or(QueryError::DualUnavailable)
    }

    /// Objective value, including the objective constant.
    pub fn objective_value(&self) -> Result<f64, QueryError> {
        self.solution()?
            .objective_value
            .ok_or(QueryError::NoSolution)
    }

    /// Evaluate an expression at the solution.
    pub fn evaluate(&self, expr: &Expr) -> Result<f64, QueryError> {
        let solution = self.solution()?;
        expr.try_evaluate(|var_id| {
            self.ensure_variable(var_id)?;
            solution
                .get_primal(var_id.index())
                .ok_or(QueryError::NoSolution)
        })
    }

    /// Value of a variable, or activity of a constraint, looked up by name.
    pub fn value_by_name(&self, name: &str) -> Result<f64, QueryError> {
        match self.names.get(name) {
            Some(NameEntry::Variable(id)) => self.value(*id),
            Some(NameEntry::Constraint(id)) => self.constraint_value(*id),
            Some(NameEntry::Family) | None => Err(ModelError::UnknownName {
                name: name.to_string(),
            }
            .into()),
        }
    }

    fn solution(&self) -> Result<&SolveResult, QueryError> {
        match &self.result {
            Some(result) if result.has_primal() => Ok(result),
            _ => Err(QueryError::NoSolution),
        }
    }
}
