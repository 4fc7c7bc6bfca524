//! Model module for building optimization problems.
//!
//! This module provides the core [`Problem`] type: an owned, explicit handle
//! for one linear or mixed-integer program together with its latest result.
//!
//! # Module Organization
//!
//! - [`error`]: Model and query error types
//! - [`builder`]: Methods for adding variables, constraints, and objectives
//! - [`bounds`]: Bound, start value and row-bound updates
//! - [`storage`]: Column-first sparse storage access
//! - [`metadata`]: The shared name namespace and JSON metadata
//! - [`index`]: Index sets and indexed variable/constraint families
//! - [`query`]: Result queries against the latest solve

mod bounds;
mod builder;
mod error;
mod index;
mod metadata;
mod query;
mod storage;

use crate::solver::{Optimizer, SolveResult};
use crate::types::{Constraint, Objective, Variable};
use optkit_expr::{ConstraintId, Expr, ProblemTag, VariableId};
use optkit_solver::SolverConfig;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

pub use error::{ModelError, QueryError};
pub use index::{ConstraintArray, Family, IndexKey, IndexSet, VariableArray};

static NEXT_PROBLEM_TAG: AtomicU32 = AtomicU32::new(1);

/// What a registered name points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameEntry {
    Variable(VariableId),
    Constraint(ConstraintId),
    /// Base name of an indexed family; members are registered as `name[key]`.
    Family,
}

/// A linear or mixed-integer program and its most recent solve result.
///
/// Variables, constraints and the objective can be added or changed at any
/// time. Every change discards the stored result, so queries never report
/// values computed for a different model.
pub struct Problem {
    tag: ProblemTag,
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: Vec<Constraint>,
    // Column-first sparse storage: one (constraint, coefficient) list per variable.
    pub(crate) columns: Vec<Vec<(ConstraintId, f64)>>,
    pub(crate) objective: Option<Objective>,
    pub(crate) names: BTreeMap<String, NameEntry>,
    // Lazy-allocated metadata storage
    pub(crate) variable_metadata: Option<BTreeMap<VariableId, serde_json::Value>>,
    pub(crate) constraint_metadata: Option<BTreeMap<ConstraintId, serde_json::Value>>,
    pub(crate) config: SolverConfig,
    pub(crate) optimizer: Option<Box<dyn Optimizer>>,
    pub(crate) result: Option<SolveResult>,
}

impl Problem {
    /// Create a new empty problem with its own handle tag.
    pub fn new() -> Self {
        let tag = ProblemTag::new(NEXT_PROBLEM_TAG.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(
            component = "model",
            operation = "new",
            status = "success",
            problem = tag.inner(),
            "Created problem"
        );
        Self {
            tag,
            variables: Vec::new(),
            constraints: Vec::new(),
            columns: Vec::new(),
            objective: None,
            names: BTreeMap::new(),
            variable_metadata: None,
            constraint_metadata: None,
            config: SolverConfig::default(),
            optimizer: None,
            result: None,
        }
    }

    /// Create a problem that solves with the given optimizer.
    pub fn with_optimizer(optimizer: impl Optimizer + 'static) -> Self {
        let mut problem = Self::new();
        problem.set_optimizer(optimizer);
        problem
    }

    /// Tag carried by every handle this problem issues.
    pub fn tag(&self) -> ProblemTag {
        self.tag
    }

    /// Get the objective, if one has been set.
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Solver options used by [`Problem::optimize`].
    pub fn solver_config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replace the solver options used by [`Problem::optimize`].
    pub fn set_solver_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    pub(crate) fn ensure_variable(&self, id: VariableId) -> Result<(), ModelError> {
        if id.owner() != self.tag {
            return Err(ModelError::ForeignHandle {
                handle: id.to_string(),
            });
        }
        if id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(id))
        }
    }

    pub(crate) fn ensure_constraint(&self, id: ConstraintId) -> Result<(), ModelError> {
        if id.owner() != self.tag {
            return Err(ModelError::ForeignHandle {
                handle: id.to_string(),
            });
        }
        if id.index() < self.constraints.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownConstraint(id))
        }
    }

    /// Validate an expression against this problem and merge its terms.
    pub(crate) fn lower_expr(&self, expr: &Expr) -> Result<Vec<(VariableId, f64)>, ModelError> {
        expr.validate()?;
        for var_id in expr.variables() {
            self.ensure_variable(var_id)?;
        }
        let terms = expr.normalized_terms();
        tracing::trace!(
            component = "model",
            operation = "lower_expr",
            status = "success",
            expr_terms_in = expr.linear_terms().len(),
            expr_terms_out = terms.len(),
            "Lowered linear expression"
        );
        Ok(terms)
    }

    /// Drop the stored result after a structural or bound change.
    pub(crate) fn invalidate(&mut self, operation: &'static str) {
        if self.result.take().is_some() {
            tracing::debug!(
                component = "model",
                operation,
                status = "invalidated",
                "Discarded solve result after model change"
            );
        }
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("tag", &self.tag)
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("objective", &self.objective)
            .field("optimizer", &self.optimizer.as_ref().map(|opt| opt.name()))
            .field("solved", &self.result.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{Bounds, Domain, Sense};
    use optkit_expr::{ComparisonSense, ConstraintExpr};

    mod index_sets;
    mod metadata_names;
    mod queries;
    mod support;

    #[test]
    fn test_new_problem_is_empty() {
        let problem = Problem::new();
        assert_eq!(problem.num_variables(), 0);
        assert_eq!(problem.num_constraints(), 0);
        assert!(problem.objective().is_none());
        assert!(problem.result().is_none());
    }

    #[test]
    fn test_problems_get_distinct_tags() {
        assert_ne!(Problem::new().tag(), Problem::new().tag());
    }

    #[test]
    fn test_add_variable() {
        let mut problem = Problem::new();
        let domain = Domain::bounded(0.0, 10.0);
        let id = problem.add_variable("x", domain).unwrap();
        assert_eq!(problem.num_variables(), 1);
        assert_eq!(id.owner(), problem.tag());
        let stored = problem.get_variable(id).unwrap();
        assert_eq!(stored.name, "x");
        assert_eq!(stored.domain, domain);
    }

    #[test]
    fn test_add_constraint_moves_constant_to_bounds() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::non_negative()).unwrap();
        let relation = (Expr::var(x) * 2.0 + 3.0).leq(7.0);
        let con = problem.add_constraint("cap", relation).unwrap();

        let stored = problem.get_constraint(con).unwrap();
        assert_eq!(stored.bounds.upper, 4.0);
        assert!(stored.bounds.lower.is_infinite());
        assert_eq!(problem.get_column(x).unwrap(), &[(con, 2.0)]);
    }

    #[test]
    fn test_add_constraint_from_parts() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::bounded(0.0, 1.0)).unwrap();
        let relation = ConstraintExpr::new(Expr::term(x, 1.0), ComparisonSense::GreaterEqual, 2.0);
        let con = problem.add_constraint("floor", relation).unwrap();
        let stored = problem.get_constraint(con).unwrap();
        assert_eq!(stored.bounds.lower, 2.0);
        assert!(stored.bounds.upper.is_infinite());
    }

    #[test]
    fn test_ranged_constraint() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let y = problem.add_variable("y", Domain::free()).unwrap();
        let con = problem
            .add_ranged_constraint("band", x + y + 1.0, -1.0, 5.0)
            .unwrap();
        assert_eq!(
            problem.get_constraint(con).unwrap().bounds,
            Bounds::new(-2.0, 4.0)
        );
        assert_eq!(problem.rows()[con.index()], vec![(x, 1.0), (y, 1.0)]);
    }

    #[test]
    fn test_duplicate_terms_are_merged() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let con = problem
            .add_constraint("twice", (x + x * 2.0).equals(6.0))
            .unwrap();
        assert_eq!(problem.get_column(x).unwrap(), &[(con, 3.0)]);
        assert_eq!(problem.num_coefficients(), 1);
    }

    #[test]
    fn test_set_objective_keeps_constant() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::non_negative()).unwrap();
        problem.minimize(x * 3.0 + 10.0).unwrap();
        let objective = problem.objective().unwrap();
        assert_eq!(objective.sense, Sense::Minimize);
        assert_eq!(objective.terms, vec![(x, 3.0)]);
        assert_eq!(objective.constant, 10.0);

        problem.maximize(Expr::var(x)).unwrap();
        let objective = problem.objective().unwrap();
        assert_eq!(objective.sense, Sense::Maximize);
        assert_eq!(objective.constant, 0.0);
    }

    #[test]
    fn test_invalid_variable_bounds_rejected() {
        let mut problem = Problem::new();
        let result = problem.add_variable("x", Domain::bounded(5.0, 1.0));
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
        assert_eq!(problem.num_variables(), 0);
        assert!(problem.variable_by_name("x").is_none());
    }

    #[test]
    fn test_start_outside_bounds_rejected() {
        let mut problem = Problem::new();
        let result = problem.add_variable("x", Domain::bounded(0.0, 1.0).with_start(2.0));
        assert!(matches!(result, Err(ModelError::StartOutOfBounds { .. })));
    }

    #[test]
    fn test_non_finite_coefficient_rejected() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let result = problem.add_constraint("bad", (x * f64::NAN).leq(1.0));
        assert!(matches!(result, Err(ModelError::InvalidCoefficient { .. })));
        assert_eq!(problem.num_constraints(), 0);

        let result = problem.minimize(x * f64::INFINITY);
        assert!(matches!(result, Err(ModelError::InvalidCoefficient { .. })));
    }

    #[test]
    fn test_infeasible_row_bounds_rejected() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let result = problem.add_ranged_constraint("inverted", Expr::var(x), 3.0, 1.0);
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
    }

    #[test]
    fn test_foreign_handles_rejected() {
        let mut first = Problem::new();
        let mut second = Problem::new();
        let x = first.add_variable("x", Domain::free()).unwrap();
        second.add_variable("x", Domain::free()).unwrap();

        let result = second.add_constraint("c", Expr::var(x).leq(1.0));
        assert!(matches!(result, Err(ModelError::ForeignHandle { .. })));
        let result = second.set_upper_bound(x, 1.0);
        assert!(matches!(result, Err(ModelError::ForeignHandle { .. })));
        let result = second.minimize(Expr::var(x));
        assert!(matches!(result, Err(ModelError::ForeignHandle { .. })));
    }

    #[test]
    fn test_unknown_handle_in_own_problem() {
        let mut problem = Problem::new();
        let ghost = VariableId::new(problem.tag(), 42);
        let result = problem.fix(ghost, 1.0);
        assert_eq!(result, Err(ModelError::UnknownVariable(ghost)));
    }
}
