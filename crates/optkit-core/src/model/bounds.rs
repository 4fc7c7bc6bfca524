//! Bound, integrality and start value updates.
//!
//! Updates keep the variable's handle and name; they only discard the stored
//! solve result. A start value that no longer fits the new bounds is dropped.

use crate::types::{Bounds, Domain};
use optkit_expr::{ConstraintId, VariableId};

use crate::model::Problem;
use crate::model::builder::validate_domain;
use crate::model::error::ModelError;

impl Problem {
    /// Replace both bounds of a variable.
    pub fn set_bounds(&mut self, id: VariableId, lower: f64, upper: f64) -> Result<(), ModelError> {
        self.update_domain(id, "set_bounds", |domain| {
            domain.lower = lower;
            domain.upper = upper;
        })
    }

    /// Replace the lower bound of a variable.
    pub fn set_lower_bound(&mut self, id: VariableId, lower: f64) -> Result<(), ModelError> {
        self.update_domain(id, "set_lower_bound", |domain| domain.lower = lower)
    }

    /// Replace the upper bound of a variable.
    pub fn set_upper_bound(&mut self, id: VariableId, upper: f64) -> Result<(), ModelError> {
        self.update_domain(id, "set_upper_bound", |domain| domain.upper = upper)
    }

    /// Fix a variable to a single value.
    pub fn fix(&mut self, id: VariableId, value: f64) -> Result<(), ModelError> {
        if !value.is_finite() {
            return Err(ModelError::InvalidBounds {
                name: self.variable_name(id)?.to_string(),
                lower: value,
                upper: value,
            });
        }
        self.update_domain(id, "fix", |domain| {
            domain.lower = value;
            domain.upper = value;
        })
    }

    /// Switch integrality of a variable on or off.
    pub fn set_integer(&mut self, id: VariableId, integer: bool) -> Result<(), ModelError> {
        self.update_domain(id, "set_integer", |domain| domain.integer = integer)
    }

    /// Set the initial guess forwarded to the solver.
    ///
    /// Unlike bound updates, a start outside the bounds is an error.
    pub fn set_start(&mut self, id: VariableId, start: f64) -> Result<(), ModelError> {
        self.ensure_variable(id)?;
        let variable = &self.variables[id.index()];
        let domain = Domain {
            start: Some(start),
            ..variable.domain
        };
        validate_domain(&variable.name, &domain)?;
        self.variables[id.index()].domain = domain;
        self.invalidate("set_start");
        Ok(())
    }

    /// Remove the initial guess of a variable.
    pub fn clear_start(&mut self, id: VariableId) -> Result<(), ModelError> {
        self.ensure_variable(id)?;
        self.variables[id.index()].domain.start = None;
        self.invalidate("clear_start");
        Ok(())
    }

    /// Replace the row bounds of a constraint.
    pub fn set_constraint_bounds(
        &mut self,
        id: ConstraintId,
        lower: f64,
        upper: f64,
    ) -> Result<(), ModelError> {
        self.ensure_constraint(id)?;
        let bounds = Bounds::new(lower, upper);
        let constraint = &mut self.constraints[id.index()];
        if !bounds.is_valid() {
            return Err(ModelError::InvalidBounds {
                name: constraint.name.clone(),
                lower,
                upper,
            });
        }
        constraint.bounds = bounds;
        tracing::debug!(
            component = "model",
            operation = "set_constraint_bounds",
            status = "success",
            name = %constraint.name,
            lower,
            upper,
            "Updated constraint bounds"
        );
        self.invalidate("set_constraint_bounds");
        Ok(())
    }

    fn update_domain(
        &mut self,
        id: VariableId,
        operation: &'static str,
        apply: impl FnOnce(&mut Domain),
    ) -> Result<(), ModelError> {
        self.ensure_variable(id)?;
        let variable = &mut self.variables[id.index()];
        let mut domain = variable.domain;
        apply(&mut domain);
        let dropped_start = domain.start.filter(|start| !domain.admits(*start));
        if dropped_start.is_some() {
            domain.start = None;
        }
        validate_domain(&variable.name, &domain)?;
        if let Some(start) = dropped_start {
            tracing::debug!(
                component = "model",
                operation = operation,
                status = "success",
                name = %variable.name,
                start,
                "Dropped start value outside the new bounds"
            );
        }
        variable.domain = domain;
        tracing::debug!(
            component = "model",
            operation = operation,
            status = "success",
            name = %variable.name,
            lower = domain.lower,
            upper = domain.upper,
            integer = domain.integer,
            "Updated variable domain"
        );
        self.invalidate(operation);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn set_bounds_updates_domain() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::bounded(0.0, 3.0)).unwrap();
        problem.set_upper_bound(x, 30.0).unwrap();
        problem.set_lower_bound(x, 1.0).unwrap();
        let domain = problem.get_variable(x).unwrap().domain;
        assert_eq!((domain.lower, domain.upper), (1.0, 30.0));

        problem.set_bounds(x, -2.0, 2.0).unwrap();
        let domain = problem.get_variable(x).unwrap().domain;
        assert_eq!((domain.lower, domain.upper), (-2.0, 2.0));
    }

    #[test]
    fn rejected_update_leaves_domain_untouched() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::bounded(0.0, 3.0)).unwrap();
        let result = problem.set_upper_bound(x, -1.0);
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
        assert_eq!(problem.get_variable(x).unwrap().domain.upper, 3.0);
    }

    #[test]
    fn fix_pins_both_bounds() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        problem.fix(x, 4.5).unwrap();
        let domain = problem.get_variable(x).unwrap().domain;
        assert_eq!((domain.lower, domain.upper), (4.5, 4.5));
        assert!(problem.fix(x, f64::NAN).is_err());
    }

    #[test]
    fn start_dropped_when_bounds_exclude_it() {
        let mut problem = Problem::new();
        let x = problem
            .add_variable("x", Domain::bounded(0.0, 10.0).with_start(8.0))
            .unwrap();
        problem.set_upper_bound(x, 9.0).unwrap();
        assert_eq!(problem.get_variable(x).unwrap().domain.start, Some(8.0));
        problem.set_upper_bound(x, 5.0).unwrap();
        assert_eq!(problem.get_variable(x).unwrap().domain.start, None);
    }

    #[test]
    fn rejected_update_keeps_start_value() {
        let mut problem = Problem::new();
        let x = problem
            .add_variable("x", Domain::bounded(0.0, 10.0).with_start(8.0))
            .unwrap();
        let result = problem.set_bounds(x, 12.0, 11.0);
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
        let domain = problem.get_variable(x).unwrap().domain;
        assert_eq!((domain.lower, domain.upper, domain.start), (0.0, 10.0, Some(8.0)));
    }

    #[test]
    fn set_start_validates_against_bounds() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::bounded(0.0, 1.0)).unwrap();
        problem.set_start(x, 0.5).unwrap();
        assert_eq!(problem.get_variable(x).unwrap().domain.start, Some(0.5));
        let result = problem.set_start(x, 2.0);
        assert!(matches!(result, Err(ModelError::StartOutOfBounds { .. })));
        problem.clear_start(x).unwrap();
        assert_eq!(problem.get_variable(x).unwrap().domain.start, None);
    }

    #[test]
    fn set_integer_toggles_integrality() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::bounded(0.0, 5.0)).unwrap();
        assert!(!problem.is_mip());
        problem.set_integer(x, true).unwrap();
        assert!(problem.is_mip());
    }

    #[test]
    fn constraint_bounds_can_be_replaced() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let con = problem
            .add_constraint("cap", optkit_expr::Expr::var(x).leq(3.0))
            .unwrap();
        problem.set_constraint_bounds(con, 1.0, 2.0).unwrap();
        assert_eq!(
            problem.get_constraint(con).unwrap().bounds,
            Bounds::new(1.0, 2.0)
        );
        let result = problem.set_constraint_bounds(con, 2.0, 1.0);
        assert!(matches!(result, Err(ModelError::InvalidBounds { .. })));
    }
}
