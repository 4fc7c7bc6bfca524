//! Model builder methods for adding variables, constraints, and objectives.
//!
//! Every method validates its whole input before touching the problem, so a
//! rejected call leaves the model unchanged.

use std::ops::Range;

use crate::types::{Bounds, Constraint, Domain, Objective, Sense, Variable};
use optkit_expr::{ConstraintExpr, ConstraintId, Expr, VariableId};

use crate::model::error::ModelError;
use crate::model::{NameEntry, Problem};

impl Problem {
    /// Add a named variable with the given domain.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain: Domain,
    ) -> Result<VariableId, ModelError> {
        let name = name.into();
        self.check_name_available(&name)?;
        validate_domain(&name, &domain)?;
        let index = next_indices(self.variables.len(), 1, "variables")?.start;

        let id = self.push_variable(index, name, domain);
        self.invalidate("add_variable");
        Ok(id)
    }

    /// Register a variable whose name, domain and index were already validated.
    pub(crate) fn push_variable(&mut self, index: u32, name: String, domain: Domain) -> VariableId {
        let id = VariableId::new(self.tag(), index);
        tracing::debug!(
            component = "model",
            operation = "add_variable",
            status = "success",
            name = %name,
            lower = domain.lower,
            upper = domain.upper,
            integer = domain.integer,
            "Added variable"
        );
        self.names.insert(name.clone(), NameEntry::Variable(id));
        self.variables.push(Variable { name, domain });
        self.columns.push(Vec::new());
        id
    }

    /// Add a named constraint from a relation such as `x + y <= 10`.
    ///
    /// A constant left in the relation's expression is moved into the row
    /// bounds.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        relation: ConstraintExpr,
    ) -> Result<ConstraintId, ModelError> {
        let (lower, upper) = relation.bounds();
        let (expr, _, _) = relation.into_parts();
        self.add_row(name.into(), &expr, lower, upper)
    }

    /// Add a named constraint `lower <= expr <= upper`.
    pub fn add_ranged_constraint(
        &mut self,
        name: impl Into<String>,
        expr: impl Into<Expr>,
        lower: f64,
        upper: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.add_row(name.into(), &expr.into(), lower, upper)
    }

    pub(crate) fn add_row(
        &mut self,
        name: String,
        expr: &Expr,
        lower: f64,
        upper: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.check_name_available(&name)?;
        let (terms, bounds) = self.prepare_row(&name, expr, lower, upper)?;
        let index = next_indices(self.constraints.len(), 1, "constraints")?.start;
        let id = self.push_row(index, name, terms, bounds);
        self.invalidate("add_constraint");
        Ok(id)
    }

    /// Validate a row without registering it.
    pub(crate) fn prepare_row(
        &self,
        name: &str,
        expr: &Expr,
        lower: f64,
        upper: f64,
    ) -> Result<(Vec<(VariableId, f64)>, Bounds), ModelError> {
        let terms = self.lower_expr(expr)?;
        let offset = expr.constant();
        let bounds = Bounds::new(lower - offset, upper - offset);
        if !bounds.is_valid() {
            return Err(ModelError::InvalidBounds {
                name: name.to_string(),
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        Ok((terms, bounds))
    }

    pub(crate) fn push_row(
        &mut self,
        index: u32,
        name: String,
        terms: Vec<(VariableId, f64)>,
        bounds: Bounds,
    ) -> ConstraintId {
        let id = ConstraintId::new(self.tag(), index);
        tracing::debug!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            name = %name,
            lower = bounds.lower,
            upper = bounds.upper,
            terms = terms.len(),
            "Added constraint"
        );
        for (var_id, coeff) in terms {
            self.columns[var_id.index()].push((id, coeff));
        }
        self.names.insert(name.clone(), NameEntry::Constraint(id));
        self.constraints.push(Constraint { name, bounds });
        id
    }

    /// Set (or replace) the objective function.
    pub fn set_objective(&mut self, sense: Sense, expr: impl Into<Expr>) -> Result<(), ModelError> {
        let expr = expr.into();
        let terms = self.lower_expr(&expr)?;
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = terms.len(),
            constant = expr.constant(),
            "Set objective function"
        );
        self.objective = Some(Objective {
            sense,
            terms,
            constant: expr.constant(),
        });
        self.invalidate("set_objective");
        Ok(())
    }

    /// Minimize a linear expression, replacing any previous objective.
    pub fn minimize(&mut self, expr: impl Into<Expr>) -> Result<(), ModelError> {
        self.set_objective(Sense::Minimize, expr)
    }

    /// Maximize a linear expression, replacing any previous objective.
    pub fn maximize(&mut self, expr: impl Into<Expr>) -> Result<(), ModelError> {
        self.set_objective(Sense::Maximize, expr)
    }
}

pub(crate) fn validate_domain(name: &str, domain: &Domain) -> Result<(), ModelError> {
    if !domain.has_valid_bounds() {
        return Err(ModelError::InvalidBounds {
            name: name.to_string(),
            lower: domain.lower,
            upper: domain.upper,
        });
    }
    if let Some(start) = domain.start
        && !domain.admits(start)
    {
        return Err(ModelError::StartOutOfBounds {
            name: name.to_string(),
            start,
            lower: domain.lower,
            upper: domain.upper,
        });
    }
    Ok(())
}

/// Handle indices for `count` new symbols after the `len` already stored.
pub(crate) fn next_indices(
    len: usize,
    count: usize,
    kind: &'static str,
) -> Result<Range<u32>, ModelError> {
    let exceeded = || ModelError::CapacityExceeded { kind };
    let start = u32::try_from(len).map_err(|_| exceeded())?;
    let end = len
        .checked_add(count)
        .and_then(|end| u32::try_from(end).ok())
        .ok_or_else(exceeded)?;
    Ok(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_existing_symbols() {
        assert_eq!(next_indices(0, 1, "variables"), Ok(0..1));
        assert_eq!(next_indices(3, 2, "constraints"), Ok(3..5));
    }

    #[test]
    fn indices_past_handle_width_are_rejected() {
        let full = u32::MAX as usize;
        let err = next_indices(full, 1, "variables").unwrap_err();
        assert_eq!(err, ModelError::CapacityExceeded { kind: "variables" });
        assert_eq!(err.code(), "MODEL_CAPACITY_EXCEEDED");
        assert!(next_indices(full - 2, 3, "constraints").is_err());
        assert_eq!(next_indices(full - 2, 2, "constraints"), Ok(u32::MAX - 2..u32::MAX));
    }
}
