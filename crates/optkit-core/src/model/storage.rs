//! Storage access methods for the problem.

use crate::types::{Constraint, Variable};
use optkit_expr::{ConstraintId, VariableId};

use super::Problem;
use super::error::ModelError;

impl Problem {
    /// Get the number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get the number of nonzero coefficients in the constraint matrix.
    pub fn num_coefficients(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether any variable is integer-valued.
    pub fn is_mip(&self) -> bool {
        self.variables.iter().any(|var| var.domain.integer)
    }

    /// Get a variable by ID.
    pub fn get_variable(&self, id: VariableId) -> Result<&Variable, ModelError> {
        self.ensure_variable(id)?;
        Ok(&self.variables[id.index()])
    }

    /// Get a constraint by ID.
    pub fn get_constraint(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.ensure_constraint(id)?;
        Ok(&self.constraints[id.index()])
    }

    /// Iterate variables in registration order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        let tag = self.tag();
        self.variables
            .iter()
            .zip(0u32..)
            .map(move |(var, idx)| (VariableId::new(tag, idx), var))
    }

    /// Iterate constraints in registration order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        let tag = self.tag();
        self.constraints
            .iter()
            .zip(0u32..)
            .map(move |(con, idx)| (ConstraintId::new(tag, idx), con))
    }

    /// Get the coefficient matrix column by column.
    ///
    /// Each column lists the (constraint_id, coefficient) pairs of one variable.
    pub fn columns(&self) -> impl Iterator<Item = (VariableId, &[(ConstraintId, f64)])> {
        let tag = self.tag();
        self.columns
            .iter()
            .zip(0u32..)
            .map(move |(coeffs, idx)| (VariableId::new(tag, idx), coeffs.as_slice()))
    }

    /// Get the coefficient matrix in row form.
    ///
    /// Returns a vector of rows, each containing (variable_id, coefficient) pairs.
    pub fn rows(&self) -> Vec<Vec<(VariableId, f64)>> {
        let mut rows = vec![Vec::new(); self.num_constraints()];
        for (var_id, coeffs) in self.columns() {
            for (constraint_id, coeff) in coeffs {
                if let Some(row) = rows.get_mut(constraint_id.index()) {
                    row.push((var_id, *coeff));
                }
            }
        }
        rows
    }

    /// Get the coefficients for a specific variable (column)
    pub fn get_column(&self, var_id: VariableId) -> Option<&[(ConstraintId, f64)]> {
        if var_id.owner() != self.tag() {
            return None;
        }
        self.columns.get(var_id.index()).map(Vec::as_slice)
    }
}
