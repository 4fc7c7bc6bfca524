//! The shared name namespace and per-symbol JSON metadata.
//!
//! Variables, constraints and indexed families share one namespace: a name
//! identifies at most one symbol in a problem.

use std::collections::BTreeMap;

use optkit_expr::{ConstraintId, VariableId};

use crate::model::error::ModelError;
use crate::model::{NameEntry, Problem};

impl Problem {
    /// Fail unless `name` is non-empty and unused.
    pub(crate) fn check_name_available(&self, name: &str) -> Result<(), ModelError> {
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        if self.names.contains_key(name) {
            tracing::debug!(
                component = "model",
                operation = "register_name",
                status = "error",
                name = %name,
                "Name already in use"
            );
            return Err(ModelError::NameCollision {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Whether any variable, constraint or family uses this name.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Lookup a variable by name.
    pub fn variable_by_name(&self, name: &str) -> Option<VariableId> {
        match self.names.get(name)? {
            NameEntry::Variable(id) => Some(*id),
            _ => None,
        }
    }

    /// Lookup a constraint by name.
    pub fn constraint_by_name(&self, name: &str) -> Option<ConstraintId> {
        match self.names.get(name)? {
            NameEntry::Constraint(id) => Some(*id),
            _ => None,
        }
    }

    /// Get name for a variable.
    pub fn variable_name(&self, id: VariableId) -> Result<&str, ModelError> {
        self.ensure_variable(id)?;
        Ok(&self.variables[id.index()].name)
    }

    /// Get name for a constraint.
    pub fn constraint_name(&self, id: ConstraintId) -> Result<&str, ModelError> {
        self.ensure_constraint(id)?;
        Ok(&self.constraints[id.index()].name)
    }

    /// Set metadata for a variable.
    pub fn set_variable_metadata(
        &mut self,
        id: VariableId,
        metadata: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_variable(id)?;
        self.variable_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, metadata);
        Ok(())
    }

    /// Get metadata for a variable.
    pub fn variable_metadata(&self, id: VariableId) -> Option<&serde_json::Value> {
        self.variable_metadata
            .as_ref()
            .and_then(|meta| meta.get(&id))
    }

    /// Set metadata for a constraint.
    pub fn set_constraint_metadata(
        &mut self,
        id: ConstraintId,
        metadata: serde_json::Value,
    ) -> Result<(), ModelError> {
        self.ensure_constraint(id)?;
        self.constraint_metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(id, metadata);
        Ok(())
    }

    /// Get metadata for a constraint.
    pub fn constraint_metadata(&self, id: ConstraintId) -> Option<&serde_json::Value> {
        self.constraint_metadata
            .as_ref()
            .and_then(|meta| meta.get(&id))
    }
}
