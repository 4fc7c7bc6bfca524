//! Index sets and indexed families of variables and constraints.
//!
//! An [`IndexSet`] is a named, ordered, non-empty list of unique keys (time
//! steps, scenario labels, ...). Declaring a family `x` over it registers one
//! symbol per key under the name `x[key]` and reserves `x` itself.

use std::collections::BTreeSet;
use std::fmt;

use optkit_expr::{ConstraintExpr, ConstraintId, Expr, VariableId};
use serde::{Deserialize, Serialize};

use crate::model::builder::{next_indices, validate_domain};
use crate::model::error::ModelError;
use crate::model::{NameEntry, Problem};
use crate::types::{Bounds, Domain};

/// One key of an index set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Int(value) => write!(f, "{value}"),
            IndexKey::Str(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for IndexKey {
    fn from(value: i64) -> Self {
        IndexKey::Int(value)
    }
}

impl From<i32> for IndexKey {
    fn from(value: i32) -> Self {
        IndexKey::Int(i64::from(value))
    }
}

impl From<&str> for IndexKey {
    fn from(value: &str) -> Self {
        IndexKey::Str(value.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(value: String) -> Self {
        IndexKey::Str(value)
    }
}

/// A named, ordered set of unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet {
    name: String,
    keys: Vec<IndexKey>,
}

impl IndexSet {
    /// Build an index set, rejecting empty input and repeated keys.
    pub fn new<K: Into<IndexKey>>(
        name: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let keys: Vec<IndexKey> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(ModelError::EmptyIndexSet { name });
        }
        let mut seen = BTreeSet::new();
        for key in &keys {
            if !seen.insert(key) {
                return Err(ModelError::DuplicateIndexKey {
                    set: name,
                    key: key.to_string(),
                });
            }
        }
        Ok(Self { name, keys })
    }

    /// Integer keys `start..end`, e.g. the time steps of a discretized horizon.
    pub fn range(name: impl Into<String>, range: std::ops::Range<i64>) -> Result<Self, ModelError> {
        Self::new(name, range)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn position(&self, key: &IndexKey) -> Option<usize> {
        self.keys.iter().position(|candidate| candidate == key)
    }
}

/// Symbols declared over an index set, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Family<H> {
    name: String,
    keys: Vec<IndexKey>,
    handles: Vec<H>,
}

/// Variables `name[key]` declared over an index set.
pub type VariableArray = Family<VariableId>;

/// Constraints `name[key]` declared over an index set.
pub type ConstraintArray = Family<ConstraintId>;

impl<H: Copy> Family<H> {
    /// Base name of the family.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    pub fn handles(&self) -> &[H] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handle for `key`, if the key belongs to the family.
    pub fn get(&self, key: impl Into<IndexKey>) -> Option<H> {
        let key = key.into();
        self.keys
            .iter()
            .position(|candidate| *candidate == key)
            .map(|idx| self.handles[idx])
    }

    /// Handle at a position in key order.
    pub fn at(&self, position: usize) -> Option<H> {
        self.handles.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, H)> {
        self.keys.iter().zip(self.handles.iter().copied())
    }

    /// Registered name of the member for `key`.
    pub fn member_name(&self, key: &IndexKey) -> String {
        member_name(&self.name, key)
    }
}

impl VariableArray {
    /// Sum of all members.
    pub fn sum(&self) -> Expr {
        self.handles.iter().copied().sum()
    }

    /// Weighted sum `sum_i weight(key_i) * x[key_i]`.
    pub fn weighted_sum(&self, mut weight: impl FnMut(&IndexKey) -> f64) -> Expr {
        Expr::from_linear(
            self.iter()
                .map(|(key, var_id)| (var_id, weight(key)))
                .collect(),
        )
    }
}

fn member_name(base: &str, key: &IndexKey) -> String {
    format!("{base}[{key}]")
}

impl Problem {
    /// Declare a family of variables `name[key]`, one per key of `set`.
    pub fn add_variables(
        &mut self,
        name: impl Into<String>,
        set: &IndexSet,
        domain: Domain,
    ) -> Result<VariableArray, ModelError> {
        let name = name.into();
        self.check_name_available(&name)?;
        validate_domain(&name, &domain)?;
        let member_names = self.member_names(&name, set)?;
        let indices = next_indices(self.variables.len(), member_names.len(), "variables")?;

        self.names.insert(name.clone(), NameEntry::Family);
        let handles: Vec<VariableId> = member_names
            .into_iter()
            .zip(indices)
            .map(|(member, index)| self.push_variable(index, member, domain))
            .collect();
        tracing::debug!(
            component = "model",
            operation = "add_variables",
            status = "success",
            name = %name,
            index_set = set.name(),
            count = handles.len(),
            "Added variable family"
        );
        self.invalidate("add_variables");
        Ok(Family {
            name,
            keys: set.keys().to_vec(),
            handles,
        })
    }

    /// Declare a family of constraints `name[key]`, building one relation
    /// per key of `set`. Nothing is registered if any relation is rejected.
    pub fn add_constraints(
        &mut self,
        name: impl Into<String>,
        set: &IndexSet,
        mut relation: impl FnMut(&IndexKey) -> ConstraintExpr,
    ) -> Result<ConstraintArray, ModelError> {
        let name = name.into();
        self.check_name_available(&name)?;
        let member_names = self.member_names(&name, set)?;

        let mut rows: Vec<(String, Vec<(VariableId, f64)>, Bounds)> =
            Vec::with_capacity(set.len());
        for (member, key) in member_names.into_iter().zip(set.keys()) {
            let built = relation(key);
            let (lower, upper) = built.bounds();
            let (expr, _, _) = built.into_parts();
            let (terms, bounds) = self.prepare_row(&member, &expr, lower, upper)?;
            tracing::trace!(
                component = "model",
                operation = "add_constraints",
                status = "prepared",
                key = %key,
                lower = bounds.lower,
                upper = bounds.upper,
                "Prepared family member"
            );
            rows.push((member, terms, bounds));
        }

        let indices = next_indices(self.constraints.len(), rows.len(), "constraints")?;

        self.names.insert(name.clone(), NameEntry::Family);
        let handles: Vec<ConstraintId> = rows
            .into_iter()
            .zip(indices)
            .map(|((member, terms, bounds), index)| self.push_row(index, member, terms, bounds))
            .collect();
        tracing::debug!(
            component = "model",
            operation = "add_constraints",
            status = "success",
            name = %name,
            index_set = set.name(),
            count = handles.len(),
            "Added constraint family"
        );
        self.invalidate("add_constraints");
        Ok(Family {
            name,
            keys: set.keys().to_vec(),
            handles,
        })
    }

    /// Member names for `base` over `set`; `Int(1)` and `Str("1")` render
    /// the same, so names are also checked against each other.
    pub(crate) fn member_names(&self, base: &str, set: &IndexSet) -> Result<Vec<String>, ModelError> {
        let mut seen = BTreeSet::new();
        let mut members = Vec::with_capacity(set.len());
        for key in set.keys() {
            let member = member_name(base, key);
            self.check_name_available(&member)?;
            if !seen.insert(member.clone()) {
                return Err(ModelError::NameCollision { name: member });
            }
            members.push(member);
        }
        Ok(members)
    }
}
