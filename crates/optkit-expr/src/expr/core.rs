//! Core expression type: linear terms plus a constant.
//!
//! Terms are kept in insertion order and may repeat a variable; duplicates
//! are only merged by [`Expr::normalized_terms`], which the model calls when
//! an expression is lowered into an objective or a constraint row.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::expr::error::ExprError;
use crate::ids::VariableId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Expr {
    constant: f64,
    linear: Vec<(VariableId, f64)>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Expression from linear terms and constant.
    pub fn new(linear: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self { constant, linear }
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single linear term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            linear: vec![(var_id, coeff)],
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self::term(var_id, 1.0)
    }

    /// From raw linear terms, no constant.
    pub fn from_linear(linear: Vec<(VariableId, f64)>) -> Self {
        Self {
            linear,
            ..Default::default()
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn linear_terms(&self) -> &[(VariableId, f64)] {
        &self.linear
    }

    /// Consume and return linear terms.
    pub fn into_linear_terms(self) -> Vec<(VariableId, f64)> {
        self.linear
    }

    /// Consume and return (linear_terms, constant).
    pub fn into_parts(self) -> (Vec<(VariableId, f64)>, f64) {
        (self.linear, self.constant)
    }

    /// Max degree of any term (0 = constant only).
    pub fn degree(&self) -> usize {
        usize::from(self.linear.iter().any(|(_, c)| *c != 0.0))
    }

    /// Variables referenced by this expression, in first-seen order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        let mut seen = Vec::with_capacity(self.linear.len());
        self.linear.iter().filter_map(move |(var_id, _)| {
            if seen.contains(var_id) {
                None
            } else {
                seen.push(*var_id);
                Some(*var_id)
            }
        })
    }

    /// Reject NaN or infinite coefficients and constants.
    pub fn validate(&self) -> Result<(), ExprError> {
        if !self.constant.is_finite() {
            return Err(ExprError::NonFiniteConstant {
                constant: self.constant,
            });
        }
        if let Some((_, coefficient)) = self.linear.iter().find(|(_, c)| !c.is_finite()) {
            return Err(ExprError::NonFiniteCoefficient {
                coefficient: *coefficient,
            });
        }
        Ok(())
    }

    // ── Operations ──────────────────────────────────────────

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            linear: self
                .linear
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
        }
    }

    /// Add another expression (concatenates terms, sums constants).
    pub fn add(&self, other: &Expr) -> Self {
        let mut linear = Vec::with_capacity(self.linear.len() + other.linear.len());
        linear.extend_from_slice(&self.linear);
        linear.extend_from_slice(&other.linear);
        Self {
            constant: self.constant + other.constant,
            linear,
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&self, value: f64) -> Self {
        Self {
            constant: self.constant + value,
            linear: self.linear.clone(),
        }
    }

    /// Copy with constant set to zero.
    pub fn without_constant(&self) -> Self {
        Self {
            constant: 0.0,
            linear: self.linear.clone(),
        }
    }

    /// Merged linear terms with duplicates combined and zeros dropped.
    pub fn normalized_terms(&self) -> Vec<(VariableId, f64)> {
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var_id, coeff) in &self.linear {
            if *coeff == 0.0 {
                continue;
            }
            *merged.entry(*var_id).or_insert(0.0) += *coeff;
        }
        merged.into_iter().filter(|(_, c)| *c != 0.0).collect()
    }

    /// Evaluate the expression given a value for every referenced variable.
    pub fn evaluate(&self, mut value_of: impl FnMut(VariableId) -> f64) -> f64 {
        self.linear
            .iter()
            .fold(self.constant, |acc, (var_id, coeff)| {
                acc + coeff * value_of(*var_id)
            })
    }

    /// Fallible variant of [`Expr::evaluate`]; stops at the first lookup error.
    pub fn try_evaluate<E>(
        &self,
        mut value_of: impl FnMut(VariableId) -> Result<f64, E>,
    ) -> Result<f64, E> {
        let mut total = self.constant;
        for (var_id, coeff) in &self.linear {
            total += coeff * value_of(*var_id)?;
        }
        Ok(total)
    }

    // ── Relations (produce ConstraintExpr) ──────────────────

    /// Build `self (sense) rhs`, moving every constant to the right-hand side.
    pub fn compare(&self, rhs: impl Into<Expr>, sense: ComparisonSense) -> ConstraintExpr {
        let combined = self.add(&rhs.into().scale(-1.0));
        ConstraintExpr::new(combined.without_constant(), sense, -combined.constant)
    }

    pub fn leq(&self, rhs: impl Into<Expr>) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::LessEqual)
    }

    pub fn geq(&self, rhs: impl Into<Expr>) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn equals(&self, rhs: impl Into<Expr>) -> ConstraintExpr {
        self.compare(rhs, ComparisonSense::Equal)
    }
}

// ── Conversions ─────────────────────────────────────────────

impl From<VariableId> for Expr {
    fn from(var_id: VariableId) -> Self {
        Expr::var(var_id)
    }
}

impl From<f64> for Expr {
    fn from(constant: f64) -> Self {
        Expr::from_constant(constant)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

// ── Operator overloads ──────────────────────────────────────

impl<R: Into<Expr>> std::ops::Add<R> for Expr {
    type Output = Expr;

    fn add(self, rhs: R) -> Self::Output {
        Expr::add(&self, &rhs.into())
    }
}

impl<R: Into<Expr>> std::ops::Sub<R> for Expr {
    type Output = Expr;

    fn sub(self, rhs: R) -> Self::Output {
        Expr::add(&self, &rhs.into().scale(-1.0))
    }
}

impl<R: Into<Expr>> std::ops::AddAssign<R> for Expr {
    fn add_assign(&mut self, rhs: R) {
        let (linear, constant) = rhs.into().into_parts();
        self.linear.extend(linear);
        self.constant += constant;
    }
}

impl<R: Into<Expr>> std::ops::SubAssign<R> for Expr {
    fn sub_assign(&mut self, rhs: R) {
        *self += rhs.into().scale(-1.0);
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        rhs.scale(self)
    }
}

impl std::ops::Div<f64> for Expr {
    type Output = Expr;

    fn div(self, rhs: f64) -> Self::Output {
        self.scale(rhs.recip())
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Self {
        iter.fold(Expr::new_empty(), |acc, expr| acc + expr)
    }
}

impl std::iter::Sum<VariableId> for Expr {
    fn sum<I: Iterator<Item = VariableId>>(iter: I) -> Self {
        Expr::from_linear(iter.map(|var_id| (var_id, 1.0)).collect())
    }
}

// Handles behave like single-term expressions in arithmetic.

impl std::ops::Mul<f64> for VariableId {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        Expr::term(self, rhs)
    }
}

impl std::ops::Mul<VariableId> for f64 {
    type Output = Expr;

    fn mul(self, rhs: VariableId) -> Self::Output {
        Expr::term(rhs, self)
    }
}

impl<R: Into<Expr>> std::ops::Add<R> for VariableId {
    type Output = Expr;

    fn add(self, rhs: R) -> Self::Output {
        Expr::var(self) + rhs
    }
}

impl<R: Into<Expr>> std::ops::Sub<R> for VariableId {
    type Output = Expr;

    fn sub(self, rhs: R) -> Self::Output {
        Expr::var(self) - rhs
    }
}

impl std::ops::Neg for VariableId {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::term(self, -1.0)
    }
}
