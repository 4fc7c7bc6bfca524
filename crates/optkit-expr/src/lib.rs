//! Symbol handles and linear expressions shared by every optkit crate.

pub mod expr;
pub mod ids;

pub use expr::{ComparisonSense, ConstraintExpr, Expr, ExprError, linear_sum, linear_terms};
pub use ids::{ConstraintId, ProblemTag, VariableId};
