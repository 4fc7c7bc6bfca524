//! Expression types for optimization modeling.
//!
//! - `core`       : Expr: linear terms + constant
//! - `constraint` : ConstraintExpr: expression with comparison sense and RHS
//! - `builders`   : helpers assembling expressions from parallel inputs
//! - `error`      : Expression construction errors

pub mod builders;
pub mod constraint;
pub mod core;
pub mod error;

pub use builders::{linear_sum, linear_terms};
pub use constraint::{ComparisonSense, ConstraintExpr};
pub use self::core::Expr;
pub use error::ExprError;
