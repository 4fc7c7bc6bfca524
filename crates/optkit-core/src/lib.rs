//! optkit core: problem builder, result queries and risk reformulations.
//!
//! A [`Problem`] is built from named variables, constraints and one
//! objective, solved through an attached [`Optimizer`], and queried for
//! values, duals and activities afterwards.

pub mod model;
pub mod risk;
pub mod solver;
pub mod types;

pub use model::{
    ConstraintArray, Family, IndexKey, IndexSet, ModelError, Problem, QueryError, VariableArray,
};
pub use solver::{Optimizer, SolveResult, solve};
pub use types::{Bounds, Constraint, Domain, Objective, Sense, Variable};

pub use optkit_expr::{ConstraintExpr, ConstraintId, Expr, VariableId};
pub use optkit_solver::{SolutionView, SolverConfig, SolverError, TerminationStatus};
