//! HiGHS backend for optkit.
//!
//! [`HighsOptimizer`] translates a [`optkit_core::Problem`] into a HiGHS row
//! problem, solves it and reports a normalized
//! [`optkit_core::SolveResult`].

mod highs_model;
mod solver;
mod status;

pub use highs_model::{HighsModel, HighsModelError, HighsOption, HighsStatus, SolutionSnapshot};
pub use solver::HighsOptimizer;
