//! Shared solver abstractions for optkit.
//!
//! This crate provides the types that sit on the boundary between a model
//! and a solver backend (like `optkit-highs`).
//!
//! # Overview
//!
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`TerminationStatus`]: Closed set of outcomes every backend normalizes to
//! - [`SolverError`]: Errors that prevent a solve from being attempted
//! - [`SolutionView`]: Trait for accessing solution data

mod config;
mod error;
mod status;
mod traits;

pub use config::SolverConfig;
pub use error::SolverError;
pub use status::TerminationStatus;
pub use traits::SolutionView;
