//! Read access to solver output.

use crate::TerminationStatus;

/// Trait for accessing solution data from a solver.
///
/// Vectors are indexed by variable / constraint position. They are empty
/// when the solve produced no primal point.
pub trait SolutionView {
    /// Get the objective value, if the solve produced one.
    fn objective_value(&self) -> Option<f64>;

    /// Get the termination status.
    fn status(&self) -> TerminationStatus;

    /// Get all primal values as a slice.
    fn primal_values(&self) -> &[f64];

    /// Get all variable duals (reduced costs) as a slice.
    fn reduced_costs(&self) -> &[f64];

    /// Get all constraint activities as a slice.
    fn row_values(&self) -> &[f64];

    /// Get all constraint duals (shadow prices) as a slice.
    fn row_duals(&self) -> &[f64];

    /// Get the solve time in seconds.
    fn solve_time_seconds(&self) -> f64;

    /// Get the primal value at the given index.
    fn get_primal(&self, index: usize) -> Option<f64> {
        self.primal_values().get(index).copied()
    }

    /// Get the reduced cost at the given index.
    fn get_reduced_cost(&self, index: usize) -> Option<f64> {
        self.reduced_costs().get(index).copied()
    }

    /// Get the constraint activity at the given index.
    fn get_row_value(&self, index: usize) -> Option<f64> {
        self.row_values().get(index).copied()
    }

    /// Get the constraint dual at the given index.
    fn get_row_dual(&self, index: usize) -> Option<f64> {
        self.row_duals().get(index).copied()
    }

    /// Whether a primal point is available.
    fn has_primal(&self) -> bool {
        self.status().may_have_solution() && !self.primal_values().is_empty()
    }

    /// Check if the solution is optimal.
    fn is_optimal(&self) -> bool {
        self.status().is_optimal()
    }
}
