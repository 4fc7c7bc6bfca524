//! Status conversions at the HiGHS boundary.

use crate::highs_model::HighsStatus;
use optkit_solver::TerminationStatus;

/// Normalize a raw HiGHS status.
///
/// `UnboundedOrInfeasible` has no direct counterpart; callers resolve it
/// before reporting and it falls back to `Infeasible` here.
pub(crate) fn highs_to_termination(status: HighsStatus) -> TerminationStatus {
    match status {
        HighsStatus::Optimal => TerminationStatus::Optimal,
        HighsStatus::Infeasible | HighsStatus::UnboundedOrInfeasible => {
            TerminationStatus::Infeasible
        }
        HighsStatus::Unbounded => TerminationStatus::Unbounded,
        HighsStatus::ReachedTimeLimit | HighsStatus::ReachedIterationLimit => {
            TerminationStatus::Timeout
        }
        HighsStatus::Error | HighsStatus::Unknown => TerminationStatus::Error,
    }
}

pub(crate) fn highs_status_string(status: HighsStatus) -> &'static str {
    match status {
        HighsStatus::Optimal => "optimal",
        HighsStatus::Infeasible => "infeasible",
        HighsStatus::Unbounded => "unbounded",
        HighsStatus::UnboundedOrInfeasible => "unbounded_or_infeasible",
        HighsStatus::ReachedTimeLimit => "time_limit",
        HighsStatus::ReachedIterationLimit => "iteration_limit",
        HighsStatus::Error => "error",
        HighsStatus::Unknown => "unknown",
    }
}

/// Whether HiGHS may have left a usable primal point behind.
pub(crate) fn highs_may_have_point(status: HighsStatus) -> bool {
    matches!(
        status,
        HighsStatus::Optimal
            | HighsStatus::UnboundedOrInfeasible
            | HighsStatus::ReachedTimeLimit
            | HighsStatus::ReachedIterationLimit
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_become_timeout() {
        assert_eq!(
            highs_to_termination(HighsStatus::ReachedTimeLimit),
            TerminationStatus::Timeout
        );
        assert_eq!(
            highs_to_termination(HighsStatus::ReachedIterationLimit),
            TerminationStatus::Timeout
        );
    }

    #[test]
    fn test_direct_mappings() {
        assert_eq!(
            highs_to_termination(HighsStatus::Optimal),
            TerminationStatus::Optimal
        );
        assert_eq!(
            highs_to_termination(HighsStatus::Infeasible),
            TerminationStatus::Infeasible
        );
        assert_eq!(
            highs_to_termination(HighsStatus::Unbounded),
            TerminationStatus::Unbounded
        );
        assert_eq!(
            highs_to_termination(HighsStatus::Unknown),
            TerminationStatus::Error
        );
        assert_eq!(
            highs_to_termination(HighsStatus::Error),
            TerminationStatus::Error
        );
    }

    #[test]
    fn test_ambiguous_status_defaults_to_infeasible() {
        assert_eq!(
            highs_to_termination(HighsStatus::UnboundedOrInfeasible),
            TerminationStatus::Infeasible
        );
        assert_eq!(
            highs_status_string(HighsStatus::UnboundedOrInfeasible),
            "unbounded_or_infeasible"
        );
    }

    #[test]
    fn test_point_availability() {
        assert!(highs_may_have_point(HighsStatus::Optimal));
        assert!(highs_may_have_point(HighsStatus::ReachedTimeLimit));
        assert!(!highs_may_have_point(HighsStatus::Infeasible));
        assert!(!highs_may_have_point(HighsStatus::Unbounded));
        assert!(!highs_may_have_point(HighsStatus::Error));
    }
}
