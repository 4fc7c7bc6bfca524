//! Linear reformulations of risk measures over a finite scenario set.
//!
//! A scenario is a `(probability, loss)` pair where the loss is a linear
//! expression in the problem's variables. Probabilities must be finite,
//! non-negative and sum to one.
//!
//! - [`expectation`]: probability-weighted loss, no auxiliary symbols.
//! - [`cvar`]: Rockafellar–Uryasev form of the conditional value at risk.
//! - [`worst_case`]: epigraph of the largest scenario loss.
//!
//! The returned expressions are meant for an objective or a constraint of
//! the same problem. Minimizing a CVaR expression (alone or as part of a
//! minimized objective) yields the CVaR at the optimum.

use optkit_expr::{ConstraintExpr, Expr, VariableId, linear_sum};

use crate::model::{ConstraintArray, IndexKey, IndexSet, ModelError, Problem, VariableArray};
use crate::types::Domain;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// One outcome of the uncertain loss.
pub type Scenario = (f64, Expr);

/// Symbols created by [`cvar`].
#[derive(Debug, Clone)]
pub struct CvarHandle {
    /// Free auxiliary variable; equals the value at risk at an optimum.
    pub threshold: VariableId,
    /// Excess of each scenario loss over the threshold, `u[s] >= 0`.
    pub excess: VariableArray,
    /// Rows `u[s] + t - loss[s] >= 0`.
    pub shortfall: ConstraintArray,
    expr: Expr,
}

impl CvarHandle {
    /// `t + 1/(1 - alpha) * sum_s p_s * u_s`.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

/// Symbols created by [`worst_case`].
#[derive(Debug, Clone)]
pub struct WorstCaseHandle {
    /// Free variable bounding every scenario loss from above.
    pub bound: VariableId,
    /// Rows `z - loss[s] >= 0`.
    pub dominance: ConstraintArray,
}

impl WorstCaseHandle {
    pub fn expr(&self) -> Expr {
        Expr::var(self.bound)
    }
}

/// Probability-weighted sum of the scenario losses.
pub fn expectation(scenarios: &[Scenario]) -> Result<Expr, ModelError> {
    validate_scenarios(scenarios)?;
    Ok(linear_sum(
        scenarios
            .iter()
            .map(|(probability, loss)| loss.scale(*probability))
            .collect(),
    ))
}

/// Add the auxiliary variables and rows of the CVaR reformulation at level
/// `alpha` and return them with the CVaR expression.
///
/// Creates `{name}_var` (threshold), `{name}_excess[s]` and
/// `{name}_shortfall[s]` for scenario positions `s = 0..n`.
pub fn cvar(
    problem: &mut Problem,
    name: &str,
    alpha: f64,
    scenarios: &[Scenario],
) -> Result<CvarHandle, ModelError> {
    if !(0.0..1.0).contains(&alpha) {
        return Err(ModelError::InvalidRiskParameter {
            reason: format!("alpha must lie in [0, 1) (got {alpha})"),
        });
    }
    validate_scenarios(scenarios)?;
    validate_losses(problem, scenarios)?;

    let threshold_name = format!("{name}_var");
    let excess_name = format!("{name}_excess");
    let shortfall_name = format!("{name}_shortfall");
    let set = scenario_set(name, scenarios.len())?;
    reserve_names(
        problem,
        &[threshold_name.as_str()],
        &[excess_name.as_str(), shortfall_name.as_str()],
        &set,
    )?;

    let threshold = problem.add_variable(threshold_name, Domain::free())?;
    let excess = problem.add_variables(excess_name, &set, Domain::non_negative())?;
    let shortfall = problem.add_constraints(shortfall_name, &set, |key| {
        shortfall_row(&excess, threshold, key_position(&set, key), scenarios)
    })?;

    let tail_weight = 1.0 / (1.0 - alpha);
    let expr = Expr::var(threshold)
        + excess.weighted_sum(|key| {
            let (probability, _) = &scenarios[key_position(&set, key)];
            tail_weight * probability
        });

    tracing::debug!(
        component = "risk",
        operation = "cvar",
        status = "success",
        name = %name,
        alpha,
        scenarios = scenarios.len(),
        "Added CVaR reformulation"
    );
    Ok(CvarHandle {
        threshold,
        excess,
        shortfall,
        expr,
    })
}

/// Add a free variable `name` bounding every scenario loss from above.
///
/// Minimizing it yields the worst-case loss.
pub fn worst_case(
    problem: &mut Problem,
    name: &str,
    scenarios: &[Scenario],
) -> Result<WorstCaseHandle, ModelError> {
    validate_scenarios(scenarios)?;
    validate_losses(problem, scenarios)?;
    let dominance_name = format!("{name}_dominance");
    let set = scenario_set(name, scenarios.len())?;
    reserve_names(problem, &[name], &[dominance_name.as_str()], &set)?;

    let bound = problem.add_variable(name, Domain::free())?;
    let dominance = problem.add_constraints(dominance_name, &set, |key| {
        let (_, loss) = &scenarios[key_position(&set, key)];
        (Expr::var(bound) - loss).geq(0.0)
    })?;

    tracing::debug!(
        component = "risk",
        operation = "worst_case",
        status = "success",
        name = %name,
        scenarios = scenarios.len(),
        "Added worst-case epigraph"
    );
    Ok(WorstCaseHandle { bound, dominance })
}

fn shortfall_row(
    excess: &VariableArray,
    threshold: VariableId,
    position: usize,
    scenarios: &[Scenario],
) -> ConstraintExpr {
    let (_, loss) = &scenarios[position];
    let mut row = Expr::var(threshold) - loss;
    if let Some(u) = excess.at(position) {
        row += u;
    }
    row.geq(0.0)
}

/// Check every symbol name a reformulation will register, family members
/// included, so a collision is reported before the first symbol is added.
fn reserve_names(
    problem: &Problem,
    singles: &[&str],
    families: &[&str],
    set: &IndexSet,
) -> Result<(), ModelError> {
    for single in singles {
        problem.check_name_available(single)?;
    }
    for family in families {
        problem.check_name_available(family)?;
        problem.member_names(family, set)?;
    }
    Ok(())
}

fn scenario_set(name: &str, count: usize) -> Result<IndexSet, ModelError> {
    IndexSet::range(format!("{name}_scenarios"), 0..count as i64)
}

// Keys handed to family closures always come from `set`.
fn key_position(set: &IndexSet, key: &IndexKey) -> usize {
    set.position(key).unwrap_or_default()
}

fn validate_scenarios(scenarios: &[Scenario]) -> Result<(), ModelError> {
    if scenarios.is_empty() {
        return Err(ModelError::InvalidRiskParameter {
            reason: "at least one scenario is required".to_string(),
        });
    }
    let mut total = 0.0;
    for (position, (probability, _)) in scenarios.iter().enumerate() {
        if !probability.is_finite() || *probability < 0.0 {
            return Err(ModelError::InvalidRiskParameter {
                reason: format!("scenario {position} has probability {probability}"),
            });
        }
        total += probability;
    }
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ModelError::InvalidRiskParameter {
            reason: format!("probabilities sum to {total}, expected 1"),
        });
    }
    Ok(())
}

fn validate_losses(problem: &Problem, scenarios: &[Scenario]) -> Result<(), ModelError> {
    for (_, loss) in scenarios {
        problem.lower_expr(loss)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn equally_likely(losses: &[f64]) -> Vec<Scenario> {
        let p = 1.0 / losses.len() as f64;
        losses
            .iter()
            .map(|&loss| (p, Expr::from_constant(loss)))
            .collect()
    }

    #[test]
    fn expectation_weights_losses() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        let scenarios = vec![(0.25, x * 4.0), (0.75, Expr::var(x) + 8.0)];
        let expr = expectation(&scenarios).unwrap();
        assert_eq!(expr.constant(), 6.0);
        assert_eq!(expr.normalized_terms(), vec![(x, 1.75)]);
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        let scenarios = vec![(0.5, Expr::from_constant(1.0))];
        let err = expectation(&scenarios).unwrap_err();
        assert_eq!(err.code(), "RISK_INVALID_PARAMETER");

        let negative = vec![(1.5, Expr::new_empty()), (-0.5, Expr::new_empty())];
        assert!(expectation(&negative).is_err());
        assert!(expectation(&[]).is_err());
    }

    #[test]
    fn cvar_rejects_alpha_outside_unit_interval() {
        let mut problem = Problem::new();
        let scenarios = equally_likely(&[1.0, 2.0]);
        for alpha in [1.0, -0.1, f64::NAN] {
            let err = cvar(&mut problem, "risk", alpha, &scenarios).unwrap_err();
            assert!(matches!(err, ModelError::InvalidRiskParameter { .. }));
        }
        assert_eq!(problem.num_variables(), 0);
    }

    #[test]
    fn cvar_builds_rockafellar_uryasev_rows() {
        let mut problem = Problem::new();
        let scenarios = equally_likely(&[1.0, 2.0, 3.0, 4.0]);
        let handle = cvar(&mut problem, "risk", 0.5, &scenarios).unwrap();

        assert_eq!(problem.num_variables(), 5);
        assert_eq!(problem.num_constraints(), 4);
        assert_eq!(problem.variable_by_name("risk_var"), Some(handle.threshold));
        assert_eq!(
            problem.variable_by_name("risk_excess[2]"),
            handle.excess.get(2)
        );

        let row = handle.shortfall.get(3).unwrap();
        let stored = problem.get_constraint(row).unwrap();
        assert_eq!(stored.bounds.lower, 4.0);
        assert!(stored.bounds.upper.is_infinite());

        // t + 2 * 0.25 * sum(u)
        let weights: Vec<f64> = handle
            .expr()
            .normalized_terms()
            .iter()
            .map(|(_, coeff)| *coeff)
            .collect();
        assert_eq!(weights, vec![1.0, 0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn cvar_names_must_be_free() {
        let mut problem = Problem::new();
        problem.add_variable("risk_var", Domain::free()).unwrap();
        let err = cvar(&mut problem, "risk", 0.5, &equally_likely(&[1.0])).unwrap_err();
        assert!(matches!(err, ModelError::NameCollision { .. }));
        assert_eq!(problem.num_variables(), 1);
    }

    #[test]
    fn worst_case_bounds_every_loss() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::non_negative()).unwrap();
        let scenarios = vec![(0.5, x * 2.0), (0.5, Expr::var(x) + 1.0)];
        let handle = worst_case(&mut problem, "worst", &scenarios).unwrap();
        assert_eq!(handle.dominance.len(), 2);
        assert_eq!(handle.expr().normalized_terms(), vec![(handle.bound, 1.0)]);
        let second = problem.get_constraint(handle.dominance.at(1).unwrap()).unwrap();
        assert_eq!(second.bounds.lower, 1.0);
    }

    #[test]
    fn cvar_member_collision_leaves_problem_unchanged() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        problem.add_variable("risk_excess[1]", Domain::free()).unwrap();
        let scenarios = equally_likely(&[1.0, 2.0]);

        let err = cvar(&mut problem, "risk", 0.5, &scenarios).unwrap_err();
        assert!(matches!(err, ModelError::NameCollision { ref name } if name == "risk_excess[1]"));
        assert_eq!((problem.num_variables(), problem.num_constraints()), (2, 0));
        assert!(!problem.is_name_taken("risk_var"));
        assert!(!problem.is_name_taken("risk_excess"));

        problem.add_constraint("other_shortfall[0]", Expr::var(x).geq(0.0)).unwrap();
        let err = cvar(&mut problem, "other", 0.5, &scenarios).unwrap_err();
        assert_eq!(err.code(), "MODEL_NAME_COLLISION");
        assert_eq!((problem.num_variables(), problem.num_constraints()), (2, 1));
        assert!(!problem.is_name_taken("other_var"));
        assert!(!problem.is_name_taken("other_excess[0]"));

        // A fresh name still goes through.
        cvar(&mut problem, "fresh", 0.5, &scenarios).unwrap();
        assert!(problem.is_name_taken("fresh_var"));
    }

    #[test]
    fn worst_case_member_collision_leaves_problem_unchanged() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", Domain::free()).unwrap();
        problem
            .add_constraint("worst_dominance[0]", Expr::var(x).geq(0.0))
            .unwrap();
        let scenarios = equally_likely(&[1.0, 2.0]);

        let err = worst_case(&mut problem, "worst", &scenarios).unwrap_err();
        assert!(matches!(err, ModelError::NameCollision { ref name } if name == "worst_dominance[0]"));
        assert_eq!((problem.num_variables(), problem.num_constraints()), (1, 1));
        assert!(!problem.is_name_taken("worst"));

        let err = worst_case(&mut problem, "x", &scenarios).unwrap_err();
        assert!(matches!(err, ModelError::NameCollision { ref name } if name == "x"));
        assert_eq!(problem.num_variables(), 1);
    }

    #[test]
    fn foreign_losses_rejected_before_any_symbol_is_added() {
        let mut other = Problem::new();
        let y = other.add_variable("y", Domain::free()).unwrap();
        let mut problem = Problem::new();
        let scenarios = vec![(1.0, Expr::var(y))];
        let err = worst_case(&mut problem, "worst", &scenarios).unwrap_err();
        assert!(matches!(err, ModelError::ForeignHandle { .. }));
        assert_eq!(problem.num_variables(), 0);
    }
}
