//! Builder functions for constructing linear expressions.

use crate::expr::core::Expr;
use crate::expr::error::ExprError;
use crate::ids::VariableId;

/// Build an Expr from flexible inputs.
///
/// Accepts either:
/// - `terms`: pre-paired (VariableId, f64) tuples
/// - `variables` + `coefficients`: separate vecs zipped together
///
/// Returns an error if both styles are mixed or if lengths mismatch.
pub fn linear_terms(
    terms: Option<Vec<(VariableId, f64)>>,
    variables: Option<Vec<VariableId>>,
    coefficients: Option<Vec<f64>>,
) -> Result<Expr, ExprError> {
    let expr = match (terms, variables, coefficients) {
        (Some(t), None, None) => {
            let filtered: Vec<_> = t.into_iter().filter(|(_, c)| *c != 0.0).collect();
            Expr::from_linear(filtered)
        }
        (None, Some(vars), Some(coeffs)) => {
            if vars.len() != coeffs.len() {
                return Err(ExprError::MismatchedLengths {
                    variables: vars.len(),
                    coefficients: coeffs.len(),
                });
            }
            let filtered: Vec<_> = vars
                .into_iter()
                .zip(coeffs)
                .filter(|(_, c)| *c != 0.0)
                .collect();
            Expr::from_linear(filtered)
        }
        (None, None, None) => return Err(ExprError::MissingInputs),
        (None, Some(_), None) | (None, None, Some(_)) => return Err(ExprError::MissingInputs),
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => return Err(ExprError::MixedInputs),
    };
    expr.validate()?;
    Ok(expr)
}

/// Combines multiple expressions into one by concatenating their terms and
/// summing their constants.
///
/// Duplicate variable terms are NOT merged - use `normalized_terms()` on the
/// result if term consolidation is needed.
pub fn linear_sum(exprs: Vec<Expr>) -> Expr {
    let mut terms = Vec::new();
    let mut constant = 0.0;
    for expr in exprs {
        let (linear, offset) = expr.into_parts();
        terms.extend(linear);
        constant += offset;
    }
    Expr::new(terms, constant)
}
