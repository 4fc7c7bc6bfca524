//! Expression construction errors.

#[derive(Debug, Clone, PartialEq)]
pub enum ExprError {
    MixedInputs,
    MissingInputs,
    MismatchedLengths { variables: usize, coefficients: usize },
    NonFiniteCoefficient { coefficient: f64 },
    NonFiniteConstant { constant: f64 },
}

impl ExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ExprError::MixedInputs => "EXPR_MIXED_INPUTS",
            ExprError::MissingInputs => "EXPR_MISSING_INPUTS",
            ExprError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
            ExprError::NonFiniteCoefficient { .. } => "EXPR_NON_FINITE_COEFFICIENT",
            ExprError::NonFiniteConstant { .. } => "EXPR_NON_FINITE_CONSTANT",
        }
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::MixedInputs => write!(
                f,
                "[{}] Use either terms or variables/coefficients, not both",
                self.code()
            ),
            ExprError::MissingInputs => write!(
                f,
                "[{}] variables and coefficients are required",
                self.code()
            ),
            ExprError::MismatchedLengths {
                variables,
                coefficients,
            } => write!(
                f,
                "[{}] {} variables but {} coefficients",
                self.code(),
                variables,
                coefficients
            ),
            ExprError::NonFiniteCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite (got {})",
                self.code(),
                coefficient
            ),
            ExprError::NonFiniteConstant { constant } => write!(
                f,
                "[{}] Constant term must be finite (got {})",
                self.code(),
                constant
            ),
        }
    }
}

impl std::error::Error for ExprError {}
