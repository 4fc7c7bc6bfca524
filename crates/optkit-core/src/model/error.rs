//! Model and query error types.

use optkit_expr::{ConstraintId, ExprError, VariableId};

/// Errors raised while building or updating a problem.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A variable, constraint or family already uses this name.
    NameCollision { name: String },
    /// Names must be non-empty.
    EmptyName,
    /// Lower bound above upper bound, or a NaN bound.
    InvalidBounds { name: String, lower: f64, upper: f64 },
    /// Initial guess outside the variable's bounds.
    StartOutOfBounds {
        name: String,
        start: f64,
        lower: f64,
        upper: f64,
    },
    /// Non-finite coefficient or constant in an expression.
    InvalidCoefficient { coefficient: f64 },
    /// Malformed expression input.
    Expression(ExprError),
    /// Variable handle is not registered in this problem.
    UnknownVariable(VariableId),
    /// Constraint handle is not registered in this problem.
    UnknownConstraint(ConstraintId),
    /// No variable or constraint carries this name.
    UnknownName { name: String },
    /// Handle was issued by a different problem.
    ForeignHandle { handle: String },
    /// Index set without keys.
    EmptyIndexSet { name: String },
    /// Index set with a repeated key.
    DuplicateIndexKey { set: String, key: String },
    /// Risk measure input rejected.
    InvalidRiskParameter { reason: String },
    /// More symbols of one kind than a handle can address.
    CapacityExceeded { kind: &'static str },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::NameCollision { .. } => "MODEL_NAME_COLLISION",
            ModelError::EmptyName => "MODEL_EMPTY_NAME",
            ModelError::InvalidBounds { .. } => "MODEL_INVALID_BOUNDS",
            ModelError::StartOutOfBounds { .. } => "VARIABLE_START_OUT_OF_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "EXPR_INVALID_COEFFICIENT",
            ModelError::Expression(err) => err.code(),
            ModelError::UnknownVariable(_) => "VARIABLE_UNKNOWN",
            ModelError::UnknownConstraint(_) => "CONSTRAINT_UNKNOWN",
            ModelError::UnknownName { .. } => "MODEL_UNKNOWN_NAME",
            ModelError::ForeignHandle { .. } => "MODEL_FOREIGN_HANDLE",
            ModelError::EmptyIndexSet { .. } => "INDEX_SET_EMPTY",
            ModelError::DuplicateIndexKey { .. } => "INDEX_SET_DUPLICATE_KEY",
            ModelError::InvalidRiskParameter { .. } => "RISK_INVALID_PARAMETER",
            ModelError::CapacityExceeded { .. } => "MODEL_CAPACITY_EXCEEDED",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::NameCollision { name } => {
                write!(f, "[{}] Name '{}' is already in use", self.code(), name)
            }
            ModelError::EmptyName => write!(f, "[{}] Names must not be empty", self.code()),
            ModelError::InvalidBounds { name, lower, upper } => write!(
                f,
                "[{}] Bounds of '{}' invalid: lower ({}) > upper ({})",
                self.code(),
                name,
                lower,
                upper
            ),
            ModelError::StartOutOfBounds {
                name,
                start,
                lower,
                upper,
            } => write!(
                f,
                "[{}] Start value {} of '{}' lies outside [{}, {}]",
                self.code(),
                start,
                name,
                lower,
                upper
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficients must be finite (got {})",
                self.code(),
                coefficient
            ),
            ModelError::Expression(err) => write!(f, "{err}"),
            ModelError::UnknownVariable(id) => {
                write!(f, "[{}] Variable {} does not exist", self.code(), id)
            }
            ModelError::UnknownConstraint(id) => {
                write!(f, "[{}] Constraint {} does not exist", self.code(), id)
            }
            ModelError::UnknownName { name } => {
                write!(f, "[{}] No symbol named '{}'", self.code(), name)
            }
            ModelError::ForeignHandle { handle } => write!(
                f,
                "[{}] Handle {} belongs to another problem",
                self.code(),
                handle
            ),
            ModelError::EmptyIndexSet { name } => {
                write!(f, "[{}] Index set '{}' has no keys", self.code(), name)
            }
            ModelError::DuplicateIndexKey { set, key } => write!(
                f,
                "[{}] Index set '{}' repeats key '{}'",
                self.code(),
                set,
                key
            ),
            ModelError::InvalidRiskParameter { reason } => {
                write!(f, "[{}] Invalid risk measure input: {}", self.code(), reason)
            }
            ModelError::CapacityExceeded { kind } => write!(
                f,
                "[{}] Too many {} for 32-bit handles",
                self.code(),
                kind
            ),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<ExprError> for ModelError {
    fn from(err: ExprError) -> Self {
        match err {
            ExprError::NonFiniteCoefficient { coefficient } => {
                ModelError::InvalidCoefficient { coefficient }
            }
            ExprError::NonFiniteConstant { constant } => ModelError::InvalidCoefficient {
                coefficient: constant,
            },
            other => ModelError::Expression(other),
        }
    }
}

/// Errors raised when reading results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No usable solution: never solved, no primal point, or modified since.
    NoSolution,
    /// The solve produced primal values but no duals (e.g. a MIP).
    DualUnavailable,
    /// The queried handle or name is not valid for this problem.
    Model(ModelError),
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::NoSolution => "RESULT_NO_SOLUTION",
            QueryError::DualUnavailable => "RESULT_NO_DUAL",
            QueryError::Model(err) => err.code(),
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::NoSolution => write!(
                f,
                "[{}] No solution available; solve the problem first",
                self.code()
            ),
            QueryError::DualUnavailable => write!(
                f,
                "[{}] The solver reported no dual values for this solve",
                self.code()
            ),
            QueryError::Model(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::NoSolution | QueryError::DualUnavailable => None,
            QueryError::Model(err) => Some(err),
        }
    }
}

impl From<ModelError> for QueryError {
    fn from(err: ModelError) -> Self {
        QueryError::Model(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optkit_expr::ProblemTag;

    #[test]
    fn display_carries_code_and_name() {
        let err = ModelError::NameCollision {
            name: "x".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[MODEL_NAME_COLLISION]"));
        assert!(msg.contains("'x'"));
    }

    #[test]
    fn capacity_error_names_the_symbol_kind() {
        let err = ModelError::CapacityExceeded { kind: "constraints" };
        assert_eq!(
            err.to_string(),
            "[MODEL_CAPACITY_EXCEEDED] Too many constraints for 32-bit handles"
        );
    }

    #[test]
    fn expr_errors_map_to_invalid_coefficient() {
        let err: ModelError = ExprError::NonFiniteCoefficient {
            coefficient: f64::NAN,
        }
        .into();
        assert!(matches!(err, ModelError::InvalidCoefficient { .. }));

        let err: ModelError = ExprError::MixedInputs.into();
        assert_eq!(err, ModelError::Expression(ExprError::MixedInputs));
        assert_eq!(err.code(), ExprError::MixedInputs.code());
    }

    #[test]
    fn query_error_wraps_model_error() {
        let id = VariableId::new(ProblemTag::new(9), 0);
        let err: QueryError = ModelError::UnknownVariable(id).into();
        assert_eq!(err.code(), "VARIABLE_UNKNOWN");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(QueryError::NoSolution.code(), "RESULT_NO_SOLUTION");
        assert!(QueryError::NoSolution.to_string().contains("No solution"));
    }
}
