use optkit_expr::VariableId;
use serde::{Deserialize, Serialize};

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Value domain of a decision variable: bounds, integrality and an optional
/// initial guess handed to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
    pub start: Option<f64>,
}

impl Domain {
    /// Continuous variable with the given bounds.
    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            integer: false,
            start: None,
        }
    }

    /// Unbounded continuous variable.
    pub fn free() -> Self {
        Self::bounded(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Continuous variable in `[0, +inf)`.
    pub fn non_negative() -> Self {
        Self::bounded(0.0, f64::INFINITY)
    }

    /// Integer variable with the given bounds.
    pub fn integer(lower: f64, upper: f64) -> Self {
        Self {
            integer: true,
            ..Self::bounded(lower, upper)
        }
    }

    /// Integer variable in `[0, 1]`.
    pub fn binary() -> Self {
        Self::integer(0.0, 1.0)
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = lower;
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = upper;
        self
    }

    /// Mark the variable as integer-valued.
    pub fn integral(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Attach an initial guess.
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub(crate) fn has_valid_bounds(&self) -> bool {
        bounds_are_valid(self.lower, self.upper)
    }

    pub(crate) fn admits(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower && value <= self.upper
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::free()
    }
}

/// Lower and upper bounds of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub(crate) fn is_valid(&self) -> bool {
        bounds_are_valid(self.lower, self.upper)
    }
}

/// A registered decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
}

/// A registered constraint row. Coefficients live in the problem's
/// column storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub bounds: Bounds,
}

/// Objective function: sense, merged linear terms and a constant offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub terms: Vec<(VariableId, f64)>,
    pub constant: f64,
}

fn bounds_are_valid(lower: f64, upper: f64) -> bool {
    !lower.is_nan()
        && !upper.is_nan()
        && lower <= upper
        && lower != f64::INFINITY
        && upper != f64::NEG_INFINITY
}
