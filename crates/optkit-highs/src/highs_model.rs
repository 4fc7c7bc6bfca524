//! Thin owned wrapper around the `highs` crate's row problem.
//!
//! [`HighsModel`] collects columns, rows, options and a primal start, hands
//! them to HiGHS in one [`HighsModel::solve`] call and keeps the solved model
//! around for reading back values.

use std::fmt;

use highs::{Col, HighsModelStatus, RowProblem, Sense as HighsSense, SolvedModel};
use optkit_core::Sense;
use tracing::{debug, trace, warn};

/// Raw outcome of one HiGHS run, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighsStatus {
    /// Optimal solution found
    Optimal,
    /// Problem is infeasible
    Infeasible,
    /// Problem is unbounded
    Unbounded,
    /// Presolve could not tell infeasible from unbounded
    UnboundedOrInfeasible,
    /// Solver reached time limit (may have feasible solution)
    ReachedTimeLimit,
    /// Solver reached iteration limit (may have feasible solution)
    ReachedIterationLimit,
    /// HiGHS refused to run or failed during the run
    Error,
    /// Any other model status
    Unknown,
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnCoefficientLengthMismatch {
        columns: usize,
        coefficients: usize,
    },
    ColumnIndexOutOfBounds {
        column_index: usize,
        num_columns: usize,
    },
    PrimalStartLengthMismatch {
        expected: usize,
        got: usize,
    },
    SolveRequired {
        operation: &'static str,
    },
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnCoefficientLengthMismatch {
                columns,
                coefficients,
            } => write!(
                f,
                "row has {columns} column indices but {coefficients} coefficients"
            ),
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "column index {column_index} out of bounds (model has {num_columns} columns)"
            ),
            HighsModelError::PrimalStartLengthMismatch { expected, got } => {
                write!(f, "primal start has {got} values, expected {expected}")
            }
            HighsModelError::SolveRequired { operation } => {
                write!(f, "{operation} requires a solved model")
            }
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Option value types for HiGHS solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

/// Primal and dual vectors copied out of a solved model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionSnapshot {
    pub col_values: Vec<f64>,
    pub col_duals: Vec<f64>,
    pub row_values: Vec<f64>,
    pub row_duals: Vec<f64>,
}

/// A HiGHS model under construction, or the result of solving one.
pub struct HighsModel {
    problem: RowProblem,
    columns: Vec<Col>,
    sense: Sense,
    solved: Option<SolvedModel>,
    verbose: bool,
    primal_start: Option<Vec<f64>>,
    options: Vec<(String, HighsOption)>,
}

impl HighsModel {
    /// Create an empty minimization model.
    pub fn new() -> Self {
        Self {
            problem: RowProblem::default(),
            columns: Vec::new(),
            sense: Sense::Minimize,
            solved: None,
            verbose: false,
            primal_start: None,
            options: Vec::new(),
        }
    }

    /// Add a continuous column and return its index.
    pub fn add_col(&mut self, lower_bound: f64, upper_bound: f64, objective_coefficient: f64) -> usize {
        self.push_col(lower_bound, upper_bound, objective_coefficient, false)
    }

    /// Add an integer column and return its index.
    pub fn add_integer_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
    ) -> usize {
        self.push_col(lower_bound, upper_bound, objective_coefficient, true)
    }

    fn push_col(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        objective_coefficient: f64,
        is_integer: bool,
    ) -> usize {
        trace!(
            lower_bound,
            upper_bound,
            objective_coefficient,
            is_integer,
            component = "solver",
            operation = "add_column",
            status = "success",
            "Adding column"
        );
        self.solved = None;
        self.primal_start = None;
        let col = if is_integer {
            self.problem
                .add_integer_column(objective_coefficient, lower_bound..=upper_bound)
        } else {
            self.problem
                .add_column(objective_coefficient, lower_bound..=upper_bound)
        };
        self.columns.push(col);
        self.columns.len() - 1
    }

    /// Add a row `lower_bound <= sum(coefficients[k] * x[columns[k]]) <= upper_bound`.
    ///
    /// # Errors
    ///
    /// Returns an error if columns and coefficients have different lengths
    /// or if any column index is out of bounds.
    pub fn add_row(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        columns: &[usize],
        coefficients: &[f64],
    ) -> Result<usize, HighsModelError> {
        if columns.len() != coefficients.len() {
            warn!(
                component = "solver",
                operation = "add_row",
                status = "error",
                columns = columns.len(),
                coefficients = coefficients.len(),
                "Column/coefficients length mismatch"
            );
            return Err(HighsModelError::ColumnCoefficientLengthMismatch {
                columns: columns.len(),
                coefficients: coefficients.len(),
            });
        }
        let num_columns = self.columns.len();
        let mut factors = Vec::with_capacity(columns.len());
        for (&column_index, &coefficient) in columns.iter().zip(coefficients) {
            let col = *self
                .columns
                .get(column_index)
                .ok_or(HighsModelError::ColumnIndexOutOfBounds {
                    column_index,
                    num_columns,
                })?;
            factors.push((col, coefficient));
        }
        trace!(
            lower_bound,
            upper_bound,
            nnz = factors.len(),
            component = "solver",
            operation = "add_row",
            status = "success",
            "Adding row"
        );
        self.solved = None;
        self.problem.add_row(lower_bound..=upper_bound, factors);
        Ok(self.problem.num_rows().saturating_sub(1))
    }

    /// Set the objective sense.
    pub fn set_sense(&mut self, sense: Sense) {
        self.sense = sense;
    }

    /// Let HiGHS print its own log for the next solve.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Queue a HiGHS option for the next solve.
    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Set primal start values, one per column.
    ///
    /// # Errors
    ///
    /// Returns an error if the length does not match the number of columns.
    pub fn set_primal_start(&mut self, cols: Vec<f64>) -> Result<(), HighsModelError> {
        if cols.len() != self.columns.len() {
            return Err(HighsModelError::PrimalStartLengthMismatch {
                expected: self.columns.len(),
                got: cols.len(),
            });
        }
        self.primal_start = Some(cols);
        Ok(())
    }

    /// Number of columns added so far.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows added so far.
    pub fn num_rows(&self) -> usize {
        self.problem.num_rows()
    }

    /// Hand the model to HiGHS and block until it returns.
    ///
    /// The built problem is consumed; after the call the wrapper holds only
    /// the solved model and must be rebuilt for another run.
    pub fn solve(&mut self) -> HighsStatus {
        debug!(
            num_cols = self.columns.len(),
            num_rows = self.problem.num_rows(),
            sense = self.sense.as_str(),
            options = self.options.len(),
            component = "solver",
            operation = "solve",
            status = "success",
            "Solving model"
        );

        let sense = match self.sense {
            Sense::Minimize => HighsSense::Minimise,
            Sense::Maximize => HighsSense::Maximise,
        };
        let problem = std::mem::take(&mut self.problem);
        let mut model = problem.optimise(sense);
        if self.verbose {
            model.set_option("output_flag", true);
            model.set_option("log_to_console", true);
        } else {
            model.make_quiet();
        }
        for (option, value) in self.options.drain(..) {
            match value {
                HighsOption::Bool(val) => model.set_option(option.as_str(), val),
                HighsOption::Int(val) => model.set_option(option.as_str(), val),
                HighsOption::Float(val) => model.set_option(option.as_str(), val),
                HighsOption::Str(val) => model.set_option(option.as_str(), val.as_str()),
            }
        }
        if let Some(cols) = self.primal_start.take()
            && let Err(err) = model.try_set_solution(Some(cols.as_slice()), None, None, None)
        {
            warn!(
                component = "solver",
                operation = "set_primal_start",
                status = "warn",
                ?err,
                "Failed to set primal start; continuing without it"
            );
        }
        self.columns.clear();

        match model.try_solve() {
            Ok(solved) => {
                let status = map_status(solved.status());
                trace!(
                    component = "solver",
                    operation = "solve",
                    status = "success",
                    ?status,
                    "Model status received"
                );
                self.solved = Some(solved);
                status
            }
            Err(err) => {
                warn!(
                    component = "solver",
                    operation = "solve",
                    status = "error",
                    ?err,
                    "HiGHS run failed"
                );
                self.solved = None;
                HighsStatus::Error
            }
        }
    }

    /// Objective value reported by HiGHS, without any constant offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn objective_value(&self) -> Result<f64, HighsModelError> {
        let solved = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "objective_value",
        })?;
        Ok(solved.objective_value())
    }

    /// Relative MIP gap of the last run, NaN before a solve.
    pub fn mip_gap(&self) -> f64 {
        self.solved.as_ref().map_or(f64::NAN, SolvedModel::mip_gap)
    }

    /// Copy the primal and dual vectors out of the solved model.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been solved yet.
    pub fn solution_snapshot(&self) -> Result<SolutionSnapshot, HighsModelError> {
        let solved = self.solved.as_ref().ok_or(HighsModelError::SolveRequired {
            operation: "solution_snapshot",
        })?;
        let solution = solved.get_solution();
        Ok(SolutionSnapshot {
            col_values: solution.columns().to_vec(),
            col_duals: solution.dual_columns().to_vec(),
            row_values: solution.rows().to_vec(),
            row_duals: solution.dual_rows().to_vec(),
        })
    }
}

impl Default for HighsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HighsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let objective_value = self.solved.as_ref().map(SolvedModel::objective_value);
        f.debug_struct("HighsModel")
            .field("num_columns", &self.columns.len())
            .field("num_rows", &self.problem.num_rows())
            .field("sense", &self.sense)
            .field("objective_value", &objective_value)
            .finish_non_exhaustive()
    }
}

fn map_status(status: HighsModelStatus) -> HighsStatus {
    match status {
        HighsModelStatus::Optimal => HighsStatus::Optimal,
        HighsModelStatus::Infeasible => HighsStatus::Infeasible,
        HighsModelStatus::Unbounded => HighsStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => HighsStatus::UnboundedOrInfeasible,
        HighsModelStatus::ReachedTimeLimit => HighsStatus::ReachedTimeLimit,
        HighsModelStatus::ReachedIterationLimit => HighsStatus::ReachedIterationLimit,
        HighsModelStatus::LoadError
        | HighsModelStatus::ModelError
        | HighsModelStatus::PresolveError
        | HighsModelStatus::SolveError
        | HighsModelStatus::PostsolveError => HighsStatus::Error,
        _ => HighsStatus::Unknown,
    }
}
