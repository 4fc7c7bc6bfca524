//! The teaching lessons: small problems built, solved and read back
//! through the public optkit API.

use std::collections::BTreeMap;
use std::error::Error;

use clap::ValueEnum;
use optkit_core::risk::{self, Scenario};
use optkit_core::{
    Domain, Expr, IndexKey, IndexSet, Problem, SolverConfig, TerminationStatus, VariableId,
};
use optkit_highs::HighsOptimizer;
use serde::Serialize;

pub type LessonResult = Result<LessonReport, Box<dyn Error>>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum Lesson {
    Diet,
    Infeasible,
    BoundUpdate,
    IndexSets,
    Cvar,
}

impl Lesson {
    pub const ALL: [Lesson; 5] = [
        Lesson::Diet,
        Lesson::Infeasible,
        Lesson::BoundUpdate,
        Lesson::IndexSets,
        Lesson::Cvar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Lesson::Diet => "diet",
            Lesson::Infeasible => "infeasible",
            Lesson::BoundUpdate => "bound-update",
            Lesson::IndexSets => "index-sets",
            Lesson::Cvar => "cvar",
        }
    }

    pub fn run(self, config: &SolverConfig) -> LessonResult {
        tracing::debug!(
            component = "lab",
            operation = "run_lesson",
            status = "success",
            lesson = self.as_str(),
            "Running lesson"
        );
        match self {
            Lesson::Diet => diet(config),
            Lesson::Infeasible => infeasible(config),
            Lesson::BoundUpdate => bound_update(config),
            Lesson::IndexSets => index_sets(config),
            Lesson::Cvar => cvar(config),
        }
    }
}

/// One solve inside a lesson.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub label: String,
    pub status: TerminationStatus,
    pub objective: Option<f64>,
    pub values: BTreeMap<String, f64>,
    pub duals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonReport {
    pub lesson: &'static str,
    pub stages: Vec<Stage>,
}

impl LessonReport {
    fn new(lesson: Lesson) -> Self {
        Self {
            lesson: lesson.as_str(),
            stages: Vec::new(),
        }
    }
}

/// Solve `problem` and record the named values and duals that are available.
fn solve_stage(
    problem: &mut Problem,
    config: &SolverConfig,
    label: &str,
    names: &[&str],
    rows: &[&str],
) -> Result<Stage, Box<dyn Error>> {
    let status = optkit_core::solve(problem, config)?;
    let values = names
        .iter()
        .filter_map(|name| {
            problem
                .value_by_name(name)
                .ok()
                .map(|value| (name.to_string(), value))
        })
        .collect();
    let duals = rows
        .iter()
        .filter_map(|name| {
            let id = problem.constraint_by_name(name)?;
            problem.dual(id).ok().map(|dual| (name.to_string(), dual))
        })
        .collect();
    Ok(Stage {
        label: label.to_string(),
        status,
        objective: problem.objective_value().ok(),
        values,
        duals,
    })
}

struct Diet {
    problem: Problem,
    x: VariableId,
    y: VariableId,
}

/// minimize 12x + 20y s.t. 6x + 8y >= 100, 7x + 12y >= 120, x >= 0, 0 <= y <= 3
fn diet_problem() -> Result<Diet, Box<dyn Error>> {
    let mut problem = Problem::with_optimizer(HighsOptimizer::new());
    let x = problem.add_variable("x", Domain::non_negative())?;
    let y = problem.add_variable("y", Domain::bounded(0.0, 3.0))?;
    problem.add_constraint("protein", (x * 6.0 + y * 8.0).geq(100.0))?;
    problem.add_constraint("calories", (x * 7.0 + y * 12.0).geq(120.0))?;
    problem.minimize(x * 12.0 + y * 20.0)?;
    Ok(Diet { problem, x, y })
}

fn diet(config: &SolverConfig) -> LessonResult {
    let mut diet = diet_problem()?;
    let mut report = LessonReport::new(Lesson::Diet);
    report.stages.push(solve_stage(
        &mut diet.problem,
        config,
        "optimum",
        &["x", "y", "protein", "calories"],
        &["protein", "calories"],
    )?);
    Ok(report)
}

fn infeasible(config: &SolverConfig) -> LessonResult {
    let mut problem = Problem::with_optimizer(HighsOptimizer::new());
    let x = problem.add_variable("x", Domain::free())?;
    problem.add_constraint("at_least_ten", Expr::var(x).geq(10.0))?;
    let ceiling = problem.add_constraint("at_most_zero", Expr::var(x).leq(0.0))?;
    problem.minimize(x)?;

    let mut report = LessonReport::new(Lesson::Infeasible);
    report
        .stages
        .push(solve_stage(&mut problem, config, "conflicting rows", &["x"], &[])?);
    problem.set_constraint_bounds(ceiling, f64::NEG_INFINITY, 20.0)?;
    report
        .stages
        .push(solve_stage(&mut problem, config, "ceiling relaxed", &["x"], &[])?);
    Ok(report)
}

fn bound_update(config: &SolverConfig) -> LessonResult {
    let mut diet = diet_problem()?;
    let mut report = LessonReport::new(Lesson::BoundUpdate);
    let names = ["x", "y"];
    report.stages.push(solve_stage(
        &mut diet.problem,
        config,
        "y <= 3",
        &names,
        &[],
    )?);
    diet.problem.set_upper_bound(diet.y, 30.0)?;
    report.stages.push(solve_stage(
        &mut diet.problem,
        config,
        "y <= 30",
        &names,
        &[],
    )?);
    diet.problem.set_upper_bound(diet.x, 10.0)?;
    report.stages.push(solve_stage(
        &mut diet.problem,
        config,
        "y <= 30, x <= 10",
        &names,
        &[],
    )?);
    Ok(report)
}

const DEMAND: [f64; 3] = [3.0, 4.0, 2.0];
const PRICE: [f64; 3] = [1.0, 3.0, 2.0];

/// Three-period purchasing plan with stock carried between periods.
fn index_sets(config: &SolverConfig) -> LessonResult {
    let time = IndexSet::range("time", 0..3)?;
    let mut problem = Problem::with_optimizer(HighsOptimizer::new());
    let buy = problem.add_variables("buy", &time, Domain::bounded(0.0, 5.0))?;
    let stock = problem.add_variables("stock", &time, Domain::non_negative())?;
    let balance = problem.add_constraints("balance", &time, |key| {
        let period = period(key);
        let mut carried = Expr::from_constant(-DEMAND[period]);
        if let Some(bought) = buy.at(period) {
            carried += bought;
        }
        if let Some(previous) = period.checked_sub(1).and_then(|p| stock.at(p)) {
            carried += previous;
        }
        let mut level = Expr::new_empty();
        if let Some(current) = stock.at(period) {
            level += current;
        }
        (level - carried).equals(0.0)
    })?;
    problem.minimize(buy.weighted_sum(|key| PRICE[period(key)]))?;

    let names: Vec<String> = buy
        .keys()
        .iter()
        .map(|key| buy.member_name(key))
        .chain(stock.keys().iter().map(|key| stock.member_name(key)))
        .collect();
    let rows: Vec<String> = balance
        .keys()
        .iter()
        .map(|key| balance.member_name(key))
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

    let mut report = LessonReport::new(Lesson::IndexSets);
    report
        .stages
        .push(solve_stage(&mut problem, config, "plan", &names, &rows)?);
    Ok(report)
}

fn period(key: &IndexKey) -> usize {
    match key {
        IndexKey::Int(t) => usize::try_from(*t).unwrap_or(0),
        IndexKey::Str(_) => 0,
    }
}

/// Choose a hedge ratio `h` in [0, 1] between two positions whose losses
/// differ per scenario, minimizing CVaR at 50%.
fn cvar(config: &SolverConfig) -> LessonResult {
    let mut problem = Problem::with_optimizer(HighsOptimizer::new());
    let hedge = problem.add_variable("hedge", Domain::bounded(0.0, 1.0))?;
    // Unhedged losses 1..4, hedged losses 2.5 flat.
    let scenarios: Vec<Scenario> = [1.0, 2.0, 3.0, 4.0]
        .into_iter()
        .map(|loss| (0.25, Expr::from_constant(loss) + hedge * (2.5 - loss)))
        .collect();
    let mean = risk::expectation(&scenarios)?;
    let tail = risk::cvar(&mut problem, "tail", 0.5, &scenarios)?;
    problem.minimize(tail.expr())?;

    let mut stage = solve_stage(&mut problem, config, "cvar 50%", &["hedge", "tail_var"], &[])?;
    if let Ok(expected) = problem.evaluate(&mean) {
        stage.values.insert("expected_loss".to_string(), expected);
    }
    let mut report = LessonReport::new(Lesson::Cvar);
    report.stages.push(stage);
    Ok(report)
}
