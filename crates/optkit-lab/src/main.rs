mod lessons;
mod logging;

use std::error::Error;

use clap::{Parser, ValueEnum};
use optkit_core::SolverConfig;

use crate::lessons::{Lesson, LessonReport};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Replays the optkit lessons against HiGHS and prints what each solve returned"
)]
struct Cli {
    /// Lessons to run (all of them when omitted)
    #[arg(long = "lesson", value_enum, value_delimiter = ',')]
    lessons: Vec<Lesson>,

    /// Wall-clock limit per solve, in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Let HiGHS print its own log
    #[arg(long)]
    verbose: bool,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::new();
        if let Some(limit) = self.time_limit {
            config = config.with_time_limit(limit);
        }
        if self.verbose {
            config = config.with_log_to_console(true).with_verbosity(1);
        }
        config
    }

    fn selected_lessons(&self) -> Vec<Lesson> {
        if self.lessons.is_empty() {
            Lesson::ALL.to_vec()
        } else {
            self.lessons.clone()
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_from_env()?;

    let config = cli.solver_config();
    config.validate()?;

    let reports = cli
        .selected_lessons()
        .into_iter()
        .map(|lesson| lesson.run(&config))
        .collect::<Result<Vec<_>, _>>()?;

    render_output(cli.format, &reports)
}

fn render_output(format: OutputFormat, reports: &[LessonReport]) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Table => {
            print_table(reports);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
            Ok(())
        }
    }
}

fn print_table(reports: &[LessonReport]) {
    println!(
        "{:<14} {:<20} {:<12} {:>12}  {}",
        "lesson", "stage", "status", "objective", "values"
    );
    for report in reports {
        for stage in &report.stages {
            let values = stage
                .values
                .iter()
                .map(|(name, value)| format!("{name}={value:.4}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "{:<14} {:<20} {:<12} {:>12}  {}",
                report.lesson,
                stage.label,
                stage.status.as_str(),
                format_option_f64(stage.objective),
                values
            );
            for (name, dual) in &stage.duals {
                println!("{:<14} {:<20} {:<12} {:>12}  dual {name}={dual:.4}", "", "", "", "");
            }
        }
    }
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.4}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["optkit-lab"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.selected_lessons(), Lesson::ALL.to_vec());
        assert!(cli.solver_config().is_empty());
    }

    #[test]
    fn test_cli_flags_reach_solver_config() {
        let cli = Cli::try_parse_from([
            "optkit-lab",
            "--lesson",
            "diet,cvar",
            "--time-limit",
            "2.5",
            "--verbose",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.selected_lessons(), vec![Lesson::Diet, Lesson::Cvar]);
        let config = cli.solver_config();
        assert_eq!(config.time_limit, Some(2.5));
        assert!(config.is_verbose());
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_lesson_rejected() {
        assert!(Cli::try_parse_from(["optkit-lab", "--lesson", "portfolio"]).is_err());
    }

    #[test]
    fn test_option_formatting() {
        assert_eq!(format_option_f64(None), "-");
        assert_eq!(format_option_f64(Some(205.0)), "205.0000");
    }
}
