use chrono::NaiveDate;
use clap::Args;
use habitstreak_core::{Config, HabitStatistics, Periodicity, TimeRange};
use std::path::PathBuf;

use super::{load_history, parse_day, print_json, today_or_now};

#[derive(Args)]
pub struct StatsArgs {
    /// Completion history JSON file
    #[arg(long)]
    history: PathBuf,
    /// daily, weekly or monthly (defaults to stats.default_periodicity)
    #[arg(long)]
    periodicity: Option<Periodicity>,
    /// week, month or year (defaults to stats.default_range)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    range: Option<TimeRange>,
    /// Explicit window start, YYYY-MM-DD
    #[arg(long, value_parser = parse_day, requires = "end")]
    start: Option<NaiveDate>,
    /// Explicit window end, YYYY-MM-DD
    #[arg(long, value_parser = parse_day, requires = "start")]
    end: Option<NaiveDate>,
    /// Habit id for the report (defaults to the id on the records)
    #[arg(long)]
    habit_id: Option<String>,
    /// Reference day for --range, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_day)]
    today: Option<NaiveDate>,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let history = load_history(&args.history)?;
    let periodicity = args.periodicity.unwrap_or(config.stats.default_periodicity);
    let habit_id = args
        .habit_id
        .or_else(|| history.records().next().map(|r| r.habit_id().to_string()))
        .unwrap_or_default();

    let (start, end) = match (args.start, args.end) {
        (Some(start), Some(end)) => (start, end),
        _ => args
            .range
            .unwrap_or(config.stats.default_range)
            .window(today_or_now(args.today)),
    };

    let stats = HabitStatistics::build(&config.engine(), habit_id, &history, periodicity, start, end)?;
    print_json(&stats)
}
