use chrono::{NaiveDate, Utc};
use clap::Args;
use habitstreak_core::{Config, Habit, HabitSummary};
use serde::Serialize;
use std::path::PathBuf;

use super::{load_history, load_json, parse_day, print_json, today_or_now};

#[derive(Args)]
pub struct SummaryArgs {
    /// Habit JSON file
    #[arg(long)]
    habit: PathBuf,
    /// Completion history JSON file for that habit
    #[arg(long)]
    history: PathBuf,
    /// Reference day, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_day)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
struct SummaryOutput {
    habit: Habit,
    summary: HabitSummary,
}

pub fn run(args: SummaryArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut habit: Habit = load_json(&args.habit)?;
    habit.validate()?;
    let history = load_history(&args.history)?;
    let today = today_or_now(args.today);

    let result = config.engine().compute_streak(&history, habit.frequency, today);
    let value = history
        .get(today)
        .map(|r| r.value())
        .unwrap_or(habit.current_value);
    habit.apply_streak(&result, value, Utc::now());

    let summary = habit.summary(&history, today);
    print_json(&SummaryOutput { habit, summary })
}
