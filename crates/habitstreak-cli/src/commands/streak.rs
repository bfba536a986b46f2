use chrono::{Local, NaiveDate};
use clap::Args;
use habitstreak_core::{Config, Periodicity};
use serde::Serialize;
use std::path::PathBuf;

use super::{load_history, parse_day, print_json};

#[derive(Args)]
pub struct StreakArgs {
    /// Completion history JSON file
    #[arg(long)]
    history: PathBuf,
    /// daily, weekly or monthly (defaults to stats.default_periodicity)
    #[arg(long)]
    periodicity: Option<Periodicity>,
    /// Reference day, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_day)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreakOutput {
    periodicity: Periodicity,
    today: NaiveDate,
    current_streak: u32,
    longest_streak: u32,
}

pub fn run(args: StreakArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let history = load_history(&args.history)?;
    let periodicity = args.periodicity.unwrap_or(config.stats.default_periodicity);
    let engine = config.engine();
    let (today, result) = match args.today {
        Some(today) => (today, engine.compute_streak(&history, periodicity, today)),
        None => (
            Local::now().date_naive(),
            engine.compute_streak_now(&history, periodicity),
        ),
    };
    print_json(&StreakOutput {
        periodicity,
        today,
        current_streak: result.current_streak,
        longest_streak: result.longest_streak,
    })
}
