use chrono::NaiveDate;
use clap::Args;
use habitstreak_core::{Config, Periodicity, RatePolicy, StreakEngine};
use serde::Serialize;
use std::path::PathBuf;

use super::{load_history, parse_day, print_json};

#[derive(Args)]
pub struct RateArgs {
    /// Completion history JSON file
    #[arg(long)]
    history: PathBuf,
    /// daily, weekly or monthly (defaults to stats.default_periodicity)
    #[arg(long)]
    periodicity: Option<Periodicity>,
    /// First day of the window, YYYY-MM-DD
    #[arg(long, value_parser = parse_day)]
    start: NaiveDate,
    /// Last day of the window, YYYY-MM-DD
    #[arg(long, value_parser = parse_day)]
    end: NaiveDate,
    /// marker_day or any_day_in_period (defaults to stats.rate_policy)
    #[arg(long)]
    policy: Option<RatePolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateOutput {
    periodicity: Periodicity,
    policy: RatePolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    completion_rate: f64,
}

pub fn run(args: RateArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let history = load_history(&args.history)?;
    let periodicity = args.periodicity.unwrap_or(config.stats.default_periodicity);
    let policy = args.policy.unwrap_or(config.stats.rate_policy);

    let rate = StreakEngine::with_policy(policy).completion_rate(&history, args.start, args.end, periodicity)?;
    print_json(&RateOutput {
        periodicity,
        policy,
        start_date: args.start,
        end_date: args.end,
        completion_rate: rate,
    })
}
