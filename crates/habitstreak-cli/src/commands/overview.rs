use chrono::NaiveDate;
use clap::Args;
use habitstreak_core::stats::{
    Dashboard, DailyCount, HabitFilters, MonthlyCount, SortDirection, SortKey, TypeCompletion,
};
use habitstreak_core::{
    CompletionHistory, Config, Habit, HabitSummary, HabitType, Overview, TimeRange, TrackedHabit,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{load_json, parse_day, print_json, today_or_now};

#[derive(Args)]
pub struct OverviewArgs {
    /// Habits JSON file, keyed by habit id
    #[arg(long)]
    habits: PathBuf,
    /// Completions JSON file, keyed by habit id then date
    #[arg(long)]
    completions: PathBuf,
    /// week, month or year (defaults to stats.default_range)
    #[arg(long)]
    range: Option<TimeRange>,
    /// Only include habits of these types (repeatable)
    #[arg(long = "type")]
    types: Vec<HabitType>,
    /// Only include active (true) or archived (false) habits
    #[arg(long)]
    active: Option<bool>,
    /// name, created_at, streak or completion_rate
    #[arg(long)]
    sort_by: Option<SortKey>,
    /// Sort descending
    #[arg(long, requires = "sort_by")]
    desc: bool,
    /// Reference day, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_day)]
    today: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverviewOutput {
    range: TimeRange,
    habits: Vec<HabitSummary>,
    per_day: Vec<DailyCount>,
    per_month: Vec<MonthlyCount>,
    by_type: Vec<TypeCompletion>,
    dashboard: Dashboard,
}

pub fn run(args: OverviewArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let habits: BTreeMap<String, Habit> = load_json(&args.habits)?;
    for habit in habits.values() {
        habit.validate()?;
    }
    let completions: BTreeMap<String, CompletionHistory> = load_json(&args.completions)?;
    let tracked = TrackedHabit::join(habits, completions);

    let range = args.range.unwrap_or(config.stats.default_range);
    let today = today_or_now(args.today);
    let filters = HabitFilters {
        types: args.types,
        active: args.active,
        sort_by: args.sort_by,
        sort_direction: if args.desc { SortDirection::Desc } else { SortDirection::Asc },
    };

    let selected: Vec<TrackedHabit> = Overview::new(&tracked)
        .filtered_sorted(&filters, range.window(today), &config.engine())?
        .into_iter()
        .cloned()
        .collect();
    tracing::debug!(total = tracked.len(), selected = selected.len(), "filtered habits");

    let overview = Overview::new(&selected);
    print_json(&OverviewOutput {
        range,
        habits: selected
            .iter()
            .map(|t| t.habit.summary(&t.completions, today))
            .collect(),
        per_day: overview.completions_per_day(range, today, None),
        per_month: overview.completions_per_month(range, today, None),
        by_type: overview.completion_by_type(None),
        dashboard: overview.dashboard(today),
    })
}
