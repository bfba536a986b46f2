pub mod config;
pub mod overview;
pub mod rate;
pub mod stats;
pub mod streak;
pub mod summary;

use chrono::{Local, NaiveDate};
use habitstreak_core::habit::parse_date;
use habitstreak_core::{CompletionHistory, CoreError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// clap value parser for `YYYY-MM-DD` arguments.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

/// The given day, or the local calendar day.
pub fn today_or_now(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Read and deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let content = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}

/// Read a completion-history snapshot (`{"YYYY-MM-DD": record, ...}`).
pub fn load_history(path: &Path) -> Result<CompletionHistory, CoreError> {
    let history: CompletionHistory = load_json(path)?;
    tracing::debug!(path = %path.display(), completions = history.len(), "loaded history");
    Ok(history)
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
