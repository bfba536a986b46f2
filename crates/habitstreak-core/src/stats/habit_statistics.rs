//! Per-habit statistics report.
//!
//! Buckets completion values by day, ISO week and calendar month inside a
//! window, and attaches the completion rate and streak runs for the same
//! window.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{StreakError, ValidationError};
use crate::habit::{CompletionHistory, Periodicity, DATE_FORMAT};
use crate::streak::{StreakEngine, StreakRun};

/// Trailing window ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Last 7 days
    #[default]
    Week,
    /// Last 30 days
    Month,
    /// Last 365 days
    Year,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 365,
        }
    }

    /// Inclusive `(start, end)` window ending at `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (today - Duration::days(self.days() - 1), today)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(ValidationError::InvalidValue {
                field: "range".into(),
                message: format!("expected week, month or year, got '{other}'"),
            }),
        }
    }
}

/// ISO week key, `YYYY-WW`, using the ISO week-numbering year.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{:04}-{:02}", week.year(), week.week())
}

/// Calendar month key, `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Statistics for one habit over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatistics {
    pub habit_id: String,
    pub periodicity: Periodicity,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 0-100
    pub completion_rate: f64,
    /// `YYYY-MM-DD` -> completion value
    pub daily_completion: BTreeMap<String, f64>,
    /// `YYYY-WW` -> average completion value
    pub weekly_completion: BTreeMap<String, f64>,
    /// `YYYY-MM` -> average completion value
    pub monthly_completion: BTreeMap<String, f64>,
    pub streak_history: Vec<StreakRun>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn record(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

fn finish(buckets: BTreeMap<String, Mean>) -> BTreeMap<String, f64> {
    buckets
        .into_iter()
        .map(|(key, mean)| (key, mean.value()))
        .collect()
}

impl HabitStatistics {
    /// Build the report for records in `[start, end]`.
    ///
    /// # Errors
    /// [`StreakError::InvalidRange`] if `start > end`.
    pub fn build(
        engine: &StreakEngine,
        habit_id: impl Into<String>,
        history: &CompletionHistory,
        periodicity: Periodicity,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, StreakError> {
        let completion_rate = engine.completion_rate(history, start, end, periodicity)?;
        let window = history.between(start, end);

        let mut daily_completion = BTreeMap::new();
        let mut weekly: BTreeMap<String, Mean> = BTreeMap::new();
        let mut monthly: BTreeMap<String, Mean> = BTreeMap::new();

        for record in window.records() {
            let date = record.date();
            daily_completion.insert(date.format(DATE_FORMAT).to_string(), record.value());
            weekly.entry(week_key(date)).or_default().record(record.value());
            monthly.entry(month_key(date)).or_default().record(record.value());
        }

        Ok(Self {
            habit_id: habit_id.into(),
            periodicity,
            start_date: start,
            end_date: end,
            completion_rate,
            daily_completion,
            weekly_completion: finish(weekly),
            monthly_completion: finish(monthly),
            streak_history: engine.streak_history(&window, periodicity),
        })
    }

    /// Build the report for a trailing [`TimeRange`] ending at `today`.
    pub fn for_range(
        engine: &StreakEngine,
        habit_id: impl Into<String>,
        history: &CompletionHistory,
        periodicity: Periodicity,
        range: TimeRange,
        today: NaiveDate,
    ) -> Result<Self, StreakError> {
        let (start, end) = range.window(today);
        Self::build(engine, habit_id, history, periodicity, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::CompletionRecord;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn history(entries: &[(NaiveDate, f64)]) -> CompletionHistory {
        entries
            .iter()
            .map(|(date, value)| {
                CompletionRecord::new(format!("c-{date}"), "h1", *date, Utc::now(), *value, None).unwrap()
            })
            .collect()
    }

    #[test]
    fn week_key_uses_iso_year() {
        // 2024-12-30 is in ISO week 1 of 2025
        assert_eq!(week_key(d(2024, 12, 30)), "2025-01");
        assert_eq!(week_key(d(2024, 3, 13)), "2024-11");
        assert_eq!(month_key(d(2024, 3, 13)), "2024-03");
    }

    #[test]
    fn time_range_windows_are_inclusive() {
        let today = d(2024, 3, 13);
        assert_eq!(TimeRange::Week.window(today), (d(2024, 3, 7), today));
        assert_eq!(TimeRange::Month.window(today).0, d(2024, 2, 13));
        assert_eq!("YEAR".parse::<TimeRange>().unwrap(), TimeRange::Year);
    }

    #[test]
    fn buckets_average_values_inside_window() {
        let history = history(&[
            (d(2024, 2, 28), 100.0),
            (d(2024, 3, 4), 1000.0),
            (d(2024, 3, 5), 2000.0),
            (d(2024, 3, 11), 1500.0),
        ]);
        let stats = HabitStatistics::build(
            &StreakEngine::new(),
            "h1",
            &history,
            Periodicity::Daily,
            d(2024, 3, 1),
            d(2024, 3, 11),
        )
        .unwrap();

        assert_eq!(stats.daily_completion.len(), 3);
        assert!(!stats.daily_completion.contains_key("2024-02-28"));
        assert_eq!(stats.weekly_completion["2024-10"], 1500.0);
        assert_eq!(stats.weekly_completion["2024-11"], 1500.0);
        assert_eq!(stats.monthly_completion["2024-03"], 1500.0);
        assert_eq!(stats.streak_history.len(), 2);
        assert!((stats.completion_rate - 300.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_window_is_an_error() {
        let result = HabitStatistics::build(
            &StreakEngine::new(),
            "h1",
            &CompletionHistory::new(),
            Periodicity::Daily,
            d(2024, 3, 11),
            d(2024, 3, 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn serializes_with_store_field_names() {
        let stats = HabitStatistics::for_range(
            &StreakEngine::new(),
            "h1",
            &history(&[(d(2024, 3, 13), 1.0)]),
            Periodicity::Daily,
            TimeRange::Week,
            d(2024, 3, 13),
        )
        .unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("completionRate").is_some());
        assert_eq!(json["dailyCompletion"]["2024-03-13"], 1.0);
        assert_eq!(json["streakHistory"][0]["length"], 1);
    }
}
