//! Streak and completion-rate computation.
//!
//! The engine works on an immutable [`CompletionHistory`] snapshot and a
//! [`Periodicity`]. It keeps no state between calls and never reads the
//! clock itself: "today" is always an argument, except in
//! [`StreakEngine::compute_streak_now`] which exists for callers that want
//! the local calendar day.
//!
//! - **Current streak** counts consecutive periods ending at the period that
//!   contains today. There is no grace period: if today's period has no
//!   completion the current streak is 0.
//! - **Longest streak** is the longest run of consecutive periods anywhere in
//!   the history. Several completions inside one period count once.
//! - **Completion rate** is the share of marker days in a window that were
//!   completed (see [`RatePolicy`]).

pub mod period;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{StreakError, ValidationError};
use crate::habit::{CompletionHistory, Periodicity};
use period::{are_adjacent, is_marker_day, period_end, period_start, previous_period};

/// Current and longest streak, both counted in periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// A maximal run of consecutive completed periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRun {
    /// First completion date in the run
    pub start_date: NaiveDate,
    /// Last completion date in the run
    pub end_date: NaiveDate,
    /// Number of periods in the run
    pub length: u32,
}

/// How weekly and monthly periods are judged when computing a rate.
///
/// Daily rates are identical under both policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePolicy {
    /// A period counts as completed only if its marker day (Monday, or the
    /// 1st of the month) was itself completed.
    #[default]
    #[serde(alias = "marker-day")]
    MarkerDay,
    /// A period counts as completed if any day of it inside the window was
    /// completed.
    #[serde(alias = "any-day-in-period")]
    AnyDayInPeriod,
}

impl RatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatePolicy::MarkerDay => "marker_day",
            RatePolicy::AnyDayInPeriod => "any_day_in_period",
        }
    }
}

impl fmt::Display for RatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "marker_day" => Ok(RatePolicy::MarkerDay),
            "any_day_in_period" => Ok(RatePolicy::AnyDayInPeriod),
            other => Err(ValidationError::InvalidValue {
                field: "rate_policy".into(),
                message: format!("expected marker_day or any_day_in_period, got '{other}'"),
            }),
        }
    }
}

/// Whether the history holds a completion on `date`.
pub fn is_completed_on(history: &CompletionHistory, date: NaiveDate) -> bool {
    history.contains(date)
}

/// [`StreakEngine::compute_streak`] with the default engine.
pub fn compute_streak(
    history: &CompletionHistory,
    periodicity: Periodicity,
    today: NaiveDate,
) -> StreakResult {
    StreakEngine::new().compute_streak(history, periodicity, today)
}

/// [`StreakEngine::completion_rate`] with the default engine.
pub fn completion_rate(
    history: &CompletionHistory,
    start: NaiveDate,
    end: NaiveDate,
    periodicity: Periodicity,
) -> Result<f64, StreakError> {
    StreakEngine::new().completion_rate(history, start, end, periodicity)
}

/// Stateless streak calculator.
#[derive(Debug, Clone, Default)]
pub struct StreakEngine {
    rate_policy: RatePolicy,
}

impl StreakEngine {
    /// Engine using [`RatePolicy::MarkerDay`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(rate_policy: RatePolicy) -> Self {
        Self { rate_policy }
    }

    pub fn rate_policy(&self) -> RatePolicy {
        self.rate_policy
    }

    /// Compute the current and longest streak as of `today`.
    pub fn compute_streak(
        &self,
        history: &CompletionHistory,
        periodicity: Periodicity,
        today: NaiveDate,
    ) -> StreakResult {
        if history.is_empty() {
            return StreakResult::default();
        }

        let result = StreakResult {
            current_streak: self.current_streak(history, periodicity, today),
            longest_streak: self.longest_streak(history, periodicity),
        };
        tracing::debug!(
            %periodicity,
            %today,
            completions = history.len(),
            current = result.current_streak,
            longest = result.longest_streak,
            "computed streak"
        );
        result
    }

    /// [`compute_streak`](Self::compute_streak) as of the local calendar day.
    pub fn compute_streak_now(
        &self,
        history: &CompletionHistory,
        periodicity: Periodicity,
    ) -> StreakResult {
        self.compute_streak(history, periodicity, Local::now().date_naive())
    }

    /// Walk back period by period from the one containing `today` while each
    /// period holds at least one completion.
    fn current_streak(
        &self,
        history: &CompletionHistory,
        periodicity: Periodicity,
        today: NaiveDate,
    ) -> u32 {
        let mut start = period_start(periodicity, today);
        let mut streak = 0;

        while history.any_between(start, period_end(periodicity, start)) {
            streak += 1;
            match previous_period(periodicity, start) {
                Some(prev) => start = prev,
                None => break,
            }
        }
        streak
    }

    /// Pairwise walk over the dates, most recent first. Dates in the same
    /// period neither extend nor break a run.
    fn longest_streak(&self, history: &CompletionHistory, periodicity: Periodicity) -> u32 {
        let mut dates = history.dates().rev();
        let Some(first) = dates.next() else {
            return 0;
        };

        let mut prev_period = period_start(periodicity, first);
        let mut run = 1;
        let mut longest = 0;

        for date in dates {
            let period = period_start(periodicity, date);
            if period == prev_period {
                continue;
            }
            if are_adjacent(periodicity, prev_period, period) {
                run += 1;
            } else {
                longest = longest.max(run);
                run = 1;
            }
            prev_period = period;
        }

        longest.max(run)
    }

    /// Every maximal run of consecutive periods, oldest first.
    pub fn streak_history(
        &self,
        history: &CompletionHistory,
        periodicity: Periodicity,
    ) -> Vec<StreakRun> {
        let mut runs: Vec<StreakRun> = Vec::new();
        let mut last_period: Option<NaiveDate> = None;

        for date in history.dates() {
            let period = period_start(periodicity, date);
            match (last_period, runs.last_mut()) {
                (Some(last), Some(run)) if last == period => {
                    run.end_date = date;
                }
                (Some(last), Some(run)) if are_adjacent(periodicity, period, last) => {
                    run.end_date = date;
                    run.length += 1;
                }
                _ => runs.push(StreakRun {
                    start_date: date,
                    end_date: date,
                    length: 1,
                }),
            }
            last_period = Some(period);
        }
        runs
    }

    /// Percentage (0-100) of eligible periods in `[start, end]` that were
    /// completed.
    ///
    /// Eligible periods are marked by every day (daily), every Monday
    /// (weekly) or every 1st of the month (monthly) inside the window.
    /// Returns 0 when the window holds no marker day.
    ///
    /// # Errors
    /// [`StreakError::InvalidRange`] if `start > end`.
    pub fn completion_rate(
        &self,
        history: &CompletionHistory,
        start: NaiveDate,
        end: NaiveDate,
        periodicity: Periodicity,
    ) -> Result<f64, StreakError> {
        if start > end {
            return Err(StreakError::InvalidRange { start, end });
        }

        let mut total_periods = 0u32;
        let mut completed_periods = 0u32;

        for day in start.iter_days().take_while(|day| *day <= end) {
            if !is_marker_day(periodicity, day) {
                continue;
            }
            total_periods += 1;
            if self.period_completed(history, periodicity, day, end) {
                completed_periods += 1;
            }
        }

        if total_periods == 0 {
            return Ok(0.0);
        }
        Ok(completed_periods as f64 / total_periods as f64 * 100.0)
    }

    fn period_completed(
        &self,
        history: &CompletionHistory,
        periodicity: Periodicity,
        marker: NaiveDate,
        window_end: NaiveDate,
    ) -> bool {
        match (self.rate_policy, periodicity) {
            (RatePolicy::MarkerDay, _) | (_, Periodicity::Daily) => history.contains(marker),
            (RatePolicy::AnyDayInPeriod, _) => {
                let last = period_end(periodicity, marker).min(window_end);
                history.any_between(marker, last)
            }
        }
    }
}
