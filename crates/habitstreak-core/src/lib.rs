//! # habitstreak Core Library
//!
//! This library provides the computational core of a personal habit tracker:
//! streaks, completion rates and statistics over a habit's completion
//! history. Everything here is a pure function of an immutable snapshot;
//! persistence and presentation belong to the caller. The `habitstreak`
//! CLI is a thin shell over the same library.
//!
//! ## Architecture
//!
//! - **Habit model**: Typed, validated habits and completion records, with
//!   a date-keyed [`CompletionHistory`]
//! - **Streak engine**: Current/longest streak and completion rate under
//!   daily, weekly (Monday-aligned) and monthly periodicity
//! - **Statistics**: Per-habit reports and cross-habit overviews
//! - **Config**: TOML-based user preferences
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Streak and completion-rate computation
//! - [`CompletionHistory`]: One habit's completions, keyed by day
//! - [`HabitStatistics`]: Windowed statistics report
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod habit;
pub mod stats;
pub mod streak;

pub use config::Config;
pub use error::{ConfigError, CoreError, StreakError, ValidationError};
pub use habit::{
    CompletionHistory, CompletionRecord, Habit, HabitSummary, HabitType, Periodicity, Reminder,
};
pub use stats::{HabitStatistics, Overview, TimeRange, TrackedHabit};
pub use streak::{
    compute_streak, completion_rate, is_completed_on, RatePolicy, StreakEngine, StreakResult,
    StreakRun,
};
