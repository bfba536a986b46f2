//! Statistics module for habitstreak
//!
//! This module provides per-habit statistics reports (completion rate,
//! per-day/week/month buckets, streak runs) and cross-habit overviews for
//! the dashboard and statistics views.

mod habit_statistics;
mod overview;

pub use habit_statistics::{month_key, week_key, HabitStatistics, TimeRange};

pub use overview::{
    Dashboard, DailyCount, HabitFilters, MonthlyCount, Overview, SortDirection, SortKey,
    TrackedHabit, TypeCompletion,
};
