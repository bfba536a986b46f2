//! Cross-habit overviews for the dashboard and statistics views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::habit_statistics::{month_key, TimeRange};
use crate::error::{StreakError, ValidationError};
use crate::habit::{CompletionHistory, Habit, HabitSummary, HabitType};
use crate::streak::StreakEngine;

/// A habit together with its completion history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedHabit {
    pub habit: Habit,
    pub completions: CompletionHistory,
}

impl TrackedHabit {
    /// Pair habits with their histories, both keyed by habit id.
    /// Habits without an entry get an empty history; histories without a
    /// habit are dropped.
    pub fn join(
        habits: BTreeMap<String, Habit>,
        mut completions: BTreeMap<String, CompletionHistory>,
    ) -> Vec<TrackedHabit> {
        let tracked: Vec<_> = habits
            .into_iter()
            .map(|(id, habit)| TrackedHabit {
                habit,
                completions: completions.remove(&id).unwrap_or_default(),
            })
            .collect();
        if !completions.is_empty() {
            tracing::warn!(
                orphaned = completions.len(),
                "completion histories without a matching habit were ignored"
            );
        }
        tracked
    }
}

/// Number of habits completed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub completed: u32,
}

/// Completions summed over one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub completed: u32,
}

/// Share of habits of one type that have any completion at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCompletion {
    pub habit_type: HabitType,
    pub total: u32,
    pub completed: u32,
    /// 0-100
    pub percentage: f64,
}

/// Today's dashboard: habit summaries split by completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub completed: Vec<HabitSummary>,
    pub incomplete: Vec<HabitSummary>,
    /// Rounded share of habits completed today, 0-100
    pub progress_percentage: u8,
}

/// Field a habit list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    CreatedAt,
    Streak,
    /// Completion rate over the window passed to [`Overview::filtered_sorted`]
    CompletionRate,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::CreatedAt => "created_at",
            SortKey::Streak => "streak",
            SortKey::CompletionRate => "completion_rate",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "name" => Ok(SortKey::Name),
            "createdat" => Ok(SortKey::CreatedAt),
            "streak" => Ok(SortKey::Streak),
            "completionrate" => Ok(SortKey::CompletionRate),
            _ => Err(ValidationError::InvalidValue {
                field: "sort_by".into(),
                message: format!(
                    "expected name, created_at, streak or completion_rate, got '{}'",
                    s.trim()
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Which habits a list shows and in what order.
///
/// An empty `types` list and a `None` for `active` mean "no restriction".
/// Without `sort_by` the input order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitFilters {
    #[serde(default, rename = "type")]
    pub types: Vec<HabitType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl HabitFilters {
    pub fn matches(&self, habit: &Habit) -> bool {
        (self.types.is_empty() || self.types.contains(&habit.habit_type))
            && self.active.is_none_or(|active| habit.active == active)
    }
}

/// Read-only view over a set of tracked habits.
#[derive(Debug, Clone, Copy)]
pub struct Overview<'a> {
    habits: &'a [TrackedHabit],
}

impl<'a> Overview<'a> {
    pub fn new(habits: &'a [TrackedHabit]) -> Self {
        Self { habits }
    }

    fn filtered(&self, filter: Option<HabitType>) -> impl Iterator<Item = &'a TrackedHabit> + 'a {
        self.habits
            .iter()
            .filter(move |t| filter.is_none_or(|ty| t.habit.habit_type == ty))
    }

    /// For each day of `range` ending at `today`, how many habits were
    /// completed.
    pub fn completions_per_day(
        &self,
        range: TimeRange,
        today: NaiveDate,
        filter: Option<HabitType>,
    ) -> Vec<DailyCount> {
        let (start, end) = range.window(today);
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|date| DailyCount {
                date,
                completed: self
                    .filtered(filter)
                    .filter(|t| t.completions.contains(date))
                    .count() as u32,
            })
            .collect()
    }

    /// Daily counts summed per calendar month, oldest first.
    pub fn completions_per_month(
        &self,
        range: TimeRange,
        today: NaiveDate,
        filter: Option<HabitType>,
    ) -> Vec<MonthlyCount> {
        let mut months: BTreeMap<String, u32> = BTreeMap::new();
        for day in self.completions_per_day(range, today, filter) {
            *months.entry(month_key(day.date)).or_default() += day.completed;
        }
        months
            .into_iter()
            .map(|(month, completed)| MonthlyCount { month, completed })
            .collect()
    }

    /// Per habit type, the percentage of habits with at least one
    /// completion. Types with no habits are omitted.
    pub fn completion_by_type(&self, filter: Option<HabitType>) -> Vec<TypeCompletion> {
        HabitType::ALL
            .into_iter()
            .filter(|ty| filter.is_none_or(|f| f == *ty))
            .filter_map(|ty| {
                let of_type: Vec<_> = self.filtered(Some(ty)).collect();
                if of_type.is_empty() {
                    return None;
                }
                let total = of_type.len() as u32;
                let completed = of_type.iter().filter(|t| !t.completions.is_empty()).count() as u32;
                Some(TypeCompletion {
                    habit_type: ty,
                    total,
                    completed,
                    percentage: completed as f64 / total as f64 * 100.0,
                })
            })
            .collect()
    }

    /// Habits passing `filters`, ordered by its sort key.
    ///
    /// `window` is the inclusive date range used for
    /// [`SortKey::CompletionRate`]; each habit's rate is taken under its own
    /// periodicity. Ties keep their input order in both directions.
    ///
    /// # Errors
    /// [`StreakError::InvalidRange`] if the window is inverted and the list
    /// is sorted by completion rate.
    pub fn filtered_sorted(
        &self,
        filters: &HabitFilters,
        window: (NaiveDate, NaiveDate),
        engine: &StreakEngine,
    ) -> Result<Vec<&'a TrackedHabit>, StreakError> {
        let selected = self.habits.iter().filter(|t| filters.matches(&t.habit));

        let Some(sort_by) = filters.sort_by else {
            return Ok(selected.collect());
        };

        let (start, end) = window;
        let mut keyed = selected
            .map(|t| {
                let rate = match sort_by {
                    SortKey::CompletionRate => {
                        engine.completion_rate(&t.completions, start, end, t.habit.frequency)?
                    }
                    _ => 0.0,
                };
                Ok((t, rate))
            })
            .collect::<Result<Vec<_>, StreakError>>()?;

        keyed.sort_by(|(a, rate_a), (b, rate_b)| {
            let ordering = match sort_by {
                SortKey::Name => a.habit.name.cmp(&b.habit.name),
                SortKey::CreatedAt => a.habit.created_at.cmp(&b.habit.created_at),
                SortKey::Streak => a.habit.streak.cmp(&b.habit.streak),
                SortKey::CompletionRate => rate_a.total_cmp(rate_b),
            };
            match filters.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        Ok(keyed.into_iter().map(|(t, _)| t).collect())
    }

    /// Summaries for `today`, split into completed and outstanding habits.
    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        let (completed, incomplete): (Vec<_>, Vec<_>) = self
            .habits
            .iter()
            .map(|t| t.habit.summary(&t.completions, today))
            .partition(|s| s.is_completed);

        let total = completed.len() + incomplete.len();
        let progress_percentage = if total > 0 {
            (completed.len() as f64 / total as f64 * 100.0).round() as u8
        } else {
            0
        };

        Dashboard {
            completed,
            incomplete,
            progress_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::{CompletionRecord, Periodicity};
    use chrono::{Duration, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tracked(name: &str, ty: HabitType, dates: &[NaiveDate]) -> TrackedHabit {
        let habit = Habit::new("u1", name, ty, Periodicity::Daily).unwrap();
        let completions = dates
            .iter()
            .map(|date| CompletionRecord::new(format!("c-{date}"), habit.id.clone(), *date, Utc::now(), 1.0, None).unwrap())
            .collect();
        TrackedHabit { habit, completions }
    }

    fn fixture() -> Vec<TrackedHabit> {
        let today = d(2024, 3, 13);
        vec![
            tracked("Water", HabitType::Water, &[today, today - Duration::days(1)]),
            tracked("More water", HabitType::Water, &[]),
            tracked("Run", HabitType::Exercise, &[today - Duration::days(1)]),
        ]
    }

    #[test]
    fn per_day_counts_cover_the_whole_range() {
        let habits = fixture();
        let counts = Overview::new(&habits).completions_per_day(TimeRange::Week, d(2024, 3, 13), None);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[6], DailyCount { date: d(2024, 3, 13), completed: 1 });
        assert_eq!(counts[5].completed, 2);
        assert_eq!(counts[0].completed, 0);
    }

    #[test]
    fn per_day_counts_respect_type_filter() {
        let habits = fixture();
        let counts = Overview::new(&habits).completions_per_day(
            TimeRange::Week,
            d(2024, 3, 13),
            Some(HabitType::Exercise),
        );
        assert_eq!(counts[5].completed, 1);
        assert_eq!(counts[6].completed, 0);
    }

    #[test]
    fn per_month_counts_sum_days() {
        let habits = fixture();
        let months = Overview::new(&habits).completions_per_month(TimeRange::Month, d(2024, 3, 13), None);
        assert_eq!(
            months,
            vec![
                MonthlyCount { month: "2024-02".into(), completed: 0 },
                MonthlyCount { month: "2024-03".into(), completed: 3 },
            ]
        );
    }

    #[test]
    fn completion_by_type_skips_empty_types() {
        let habits = fixture();
        let by_type = Overview::new(&habits).completion_by_type(None);
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].habit_type, HabitType::Water);
        assert_eq!(by_type[0].percentage, 50.0);
        assert_eq!(by_type[1].habit_type, HabitType::Exercise);
        assert_eq!(by_type[1].percentage, 100.0);

        let only_sleep = Overview::new(&habits).completion_by_type(Some(HabitType::Sleep));
        assert!(only_sleep.is_empty());
    }

    #[test]
    fn dashboard_splits_and_rounds() {
        let habits = fixture();
        let dashboard = Overview::new(&habits).dashboard(d(2024, 3, 13));
        assert_eq!(dashboard.completed.len(), 1);
        assert_eq!(dashboard.incomplete.len(), 2);
        assert_eq!(dashboard.progress_percentage, 33);

        let empty: Vec<TrackedHabit> = Vec::new();
        assert_eq!(Overview::new(&empty).dashboard(d(2024, 3, 13)).progress_percentage, 0);
    }

    fn names(list: &[&TrackedHabit]) -> Vec<String> {
        list.iter().map(|t| t.habit.name.clone()).collect()
    }

    fn sorted(habits: &[TrackedHabit], sort_by: SortKey, direction: SortDirection) -> Vec<String> {
        let filters = HabitFilters {
            sort_by: Some(sort_by),
            sort_direction: direction,
            ..HabitFilters::default()
        };
        let window = TimeRange::Week.window(d(2024, 3, 13));
        let list = Overview::new(habits)
            .filtered_sorted(&filters, window, &StreakEngine::new())
            .unwrap();
        names(&list)
    }

    #[test]
    fn filters_by_active_flag() {
        let mut habits = fixture();
        habits[1].habit.active = false;
        let overview = Overview::new(&habits);
        let window = TimeRange::Week.window(d(2024, 3, 13));
        let engine = StreakEngine::new();

        let active = HabitFilters { active: Some(true), ..HabitFilters::default() };
        let list = overview.filtered_sorted(&active, window, &engine).unwrap();
        assert_eq!(names(&list), ["Water", "Run"]);

        let archived = HabitFilters { active: Some(false), ..HabitFilters::default() };
        let list = overview.filtered_sorted(&archived, window, &engine).unwrap();
        assert_eq!(names(&list), ["More water"]);

        let list = overview.filtered_sorted(&HabitFilters::default(), window, &engine).unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn filters_by_type_list() {
        let habits = fixture();
        let overview = Overview::new(&habits);
        let window = TimeRange::Week.window(d(2024, 3, 13));
        let engine = StreakEngine::new();

        let exercise = HabitFilters { types: vec![HabitType::Exercise], ..HabitFilters::default() };
        let list = overview.filtered_sorted(&exercise, window, &engine).unwrap();
        assert_eq!(names(&list), ["Run"]);

        let both = HabitFilters {
            types: vec![HabitType::Water, HabitType::Exercise],
            ..HabitFilters::default()
        };
        assert_eq!(overview.filtered_sorted(&both, window, &engine).unwrap().len(), 3);

        let sleep = HabitFilters { types: vec![HabitType::Sleep], ..HabitFilters::default() };
        assert!(overview.filtered_sorted(&sleep, window, &engine).unwrap().is_empty());
    }

    #[test]
    fn sorts_by_name_both_directions() {
        let habits = fixture();
        assert_eq!(sorted(&habits, SortKey::Name, SortDirection::Asc), ["More water", "Run", "Water"]);
        assert_eq!(sorted(&habits, SortKey::Name, SortDirection::Desc), ["Water", "Run", "More water"]);
    }

    #[test]
    fn sorts_by_created_at() {
        let mut habits = fixture();
        let base = Utc::now();
        habits[0].habit.created_at = base + Duration::days(2);
        habits[1].habit.created_at = base;
        habits[2].habit.created_at = base + Duration::days(1);
        assert_eq!(sorted(&habits, SortKey::CreatedAt, SortDirection::Asc), ["More water", "Run", "Water"]);
    }

    #[test]
    fn sorts_by_streak() {
        let mut habits = fixture();
        habits[0].habit.streak = 5;
        habits[1].habit.streak = 1;
        habits[2].habit.streak = 3;
        assert_eq!(sorted(&habits, SortKey::Streak, SortDirection::Desc), ["Water", "Run", "More water"]);
    }

    #[test]
    fn sorts_by_completion_rate_over_window() {
        // Water 2/7, Run 1/7, More water 0/7
        let habits = fixture();
        assert_eq!(
            sorted(&habits, SortKey::CompletionRate, SortDirection::Desc),
            ["Water", "Run", "More water"]
        );
        assert_eq!(
            sorted(&habits, SortKey::CompletionRate, SortDirection::Asc),
            ["More water", "Run", "Water"]
        );
    }

    #[test]
    fn completion_rate_sort_rejects_inverted_window() {
        let habits = fixture();
        let filters = HabitFilters { sort_by: Some(SortKey::CompletionRate), ..HabitFilters::default() };
        let err = Overview::new(&habits)
            .filtered_sorted(&filters, (d(2024, 3, 13), d(2024, 3, 1)), &StreakEngine::new())
            .unwrap_err();
        assert!(matches!(err, StreakError::InvalidRange { .. }));
    }

    #[test]
    fn sort_key_parses_common_spellings() {
        assert_eq!("completionRate".parse::<SortKey>().unwrap(), SortKey::CompletionRate);
        assert_eq!("created-at".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert_eq!("created_at".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert!("priority".parse::<SortKey>().is_err());
    }

    #[test]
    fn join_pairs_by_habit_id() {
        let habit = Habit::new("u1", "Water", HabitType::Water, Periodicity::Daily).unwrap();
        let id = habit.id.clone();
        let habits = BTreeMap::from([(id.clone(), habit)]);
        let completions = BTreeMap::from([
            (id, CompletionHistory::new()),
            ("orphan".to_string(), CompletionHistory::new()),
        ]);
        let tracked = TrackedHabit::join(habits, completions);
        assert_eq!(tracked.len(), 1);
    }
}
