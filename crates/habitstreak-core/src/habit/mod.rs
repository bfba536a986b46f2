//! Habit domain model.
//!
//! A habit is a recurring activity with a target value and a periodicity.
//! Completions live in a [`CompletionHistory`] keyed by calendar day; the
//! habit itself only carries the denormalised `streak`/`best_streak` values
//! the write path stores after every completion.

mod completion;

pub use completion::{parse_date, CompletionHistory, CompletionRecord, DATE_FORMAT};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::streak::{is_completed_on, StreakResult};

/// Maximum length of a habit name, in characters.
pub const MAX_HABIT_NAME_LENGTH: usize = 50;

/// Maximum length of free-text notes on habits and completions.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Cadence that defines one consecutive unit for streak purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    /// One calendar day
    Daily,
    /// One Monday-aligned week
    Weekly,
    /// One calendar month
    Monthly,
}

impl Periodicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
            Periodicity::Monthly => "monthly",
        }
    }

    /// Unit label used when rendering "N-day streak" style text.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Periodicity::Daily => "day",
            Periodicity::Weekly => "week",
            Periodicity::Monthly => "month",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            "monthly" => Ok(Periodicity::Monthly),
            other => Err(ValidationError::InvalidValue {
                field: "periodicity".into(),
                message: format!("expected daily, weekly or monthly, got '{other}'"),
            }),
        }
    }
}

/// Kind of habit being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitType {
    Water,
    Sleep,
    Exercise,
    Mood,
}

impl HabitType {
    pub const ALL: [HabitType; 4] = [
        HabitType::Water,
        HabitType::Sleep,
        HabitType::Exercise,
        HabitType::Mood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitType::Water => "water",
            HabitType::Sleep => "sleep",
            HabitType::Exercise => "exercise",
            HabitType::Mood => "mood",
        }
    }

    /// Unit a new habit of this type starts with.
    pub fn default_unit(&self) -> &'static str {
        match self {
            HabitType::Water => "ml",
            HabitType::Sleep => "hours",
            HabitType::Exercise => "minutes",
            HabitType::Mood => "",
        }
    }

    /// Target a new habit of this type starts with.
    pub fn default_target(&self) -> f64 {
        match self {
            HabitType::Water => 2000.0,
            HabitType::Sleep => 8.0,
            HabitType::Exercise => 30.0,
            HabitType::Mood => 5.0,
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HabitType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "habit_type".into(),
                message: format!("unknown habit type '{s}'"),
            })
    }
}

/// A reminder attached to a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    /// Local time of day, `HH:MM`
    pub time: String,
    /// Weekdays the reminder fires on (0 = Sunday .. 6 = Saturday)
    pub days: Vec<u8>,
    pub enabled: bool,
}

impl Reminder {
    pub fn new(time: &str, days: Vec<u8>) -> Result<Self, ValidationError> {
        let reminder = Self {
            id: uuid::Uuid::new_v4().to_string(),
            time: time.to_string(),
            days,
            enabled: true,
        };
        reminder.validate()?;
        Ok(reminder)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() || self.time.len() != 5 {
            return Err(ValidationError::InvalidValue {
                field: "reminder.time".into(),
                message: format!("expected HH:MM, got '{}'", self.time),
            });
        }
        if let Some(day) = self.days.iter().find(|d| **d > 6) {
            return Err(ValidationError::InvalidValue {
                field: "reminder.days".into(),
                message: format!("weekday {day} is outside 0..=6"),
            });
        }
        Ok(())
    }
}

/// A user-defined habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub unit: String,
    pub frequency: Periodicity,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Current streak as of the last completion write
    #[serde(default)]
    pub streak: u32,
    /// Highest current streak ever written
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Habit {
    /// Create a habit with the type's default target and unit.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        habit_type: HabitType,
        frequency: Periodicity,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        let habit = Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            habit_type,
            icon: None,
            color: None,
            target_value: habit_type.default_target(),
            current_value: 0.0,
            unit: habit_type.default_unit().to_string(),
            frequency,
            reminders: Vec::new(),
            created_at: now,
            updated_at: now,
            streak: 0,
            best_streak: 0,
            active: true,
            notes: None,
        };
        habit.validate()?;
        Ok(habit)
    }

    /// Override the default target and unit.
    pub fn with_target(mut self, target_value: f64, unit: impl Into<String>) -> Result<Self, ValidationError> {
        self.target_value = target_value;
        self.unit = unit.into();
        self.validate()?;
        Ok(self)
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Result<Self, ValidationError> {
        self.notes = Some(notes.into());
        self.validate()?;
        Ok(self)
    }

    pub fn with_reminder(mut self, reminder: Reminder) -> Result<Self, ValidationError> {
        reminder.validate()?;
        self.reminders.push(reminder);
        Ok(self)
    }

    /// Check field constraints. Deserialised habits are not validated
    /// automatically; callers that accept external input should call this.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "name".into() });
        }
        let len = name.chars().count();
        if len > MAX_HABIT_NAME_LENGTH {
            return Err(ValidationError::TooLong {
                field: "name".into(),
                len,
                max: MAX_HABIT_NAME_LENGTH,
            });
        }
        if let Some(notes) = &self.notes {
            check_notes(notes)?;
        }
        if !self.target_value.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "target_value".into(),
                value: self.target_value,
            });
        }
        if self.target_value < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "target_value".into(),
                message: format!("must not be negative, got {}", self.target_value),
            });
        }
        if !self.current_value.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "current_value".into(),
                value: self.current_value,
            });
        }
        for reminder in &self.reminders {
            reminder.validate()?;
        }
        Ok(())
    }

    /// Write back the values computed after a completion event.
    ///
    /// `best_streak` only ever grows: it is the larger of the stored best and
    /// the freshly computed current streak.
    pub fn apply_streak(&mut self, result: &StreakResult, value: f64, now: DateTime<Utc>) {
        self.current_value = value;
        self.streak = result.current_streak;
        self.best_streak = self.best_streak.max(result.current_streak);
        self.updated_at = now;
    }

    /// Progress towards the target, 0-100.
    pub fn progress(&self, is_completed: bool) -> u8 {
        if self.target_value > 0.0 {
            let pct = (self.current_value / self.target_value * 100.0).round();
            pct.clamp(0.0, 100.0) as u8
        } else if is_completed {
            100
        } else {
            0
        }
    }

    /// Dashboard projection of this habit for `today`.
    pub fn summary(&self, history: &CompletionHistory, today: NaiveDate) -> HabitSummary {
        let is_completed = is_completed_on(history, today);
        HabitSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            habit_type: self.habit_type,
            icon: self.icon.clone(),
            color: self.color.clone(),
            progress: self.progress(is_completed),
            is_completed,
            streak: self.streak,
        }
    }
}

/// Per-habit line on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 0-100
    pub progress: u8,
    pub is_completed: bool,
    pub streak: u32,
}

pub(crate) fn check_notes(notes: &str) -> Result<(), ValidationError> {
    let len = notes.chars().count();
    if len > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".into(),
            len,
            max: MAX_NOTE_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Habit {
        Habit::new("user-1", "Drink water", HabitType::Water, Periodicity::Daily).unwrap()
    }

    #[test]
    fn new_habit_uses_type_defaults() {
        let habit = water();
        assert_eq!(habit.target_value, 2000.0);
        assert_eq!(habit.unit, "ml");
        assert_eq!(habit.streak, 0);
        assert_eq!(habit.best_streak, 0);
        assert!(habit.active);

        let sleep = Habit::new("u", "Sleep", HabitType::Sleep, Periodicity::Daily).unwrap();
        assert_eq!(sleep.target_value, 8.0);
        assert_eq!(sleep.unit, "hours");
    }

    #[test]
    fn rejects_empty_and_long_names() {
        let err = Habit::new("u", "   ", HabitType::Mood, Periodicity::Daily).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));

        let long = "x".repeat(MAX_HABIT_NAME_LENGTH + 1);
        let err = Habit::new("u", long, HabitType::Mood, Periodicity::Daily).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 50, .. }));
    }

    #[test]
    fn rejects_bad_target_and_notes() {
        assert!(water().with_target(f64::NAN, "ml").is_err());
        assert!(water().with_target(-1.0, "ml").is_err());
        assert!(water().with_target(1500.0, "ml").is_ok());
        assert!(water().with_notes("n".repeat(MAX_NOTE_LENGTH + 1)).is_err());
    }

    #[test]
    fn reminder_validation() {
        assert!(Reminder::new("07:30", vec![1, 3, 5]).is_ok());
        assert!(Reminder::new("7:30", vec![1]).is_err());
        assert!(Reminder::new("25:00", vec![1]).is_err());
        assert!(Reminder::new("07:30", vec![7]).is_err());
    }

    #[test]
    fn apply_streak_keeps_best_monotonic() {
        let mut habit = water();
        let now = Utc::now();

        habit.apply_streak(&StreakResult { current_streak: 4, longest_streak: 4 }, 500.0, now);
        assert_eq!((habit.streak, habit.best_streak), (4, 4));
        assert_eq!(habit.current_value, 500.0);

        habit.apply_streak(&StreakResult { current_streak: 1, longest_streak: 4 }, 250.0, now);
        assert_eq!((habit.streak, habit.best_streak), (1, 4));
    }

    #[test]
    fn progress_is_clamped_and_falls_back_to_completion() {
        let mut habit = water();
        habit.current_value = 1000.0;
        assert_eq!(habit.progress(false), 50);
        habit.current_value = 5000.0;
        assert_eq!(habit.progress(false), 100);

        habit.target_value = 0.0;
        assert_eq!(habit.progress(true), 100);
        assert_eq!(habit.progress(false), 0);
    }

    #[test]
    fn periodicity_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Periodicity>().unwrap(), Periodicity::Weekly);
        assert!("yearly".parse::<Periodicity>().is_err());
        assert_eq!("MOOD".parse::<HabitType>().unwrap(), HabitType::Mood);
    }

    #[test]
    fn habit_json_uses_store_field_names() {
        let habit = water();
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["type"], "water");
        assert_eq!(json["frequency"], "daily");
        assert!(json.get("bestStreak").is_some());
        assert!(json.get("targetValue").is_some());
    }

    #[test]
    fn summary_reflects_todays_completion() {
        let mut habit = water();
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let history: CompletionHistory = [CompletionRecord::create(habit.id.clone(), today, 500.0, None).unwrap()]
            .into_iter()
            .collect();

        habit.current_value = 500.0;
        let summary = habit.summary(&history, today);
        assert!(summary.is_completed);
        assert_eq!(summary.progress, 25);

        let summary = habit.summary(&history, yesterday);
        assert!(!summary.is_completed);
    }
}
