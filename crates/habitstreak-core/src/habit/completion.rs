//! Completion records and the per-habit completion history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{StreakError, ValidationError};

/// Storage date format for history keys and record dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One observed instance of a habit being satisfied on a calendar day.
///
/// Immutable once built; both [`CompletionRecord::new`] and deserialisation
/// go through the same validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CompletionRecordRepr")]
pub struct CompletionRecord {
    id: String,
    habit_id: String,
    date: NaiveDate,
    completed_at: DateTime<Utc>,
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRecordRepr {
    id: String,
    habit_id: String,
    date: NaiveDate,
    completed_at: DateTime<Utc>,
    value: f64,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<CompletionRecordRepr> for CompletionRecord {
    type Error = ValidationError;

    fn try_from(repr: CompletionRecordRepr) -> Result<Self, Self::Error> {
        CompletionRecord::new(
            repr.id,
            repr.habit_id,
            repr.date,
            repr.completed_at,
            repr.value,
            repr.notes,
        )
    }
}

impl CompletionRecord {
    pub fn new(
        id: impl Into<String>,
        habit_id: impl Into<String>,
        date: NaiveDate,
        completed_at: DateTime<Utc>,
        value: f64,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let habit_id = habit_id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "id".into() });
        }
        if habit_id.is_empty() {
            return Err(ValidationError::Empty {
                field: "habit_id".into(),
            });
        }
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "value".into(),
                value,
            });
        }
        if let Some(notes) = &notes {
            super::check_notes(notes)?;
        }
        Ok(Self {
            id,
            habit_id,
            date,
            completed_at,
            value,
            notes,
        })
    }

    /// Record a completion made right now, with a fresh id.
    pub fn create(
        habit_id: impl Into<String>,
        date: NaiveDate,
        value: f64,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            habit_id,
            date,
            Utc::now(),
            value,
            notes,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn habit_id(&self) -> &str {
        &self.habit_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Completions of one habit, at most one per calendar day.
///
/// Backed by an ordered map so iteration is always chronological,
/// regardless of the order records were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionHistory {
    #[serde(deserialize_with = "deserialize_keyed")]
    records: BTreeMap<NaiveDate, CompletionRecord>,
}

fn deserialize_keyed<'de, D>(deserializer: D) -> Result<BTreeMap<NaiveDate, CompletionRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<String, CompletionRecord> = BTreeMap::deserialize(deserializer)?;
    CompletionHistory::from_keyed(raw)
        .map(|history| history.records)
        .map_err(serde::de::Error::custom)
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(key: &str) -> Result<NaiveDate, StreakError> {
    let malformed = || StreakError::MalformedDate {
        key: key.to_string(),
    };
    // chrono accepts unpadded fields; storage keys are always zero-padded
    if key.len() != 10 {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(key, DATE_FORMAT).map_err(|_| malformed())
}

impl CompletionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, keyed by each record's own date.
    /// A later record for the same day replaces an earlier one.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CompletionRecord>,
    {
        let mut history = Self::new();
        for record in records {
            history.insert(record);
        }
        history
    }

    /// Build from a store snapshot keyed by date string.
    ///
    /// # Errors
    /// [`StreakError::MalformedDate`] for a key that is not a calendar date,
    /// [`StreakError::KeyMismatch`] when a key differs from its record's date.
    pub fn from_keyed<I, K>(entries: I) -> Result<Self, StreakError>
    where
        I: IntoIterator<Item = (K, CompletionRecord)>,
        K: AsRef<str>,
    {
        let mut records = BTreeMap::new();
        for (key, record) in entries {
            let date = parse_date(key.as_ref())?;
            if date != record.date {
                return Err(StreakError::KeyMismatch {
                    key: date,
                    record_date: record.date,
                });
            }
            records.insert(date, record);
        }
        Ok(Self { records })
    }

    /// Insert a record under its own date, returning any record it replaced.
    pub fn insert(&mut self, record: CompletionRecord) -> Option<CompletionRecord> {
        let previous = self.records.insert(record.date, record);
        if let Some(prev) = &previous {
            tracing::debug!(date = %prev.date, "replaced existing completion");
        }
        previous
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<CompletionRecord> {
        self.records.remove(&date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the habit was completed on `date`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.records.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CompletionRecord> {
        self.records.get(&date)
    }

    /// Completion dates, oldest first.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
        self.records.keys().copied()
    }

    /// Records, oldest first.
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &CompletionRecord> + '_ {
        self.records.values()
    }

    /// Whether any completion falls in `[start, end]`.
    pub fn any_between(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= end && self.records.range(start..=end).next().is_some()
    }

    /// Copy of the records in `[start, end]`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::new();
        }
        Self {
            records: self
                .records
                .range(start..=end)
                .map(|(date, record)| (*date, record.clone()))
                .collect(),
        }
    }
}

impl FromIterator<CompletionRecord> for CompletionHistory {
    fn from_iter<T: IntoIterator<Item = CompletionRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}
