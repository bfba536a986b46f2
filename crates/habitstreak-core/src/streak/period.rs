//! Period calendar shared by the streak engine and statistics.
//!
//! Every periodicity reduces a date to the first day of its period:
//! the day itself, the Monday of its week, or the 1st of its month.
//! Two periods are adjacent when stepping back one period from the later
//! start lands exactly on the earlier start.

use chrono::{Datelike, Days, Duration, Months, NaiveDate, Weekday};

use crate::habit::Periodicity;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
}

/// First day of the calendar month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    // day 1 exists in every month
    date.with_day(1).unwrap_or(date)
}

/// First day of the period containing `date`.
pub fn period_start(periodicity: Periodicity, date: NaiveDate) -> NaiveDate {
    match periodicity {
        Periodicity::Daily => date,
        Periodicity::Weekly => week_start(date),
        Periodicity::Monthly => month_start(date),
    }
}

/// Last day of the period containing `date`.
pub fn period_end(periodicity: Periodicity, date: NaiveDate) -> NaiveDate {
    let start = period_start(periodicity, date);
    match periodicity {
        Periodicity::Daily => start,
        Periodicity::Weekly => start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX),
        Periodicity::Monthly => start
            .checked_add_months(Months::new(1))
            .map(|next| next - Duration::days(1))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// Start of the period immediately before the one starting at `start`.
///
/// `start` must already be period-aligned. Returns `None` only when the
/// previous period would fall before the representable calendar.
pub fn previous_period(periodicity: Periodicity, start: NaiveDate) -> Option<NaiveDate> {
    match periodicity {
        Periodicity::Daily => start.pred_opt(),
        Periodicity::Weekly => start.checked_sub_signed(Duration::days(7)),
        Periodicity::Monthly => start.checked_sub_months(Months::new(1)),
    }
}

/// Whether `earlier` and `later` (both period-aligned) are distinct,
/// back-to-back periods.
pub fn are_adjacent(periodicity: Periodicity, later: NaiveDate, earlier: NaiveDate) -> bool {
    previous_period(periodicity, later) == Some(earlier)
}

/// Whether `date` is the day that stands for its whole period when
/// computing marker-based completion rates.
pub fn is_marker_day(periodicity: Periodicity, date: NaiveDate) -> bool {
    match periodicity {
        Periodicity::Daily => true,
        Periodicity::Weekly => date.weekday() == Weekday::Mon,
        Periodicity::Monthly => date.day() == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_start_is_monday_for_every_weekday() {
        // 2024-03-04 is a Monday
        for offset in 0..7 {
            let date = d(2024, 3, 4) + Duration::days(offset);
            assert_eq!(week_start(date), d(2024, 3, 4), "offset {offset}");
        }
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(d(2024, 3, 3)), d(2024, 2, 26));
    }

    #[test]
    fn week_start_crosses_year_boundary() {
        // 2025-01-01 is a Wednesday
        assert_eq!(week_start(d(2025, 1, 1)), d(2024, 12, 30));
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(period_end(Periodicity::Monthly, d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(period_end(Periodicity::Monthly, d(2023, 12, 31)), d(2023, 12, 31));
        assert_eq!(period_end(Periodicity::Weekly, d(2024, 3, 6)), d(2024, 3, 10));
    }

    #[test]
    fn previous_period_steps_back_one_unit() {
        assert_eq!(previous_period(Periodicity::Daily, d(2024, 3, 1)), Some(d(2024, 2, 29)));
        assert_eq!(previous_period(Periodicity::Weekly, d(2024, 3, 4)), Some(d(2024, 2, 26)));
        assert_eq!(previous_period(Periodicity::Monthly, d(2024, 1, 1)), Some(d(2023, 12, 1)));
    }

    #[test]
    fn adjacency_requires_distinct_consecutive_periods() {
        assert!(are_adjacent(Periodicity::Weekly, d(2024, 3, 11), d(2024, 3, 4)));
        assert!(!are_adjacent(Periodicity::Weekly, d(2024, 3, 4), d(2024, 3, 4)));
        assert!(!are_adjacent(Periodicity::Weekly, d(2024, 3, 18), d(2024, 3, 4)));
        assert!(are_adjacent(Periodicity::Monthly, d(2024, 3, 1), d(2024, 2, 1)));
    }

    #[test]
    fn periods_clamp_at_calendar_edges() {
        for p in [Periodicity::Daily, Periodicity::Weekly, Periodicity::Monthly] {
            assert_eq!(period_end(p, NaiveDate::MAX), NaiveDate::MAX);
        }
        assert!(week_start(NaiveDate::MAX) <= NaiveDate::MAX);
        assert!(week_start(NaiveDate::MIN) >= NaiveDate::MIN);
        assert_eq!(previous_period(Periodicity::Daily, NaiveDate::MIN), None);
    }

    #[test]
    fn marker_days() {
        assert!(is_marker_day(Periodicity::Daily, d(2024, 3, 6)));
        assert!(is_marker_day(Periodicity::Weekly, d(2024, 3, 4)));
        assert!(!is_marker_day(Periodicity::Weekly, d(2024, 3, 5)));
        assert!(is_marker_day(Periodicity::Monthly, d(2024, 3, 1)));
        assert!(!is_marker_day(Periodicity::Monthly, d(2024, 3, 2)));
    }
}
