//! Date arithmetic for recurring birthdays.
//!
//! A birthday is a month/day pair without a year. Its occurrence in a given
//! year is that month/day, except Feb 29 which falls on Feb 28 in non-leap
//! years.

use crate::domain::model::{BirthdayRecord, Occurrence, UpcomingBirthday};
use crate::utils::error::{ReminderError, Result};
use chrono::{Datelike, NaiveDate};

/// Any leap year works here; it only serves to accept Feb 29.
const REFERENCE_LEAP_YEAR: i32 = 2000;

pub fn validate_birth_date(month: u32, day: u32) -> Result<()> {
    match NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day) {
        Some(_) => Ok(()),
        None => Err(ReminderError::InvalidDateInput { month, day }),
    }
}

pub fn occurrence_in_year(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    validate_birth_date(month, day)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| {
            // 非閏年的 2/29 視為 2/28
            if month == 2 && day == 29 {
                NaiveDate::from_ymd_opt(year, 2, 28)
            } else {
                None
            }
        })
        .ok_or(ReminderError::InvalidDateInput { month, day })
}

/// The first occurrence on or after `today`.
pub fn next_occurrence(today: NaiveDate, month: u32, day: u32) -> Result<NaiveDate> {
    let candidate = occurrence_in_year(today.year(), month, day)?;
    if candidate >= today {
        return Ok(candidate);
    }

    let next_year = today.year() + 1;
    if NaiveDate::from_ymd_opt(next_year, 1, 1).is_none() {
        return Err(ReminderError::ValidationError {
            message: format!(
                "{} is the last supported year, no later birthday exists",
                today.year()
            ),
        });
    }
    occurrence_in_year(next_year, month, day)
}

pub fn days_until_next_occurrence(today: NaiveDate, month: u32, day: u32) -> Result<u32> {
    let next = next_occurrence(today, month, day)?;
    Ok(next.signed_duration_since(today).num_days() as u32)
}

/// Inclusive on both ends: a record stays due every day from
/// `notify_days_before` days out until the birthday itself.
pub fn is_due(days_until: u32, notify_days_before: u32) -> bool {
    days_until <= notify_days_before
}

pub fn occurrence_for(record: &BirthdayRecord, today: NaiveDate) -> Result<Occurrence> {
    let date = next_occurrence(today, record.birth_month, record.birth_day)?;
    Ok(Occurrence {
        date,
        days_until: date.signed_duration_since(today).num_days() as u32,
    })
}

/// 解析 `MM-DD` 格式的生日
pub fn parse_month_day(input: &str) -> Result<(u32, u32)> {
    let invalid = || ReminderError::ValidationError {
        message: format!("Expected a birthday in MM-DD format, got '{}'", input),
    };

    let (month, day) = input.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    validate_birth_date(month, day)?;
    Ok((month, day))
}

/// All valid records ordered by how soon their birthday comes up.
pub fn upcoming(records: &[BirthdayRecord], today: NaiveDate) -> Vec<UpcomingBirthday> {
    let mut list: Vec<UpcomingBirthday> = records
        .iter()
        .filter_map(|record| match occurrence_for(record, today) {
            Ok(occurrence) => Some(UpcomingBirthday {
                record: record.clone(),
                occurrence,
                is_today: occurrence.days_until == 0,
                is_due: is_due(occurrence.days_until, record.notify_days_before),
            }),
            Err(e) => {
                tracing::warn!("Skipping record {} ({}): {}", record.id, record.name, e);
                None
            }
        })
        .collect();

    list.sort_by(|a, b| {
        a.occurrence
            .days_until
            .cmp(&b.occurrence.days_until)
            .then_with(|| a.record.name.cmp(&b.record.name))
    });
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_of_calendar_range_is_not_an_invalid_birthday() {
        let last = NaiveDate::MAX;

        assert_eq!(
            next_occurrence(last, last.month(), last.day()).unwrap(),
            last
        );
        assert!(matches!(
            next_occurrence(last, 1, 1),
            Err(ReminderError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_birthday_today_is_zero_days_away() {
        assert_eq!(days_until_next_occurrence(date(2024, 3, 10), 3, 10).unwrap(), 0);
    }

    #[test]
    fn test_birthday_later_this_year() {
        assert_eq!(days_until_next_occurrence(date(2024, 3, 10), 3, 15).unwrap(), 5);
        assert_eq!(days_until_next_occurrence(date(2024, 3, 10), 3, 11).unwrap(), 1);
    }

    #[test]
    fn test_passed_birthday_rolls_into_next_year() {
        assert_eq!(next_occurrence(date(2024, 3, 10), 3, 9).unwrap(), date(2025, 3, 9));
        assert_eq!(days_until_next_occurrence(date(2023, 12, 31), 1, 1).unwrap(), 1);
        // 2024 是閏年
        assert_eq!(days_until_next_occurrence(date(2024, 1, 1), 12, 31).unwrap(), 365);
    }

    #[test]
    fn test_leap_day_falls_on_feb_28_in_common_years() {
        assert_eq!(occurrence_in_year(2023, 2, 29).unwrap(), date(2023, 2, 28));
        assert_eq!(occurrence_in_year(2024, 2, 29).unwrap(), date(2024, 2, 29));

        assert_eq!(days_until_next_occurrence(date(2023, 2, 28), 2, 29).unwrap(), 0);
        assert_eq!(days_until_next_occurrence(date(2023, 2, 27), 2, 29).unwrap(), 1);
        assert_eq!(next_occurrence(date(2023, 3, 1), 2, 29).unwrap(), date(2024, 2, 29));
        assert_eq!(next_occurrence(date(2024, 3, 1), 2, 29).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_leap_day_on_actual_leap_day() {
        assert_eq!(days_until_next_occurrence(date(2024, 2, 29), 2, 29).unwrap(), 0);
        assert_eq!(days_until_next_occurrence(date(2024, 2, 28), 2, 29).unwrap(), 1);
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        let today = date(2024, 3, 10);
        for (month, day) in [(13, 1), (0, 5), (4, 31), (2, 30), (1, 32), (6, 0)] {
            assert!(
                matches!(
                    days_until_next_occurrence(today, month, day),
                    Err(ReminderError::InvalidDateInput { .. })
                ),
                "{}-{} should be rejected",
                month,
                day
            );
        }
    }

    #[test]
    fn test_is_due_window() {
        assert!(is_due(0, 0));
        assert!(is_due(0, 1));
        assert!(is_due(1, 1));
        assert!(!is_due(2, 1));
        assert!(!is_due(5, 1));
        assert!(is_due(5, 7));
    }

    #[test]
    fn test_parse_month_day() {
        assert_eq!(parse_month_day("03-10").unwrap(), (3, 10));
        assert_eq!(parse_month_day("2-29").unwrap(), (2, 29));
        assert!(matches!(
            parse_month_day("13-01"),
            Err(ReminderError::InvalidDateInput { .. })
        ));
        assert!(matches!(
            parse_month_day("0310"),
            Err(ReminderError::ValidationError { .. })
        ));
        assert!(parse_month_day("aa-bb").is_err());
    }

    #[test]
    fn test_upcoming_sorted_and_flags_today() {
        let records = vec![
            BirthdayRecord::new("Bo", "bo@example.com", 3, 15),
            BirthdayRecord::new("Ann", "ann@example.com", 3, 10),
            BirthdayRecord::new("Broken", "broken@example.com", 2, 31),
            BirthdayRecord::new("Cy", "cy@example.com", 3, 11),
        ];

        let list = upcoming(&records, date(2024, 3, 10));
        let names: Vec<&str> = list.iter().map(|u| u.record.name.as_str()).collect();

        assert_eq!(names, vec!["Ann", "Cy", "Bo"]);
        assert!(list[0].is_today);
        assert!(!list[1].is_today);
        assert!(list[1].is_due);
        assert!(!list[2].is_due);
    }
}
