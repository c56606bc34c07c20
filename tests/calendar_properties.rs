use birthday_reminder::core::calendar::{
    days_until_next_occurrence, is_due, next_occurrence, validate_birth_date,
};
use birthday_reminder::core::NotificationSink;
use birthday_reminder::domain::model::{BirthdayRecord, ReminderMessage};
use birthday_reminder::ReminderDispatcher;
use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 0u32..366).prop_map(|(year, offset)| {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let date = start + Duration::days(offset as i64);
        // 非閏年的第 366 天會跑到隔年，保持在當年年底
        if date.year() == year {
            date
        } else {
            NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
        }
    })
}

fn any_birthday() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=12, 1u32..=31).prop_filter("must be a real day of year", |(m, d)| {
        validate_birth_date(*m, *d).is_ok()
    })
}

#[derive(Default, Clone)]
struct CountingSink {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl NotificationSink for CountingSink {
    async fn send(
        &self,
        _destination: &str,
        _message: &ReminderMessage,
    ) -> birthday_reminder::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

proptest! {
    #[test]
    fn days_until_is_within_a_year(today in any_date(), (month, day) in any_birthday()) {
        let days = days_until_next_occurrence(today, month, day).unwrap();
        prop_assert!(days <= 366);
    }

    #[test]
    fn days_until_is_deterministic(today in any_date(), (month, day) in any_birthday()) {
        prop_assert_eq!(
            days_until_next_occurrence(today, month, day).unwrap(),
            days_until_next_occurrence(today, month, day).unwrap()
        );
    }

    #[test]
    fn birthday_today_is_zero(today in any_date()) {
        prop_assert_eq!(days_until_next_occurrence(today, today.month(), today.day()).unwrap(), 0);
    }

    #[test]
    fn next_occurrence_is_never_in_the_past(today in any_date(), (month, day) in any_birthday()) {
        let next = next_occurrence(today, month, day).unwrap();
        prop_assert!(next >= today);
        prop_assert_eq!(next.month(), month);
        if !(month == 2 && day == 29) {
            prop_assert_eq!(next.day(), day);
        }
    }

    #[test]
    fn zero_days_is_always_due(window in 0u32..400) {
        prop_assert!(is_due(0, window));
    }

    #[test]
    fn beyond_window_is_never_due(window in 0u32..400, extra in 1u32..400) {
        prop_assert!(!is_due(window + extra, window));
    }

    #[test]
    fn dispatcher_sends_once_per_due_record(
        today in any_date(),
        birthdays in proptest::collection::vec((any_birthday(), 0u32..10), 0..20),
    ) {
        let records: Vec<BirthdayRecord> = birthdays
            .iter()
            .enumerate()
            .map(|(i, ((month, day), window))| {
                BirthdayRecord::new(format!("P{}", i), format!("p{}@example.com", i), *month, *day)
                    .with_notify_days_before(*window)
            })
            .collect();

        let expected = records
            .iter()
            .filter(|r| {
                let days = days_until_next_occurrence(today, r.birth_month, r.birth_day).unwrap();
                is_due(days, r.notify_days_before)
            })
            .count();

        let sink = CountingSink::default();
        let dispatcher = ReminderDispatcher::new(sink.clone());
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let report = rt.block_on(dispatcher.run_daily_check(&records, today));

        prop_assert_eq!(sink.calls.load(Ordering::SeqCst), expected);
        prop_assert_eq!(report.sent_count(), expected);
        prop_assert!(report.rejected.is_empty());
    }
}

#[test]
fn leap_day_birthday_in_common_year_is_feb_28() {
    let today = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
    assert_eq!(
        next_occurrence(today, 2, 29).unwrap(),
        NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
    );
    assert_eq!(days_until_next_occurrence(today, 2, 29).unwrap(), 27);
}

#[test]
fn every_day_of_a_leap_year_has_a_birthday_zero_days_away() {
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    while date.year() == 2024 {
        assert_eq!(days_until_next_occurrence(date, date.month(), date.day()).unwrap(), 0);
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn reminder_fires_one_day_ahead_by_default() {
    let records = vec![BirthdayRecord::new("Ann", "ann@example.com", 3, 10)];
    let sink = CountingSink::default();
    let dispatcher = ReminderDispatcher::new(sink.clone());

    let report = tokio_test::block_on(
        dispatcher.run_daily_check(&records, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()),
    );

    assert_eq!(report.sent_count(), 1);
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
}
