use crate::domain::model::{BirthdayRecord, Occurrence, ReminderMessage};

pub const REMINDER_SUBJECT: &str = "🎉 Birthday Reminder!";

pub fn render_reminder(record: &BirthdayRecord, occurrence: &Occurrence) -> ReminderMessage {
    let body = match occurrence.days_until {
        0 => format!(
            "Today is {}'s birthday! Don't forget to wish them. 🥳",
            record.name
        ),
        1 => format!(
            "{}'s birthday is tomorrow, {}. Don't forget to wish them. 🥳",
            record.name,
            occurrence.date.format("%B %-d")
        ),
        days => format!(
            "{}'s birthday is in {} days, on {}. Don't forget to wish them. 🥳",
            record.name,
            days,
            occurrence.date.format("%B %-d")
        ),
    };

    ReminderMessage {
        name: record.name.clone(),
        next_occurrence: occurrence.date,
        days_until: occurrence.days_until,
        subject: REMINDER_SUBJECT.to_string(),
        body,
    }
}
