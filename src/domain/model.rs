use crate::core::calendar::validate_birth_date;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_notify_days_before() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub email: String,
    pub birth_month: u32,
    pub birth_day: u32,
    #[serde(default = "default_notify_days_before")]
    pub notify_days_before: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BirthdayRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>, month: u32, day: u32) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            birth_month: month,
            birth_day: day,
            notify_days_before: default_notify_days_before(),
            notes: None,
        }
    }

    pub fn with_notify_days_before(mut self, days: u32) -> Self {
        self.notify_days_before = days;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Validate for BirthdayRecord {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_non_empty_string("email", &self.email)?;
        validate_birth_date(self.birth_month, self.birth_day)
    }
}

/// A birthday pinned to a concrete calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub days_until: u32,
}

/// Everything a sink needs to deliver one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderMessage {
    pub name: String,
    pub next_occurrence: NaiveDate,
    pub days_until: u32,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    Failed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEntry {
    pub record_id: u64,
    pub name: String,
    pub email: String,
    pub occurrence: Occurrence,
    pub outcome: DeliveryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub record_id: u64,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub run_date: NaiveDate,
    pub records_scanned: usize,
    pub entries: Vec<DispatchEntry>,
    pub rejected: Vec<RejectedRecord>,
}

impl DispatchReport {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            run_date,
            records_scanned: 0,
            entries: Vec::new(),
            rejected: Vec::new(),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.sent_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_sent())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBirthday {
    pub record: BirthdayRecord,
    pub occurrence: Occurrence,
    pub is_today: bool,
    pub is_due: bool,
}
