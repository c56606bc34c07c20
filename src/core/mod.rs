pub mod calendar;
pub mod dispatcher;
pub mod message;
pub mod scheduler;
pub mod service;

pub use crate::domain::model::{
    BirthdayRecord, DeliveryOutcome, DispatchEntry, DispatchReport, Occurrence, ReminderMessage,
};
pub use crate::domain::ports::{NotificationSink, RecordStore, ScheduledJob};
pub use crate::utils::error::Result;
