pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{JsonFileStore, LogSink, MemoryStore, SmtpSink, WebhookSink};
pub use config::AppConfig;
pub use core::{
    dispatcher::ReminderDispatcher,
    scheduler::{DailyScheduler, Schedule, SchedulerHandle},
    service::ReminderService,
};
pub use utils::error::{ReminderError, Result};
