use crate::domain::model::{BirthdayRecord, ReminderMessage};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait RecordStore: Send + Sync {
    fn list_all_records(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<BirthdayRecord>>> + Send;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, destination: &str, message: &ReminderMessage) -> Result<()>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Box<T> {
    async fn send(&self, destination: &str, message: &ReminderMessage) -> Result<()> {
        (**self).send(destination, message).await
    }
}

/// Work invoked once per scheduler tick.
#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    async fn run_tick(&self, today: NaiveDate);
}
