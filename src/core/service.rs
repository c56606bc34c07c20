use crate::core::dispatcher::ReminderDispatcher;
use crate::domain::model::DispatchReport;
use crate::domain::ports::{NotificationSink, RecordStore, ScheduledJob};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Binds a record store to a dispatcher for one check per tick.
pub struct ReminderService<R: RecordStore, N: NotificationSink> {
    store: R,
    dispatcher: ReminderDispatcher<N>,
}

impl<R: RecordStore, N: NotificationSink> ReminderService<R, N> {
    pub fn new(store: R, dispatcher: ReminderDispatcher<N>) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Fails only when the store cannot be read; per-record problems end up
    /// in the report.
    pub async fn check(&self, today: NaiveDate) -> Result<DispatchReport> {
        let records = self.store.list_all_records().await?;
        tracing::debug!("Loaded {} records from store", records.len());

        Ok(self.dispatcher.run_daily_check(&records, today).await)
    }
}

#[async_trait]
impl<R, N> ScheduledJob for ReminderService<R, N>
where
    R: RecordStore + 'static,
    N: NotificationSink + 'static,
{
    async fn run_tick(&self, today: NaiveDate) {
        match self.check(today).await {
            Ok(report) => {
                for failure in report.failures() {
                    tracing::warn!(
                        "Reminder for {} <{}> was not delivered",
                        failure.name,
                        failure.email
                    );
                }
            }
            Err(e) => {
                // 下一次排程會重新讀取
                tracing::error!("❌ Daily check for {} aborted: {}", today, e);
                tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            }
        }
    }
}
