use crate::domain::model::ReminderMessage;
use crate::domain::ports::NotificationSink;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Writes reminders to the log instead of delivering them. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, destination: &str, message: &ReminderMessage) -> Result<()> {
        tracing::info!(
            "🔍 [dry run] to={} subject=\"{}\" body=\"{}\"",
            destination,
            message.subject,
            message.body
        );
        Ok(())
    }
}
