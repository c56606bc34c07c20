use crate::core::calendar::{is_due, occurrence_for};
use crate::core::message::render_reminder;
use crate::domain::model::{
    BirthdayRecord, DeliveryOutcome, DispatchEntry, DispatchReport, RejectedRecord,
    ReminderMessage,
};
use crate::domain::ports::NotificationSink;
use crate::utils::error::ReminderError;
use chrono::NaiveDate;
use std::time::Duration;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ReminderDispatcher<N: NotificationSink> {
    sink: N,
    send_timeout: Duration,
}

impl<N: NotificationSink> ReminderDispatcher<N> {
    pub fn new(sink: N) -> Self {
        Self {
            sink,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Scan `records` once and notify every record whose birthday is within
    /// its window. A failing record never stops the scan.
    pub async fn run_daily_check(
        &self,
        records: &[BirthdayRecord],
        today: NaiveDate,
    ) -> DispatchReport {
        let mut report = DispatchReport::new(today);
        report.records_scanned = records.len();

        tracing::debug!("Checking {} records for {}", records.len(), today);

        for record in records {
            let occurrence = match occurrence_for(record, today) {
                Ok(occurrence) => occurrence,
                Err(e) => {
                    tracing::warn!("⚠️ Skipping record {} ({}): {}", record.id, record.name, e);
                    report.rejected.push(RejectedRecord {
                        record_id: record.id,
                        name: record.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !is_due(occurrence.days_until, record.notify_days_before) {
                tracing::debug!(
                    "{} not due: {} days left, window {}",
                    record.name,
                    occurrence.days_until,
                    record.notify_days_before
                );
                continue;
            }

            let message = render_reminder(record, &occurrence);
            let outcome = self.deliver(&record.email, &message).await;

            match &outcome {
                DeliveryOutcome::Sent => tracing::info!(
                    "📧 Reminder for {} sent to {} ({} days left)",
                    record.name,
                    record.email,
                    occurrence.days_until
                ),
                DeliveryOutcome::Failed { reason } => tracing::error!(
                    "❌ Reminder for {} to {} failed: {}",
                    record.name,
                    record.email,
                    reason
                ),
            }

            report.entries.push(DispatchEntry {
                record_id: record.id,
                name: record.name.clone(),
                email: record.email.clone(),
                occurrence,
                outcome,
            });
        }

        tracing::info!(
            "✅ Daily check for {} done: {} scanned, {} due, {} sent, {} failed, {} rejected",
            today,
            report.records_scanned,
            report.entries.len(),
            report.sent_count(),
            report.failed_count(),
            report.rejected.len()
        );

        report
    }

    async fn deliver(&self, destination: &str, message: &ReminderMessage) -> DeliveryOutcome {
        match tokio::time::timeout(self.send_timeout, self.sink.send(destination, message)).await
        {
            Ok(Ok(())) => DeliveryOutcome::Sent,
            Ok(Err(ReminderError::NotificationDeliveryFailure { reason, .. })) => {
                DeliveryOutcome::Failed { reason }
            }
            Ok(Err(e)) => DeliveryOutcome::Failed {
                reason: e.to_string(),
            },
            Err(_) => DeliveryOutcome::Failed {
                reason: format!("timed out after {:?}", self.send_timeout),
            },
        }
    }
}
