use crate::domain::model::ReminderMessage;
use crate::domain::ports::NotificationSink;
use crate::utils::error::{ReminderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    to: &'a str,
    #[serde(flatten)]
    message: &'a ReminderMessage,
}

/// Posts each reminder as JSON to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
    token: Option<String>,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, destination: &str, message: &ReminderMessage) -> Result<()> {
        let failure = |reason: String| ReminderError::NotificationDeliveryFailure {
            destination: destination.to_string(),
            reason,
        };

        let payload = WebhookPayload {
            to: destination,
            message,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("Posting reminder for {} to {}", message.name, self.url);
        let response = request.send().await.map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Webhook response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!(
                "webhook responded with {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}
