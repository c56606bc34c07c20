use crate::config::MailConfig;
use crate::domain::model::ReminderMessage;
use crate::domain::ports::NotificationSink;
use crate::utils::error::{ReminderError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Port on which TLS starts immediately instead of via STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSink {
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let sender = config
            .sender()
            .ok_or_else(|| ReminderError::MissingConfigError {
                field: "mail.from".to_string(),
            })?;
        let from: Mailbox = sender
            .parse()
            .map_err(|e| ReminderError::InvalidConfigValueError {
                field: "mail.from".to_string(),
                value: sender.to_string(),
                reason: format!("{}", e),
            })?;

        let server = config.server();
        let builder = if !config.use_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server)
        } else if config.port() == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(server)
                .map_err(|e| smtp_config_error(server, e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
                .map_err(|e| smtp_config_error(server, e))?
        };

        let mut builder = builder.port(config.port()).timeout(Some(config.timeout()));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::debug!(
            "SMTP transport for {}:{} (tls: {})",
            server,
            config.port(),
            config.use_tls()
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn smtp_config_error(server: &str, e: lettre::transport::smtp::Error) -> ReminderError {
    ReminderError::InvalidConfigValueError {
        field: "mail.server".to_string(),
        value: server.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl NotificationSink for SmtpSink {
    async fn send(&self, destination: &str, message: &ReminderMessage) -> Result<()> {
        let failure = |reason: String| ReminderError::NotificationDeliveryFailure {
            destination: destination.to_string(),
            reason,
        };

        let to: Mailbox = destination
            .parse()
            .map_err(|e| failure(format!("invalid address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| failure(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| failure(e.to_string()))?;

        Ok(())
    }
}
