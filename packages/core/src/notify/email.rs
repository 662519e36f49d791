//! SMTP delivery via lettre.
//!
//! Authenticated submission over STARTTLS. The transport is blocking, so
//! each send runs on the blocking pool and is awaited before the run moves
//! to the next line item.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::EmailConfig;
use crate::monitor::error::{ServiceError, ServiceResult};
use crate::monitor::provider::Notifier;
use crate::notify::message::StatusNotification;

pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
    subject_prefix: String,
}

impl SmtpNotifier {
    /// Validates addresses and prepares the STARTTLS transport. No
    /// connection is opened until the first send.
    pub fn new(config: &EmailConfig) -> ServiceResult<Self> {
        install_crypto_provider();

        let from: Mailbox = config.sender.parse().map_err(|e| {
            ServiceError::email(format!("Invalid sender address '{}': {}", config.sender, e))
        })?;

        let to = config
            .recipients
            .iter()
            .map(|addr| {
                addr.parse::<Mailbox>().map_err(|e| {
                    ServiceError::email(format!("Invalid recipient address '{}': {}", addr, e))
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let credentials = Credentials::new(
            config.sender.clone(),
            config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::starttls_relay(&config.smtp_host)
            .map_err(|e| ServiceError::email(format!("SMTP relay error: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject_prefix: config.subject_prefix.clone(),
        })
    }

    pub fn build_message(&self, notification: &StatusNotification) -> ServiceResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notification.subject(&self.subject_prefix))
            .header(ContentType::TEXT_PLAIN);

        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }

        builder
            .body(notification.body())
            .map_err(|e| ServiceError::email(format!("Failed to build email: {}", e)))
    }

    fn recipient_list(&self) -> String {
        self.to
            .iter()
            .map(|mb| mb.email.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// rustls needs a process-wide provider when more than one is compiled in.
/// Already installed is fine.
fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &StatusNotification) -> ServiceResult<()> {
        let message = self.build_message(notification)?;
        let transport = self.transport.clone();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| ServiceError::email(format!("SMTP task failed: {}", e)))?
            .map_err(|e| ServiceError::email(format!("SMTP send failed: {}", e)))?;

        tracing::info!("Email sent to {}", self.recipient_list());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    use crate::monitor::decision::Decision;
    use crate::monitor::types::{LineItemId, LineItemStatus};

    fn email_config(recipients: &[&str]) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender: "ops@example.com".to_string(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            subject_prefix: "TESTING| ".to_string(),
            password: SecretString::from("secret".to_string()),
        }
    }

    fn completed_notification() -> StatusNotification {
        StatusNotification {
            line_item_id: LineItemId::from(222),
            impressions: 10,
            threshold: 50,
            status: Some(LineItemStatus::Completed),
            decision: Decision::Completed,
        }
    }

    #[test]
    fn message_carries_subject_and_all_recipients() {
        let notifier = SmtpNotifier::new(&email_config(&["a@example.com", "b@example.com"])).unwrap();

        let message = notifier.build_message(&completed_notification()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: TESTING| Line Item 222 Status Update"));
        assert!(raw.contains("From: ops@example.com"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("has completed its delivery with 10 impressions"));
        assert_eq!(notifier.recipient_list(), "a@example.com, b@example.com");
    }

    #[test]
    fn invalid_recipient_is_rejected_at_construction() {
        let err = SmtpNotifier::new(&email_config(&["not-an-address"])).err().unwrap();
        assert!(matches!(err, ServiceError::Email { message } if message.contains("not-an-address")));
    }
}
