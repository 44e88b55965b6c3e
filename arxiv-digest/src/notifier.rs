use crate::config::MailConfig;
use crate::digest::{format_digest, format_plain_text};
use crate::traits::{DeliveryOutcome, DigestNotifier};
use crate::types::{DigestError, EnrichedPaperRecord, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info};

/// Sends the digest over SMTP. Nothing escapes `send_digest`: every failure
/// ends in a console dump of what would have been sent.
pub struct EmailNotifier<T = SmtpTransport> {
    config: MailConfig,
    transport: Option<T>,
}

impl EmailNotifier<SmtpTransport> {
    /// SMTPS (implicit TLS) to the configured relay. Missing credentials do
    /// not fail construction; they surface when sending.
    pub fn new(config: &MailConfig) -> Self {
        let transport = match smtp_transport(config) {
            Ok(transport) => Some(transport),
            Err(e) => {
                error!("Email transport unavailable: {}", e);
                None
            }
        };

        Self {
            config: config.clone(),
            transport,
        }
    }
}

fn smtp_transport(config: &MailConfig) -> Result<SmtpTransport> {
    let creds = config.credentials()?;
    let transport = SmtpTransport::relay(&config.smtp_host)
        .map_err(|e| DigestError::Delivery(format!("Invalid SMTP relay {}: {}", config.smtp_host, e)))?
        .port(config.smtp_port)
        .credentials(Credentials::new(
            creds.sender.to_string(),
            creds.app_password.to_string(),
        ))
        .build();
    Ok(transport)
}

impl<T> EmailNotifier<T>
where
    T: Transport,
    T::Error: std::fmt::Display,
{
    /// Use a ready-made transport, e.g. lettre's `StubTransport` in tests.
    pub fn with_transport(config: &MailConfig, transport: T) -> Self {
        Self {
            config: config.clone(),
            transport: Some(transport),
        }
    }

    /// Build the message; a failure here happens before any HTML exists.
    pub fn build_message(&self, html: String) -> Result<Message> {
        let creds = self.config.credentials()?;
        let from: Mailbox = creds
            .sender
            .parse()
            .map_err(|e| DigestError::Configuration(format!("Invalid sender address {}: {}", creds.sender, e)))?;
        let to: Mailbox = creds
            .recipient
            .parse()
            .map_err(|e| DigestError::Configuration(format!("Invalid recipient address {}: {}", creds.recipient, e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.config.subject.as_str())
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(html)))
            .map_err(|e| DigestError::Delivery(format!("Failed to build message: {}", e)))
    }

    /// Deliver or fall back to the console. See [`DeliveryOutcome`].
    pub fn deliver(&self, papers: &[EnrichedPaperRecord]) -> DeliveryOutcome {
        let transport = match (&self.transport, self.config.credentials()) {
            (Some(transport), Ok(_)) => transport,
            (_, Err(e)) => {
                error!("An error occurred in send_digest: {}", e);
                println!("{}", config_fallback_report(&e, papers));
                return DeliveryOutcome::ConsoleFallback;
            }
            (None, Ok(_)) => {
                let e = DigestError::Delivery("no email transport available".to_string());
                error!("An error occurred in send_digest: {}", e);
                println!("{}", config_fallback_report(&e, papers));
                return DeliveryOutcome::ConsoleFallback;
            }
        };

        let html = format_digest(papers);
        let message = match self.build_message(html.clone()) {
            Ok(message) => message,
            Err(e) => {
                error!("An error occurred in send_digest: {}", e);
                println!("{}", config_fallback_report(&e, papers));
                return DeliveryOutcome::ConsoleFallback;
            }
        };

        match transport.send(&message) {
            Ok(_) => {
                info!("Email sent successfully to {}", self.config.recipient_or_unknown());
                DeliveryOutcome::Sent
            }
            Err(e) => {
                let e = DigestError::Delivery(e.to_string());
                error!("Failed to send email: {}", e);
                println!(
                    "{}",
                    delivery_fallback_report(self.config.recipient_or_unknown(), &self.config.subject, &html)
                );
                DeliveryOutcome::ConsoleFallback
            }
        }
    }
}

#[async_trait]
impl<T> DigestNotifier for EmailNotifier<T>
where
    T: Transport + Send + Sync,
    T::Error: std::fmt::Display,
{
    async fn send_digest(&self, papers: &[EnrichedPaperRecord]) -> DeliveryOutcome {
        self.deliver(papers)
    }
}

/// Printed when the message was rendered but the transport refused it.
pub fn delivery_fallback_report(recipient: &str, subject: &str, html: &str) -> String {
    format!(
        "\n--- Fallback: Here is the email content you can send manually ---\n\n\
         To: {}\n\
         Subject: {}\n\
         Body (HTML):\n\n\
         {}",
        recipient, subject, html
    )
}

/// Printed when sending could not even be attempted.
pub fn config_fallback_report(error: &DigestError, papers: &[EnrichedPaperRecord]) -> String {
    format!(
        "\n--- Fallback: Unable to send email ({}). Please check your configuration. ---\n{}",
        error,
        format_plain_text(papers)
    )
}
