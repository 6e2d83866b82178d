//! SMTP delivery capability

use crate::{MailerConfig, SmtpError, SmtpResult};
use lettre::{
    message::{Mailbox, MessageBuilder},
    transport::smtp::authentication::{Credentials, Mechanism},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Recipients of an outgoing message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// To addresses
    pub to: Vec<String>,
    /// CC addresses
    #[serde(default)]
    pub cc: Vec<String>,
    /// BCC addresses
    #[serde(default)]
    pub bcc: Vec<String>,
}

impl Destination {
    /// Create an empty destination
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a To recipient
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a CC recipient
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a BCC recipient
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// True when no recipient of any kind is set
    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty()
    }
}

/// Handle used by mail handlers to build and deliver messages.
///
/// Bound to a single [`MailerConfig`]; cloning is cheap and every clone
/// shares the same configuration.
#[derive(Debug, Clone)]
pub struct MailApi {
    config: Arc<MailerConfig>,
}

impl MailApi {
    /// Create a delivery handle for the given configuration
    pub fn new(config: impl Into<Arc<MailerConfig>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Configuration this handle delivers with
    pub fn configuration(&self) -> &MailerConfig {
        &self.config
    }

    /// Start a message addressed to `destination`, with From taken from the
    /// configuration. The caller sets subject and body.
    pub fn prepare_message(&self, destination: &Destination) -> SmtpResult<MessageBuilder> {
        if destination.is_empty() {
            return Err(SmtpError::MessageBuildError(
                "at least one recipient is required".to_string(),
            ));
        }

        let mut builder = Message::builder().from(parse_mailbox(&self.config.from)?);

        for to in &destination.to {
            builder = builder.to(parse_mailbox(to)?);
        }

        for cc in &destination.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }

        for bcc in &destination.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }

        Ok(builder)
    }

    /// Send a message with the configured deadline, or one minute when the
    /// configuration does not set one
    pub async fn send(&self, message: Message) -> SmtpResult<()> {
        self.send_with_timeout(message, self.config.send_timeout())
            .await
    }

    /// Send a message, giving up once `timeout` has elapsed
    pub async fn send_with_timeout(&self, message: Message, timeout: Duration) -> SmtpResult<()> {
        info!(server = %self.config.server, "Sending email via SMTP");

        let transport = self.transport(timeout)?;

        match tokio::time::timeout(timeout, transport.send(message)).await {
            Ok(Ok(response)) => {
                debug!(code = %response.code(), "SMTP server accepted message");
                info!("Email sent successfully");
                Ok(())
            }
            Ok(Err(e)) if e.is_timeout() => Err(SmtpError::Timeout(timeout)),
            Ok(Err(e)) => Err(SmtpError::SendFailed(e.to_string())),
            Err(_) => Err(SmtpError::Timeout(timeout)),
        }
    }

    /// Build a STARTTLS transport with PLAIN auth for the configured server
    fn transport(&self, timeout: Duration) -> SmtpResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)
            .map_err(|e| SmtpError::ConnectionFailed(e.to_string()))?
            .port(self.config.port)
            .timeout(Some(timeout));

        if !self.config.user.is_empty() {
            builder = builder
                .credentials(Credentials::new(
                    self.config.user.clone(),
                    self.config.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain]);
        }

        Ok(builder.build())
    }
}

fn parse_mailbox(address: &str) -> SmtpResult<Mailbox> {
    address
        .parse()
        .map_err(|e| SmtpError::InvalidAddress(format!("{}: {}", address, e)))
}
