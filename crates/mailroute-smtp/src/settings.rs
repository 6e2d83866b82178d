//! Mailer settings

use crate::{SmtpError, SmtpResult};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Environment variable prefix read by [`MailerConfig::from_env`]
pub const ENV_PREFIX: &str = "MAILROUTE";

/// Deadline applied to a send when `timeout_seconds` is not positive
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport and dispatch settings, fixed at sender construction
#[derive(Clone, Deserialize)]
pub struct MailerConfig {
    /// SMTP server hostname
    pub server: String,
    /// SMTP server port (default: 587)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sender address used for the From header
    pub from: String,
    /// SMTP username, authentication is skipped when empty
    #[serde(default)]
    pub user: String,
    /// SMTP password
    #[serde(default)]
    pub password: String,
    /// Delivery deadline in seconds, non-positive means one minute
    #[serde(default)]
    pub timeout_seconds: i64,
    /// Async sender queue capacity, non-positive means the default
    #[serde(default)]
    pub async_buffer_size: i64,
    /// Public base URL handlers can use to build links
    #[serde(default)]
    pub base_url: String,
}

fn default_port() -> u16 {
    587
}

impl MailerConfig {
    /// Create a configuration with defaults for everything but the server
    /// and sender address
    pub fn new(server: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: default_port(),
            from: from.into(),
            user: String::new(),
            password: String::new(),
            timeout_seconds: 0,
            async_buffer_size: 0,
            base_url: String::new(),
        }
    }

    /// Load configuration from `MAILROUTE_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> SmtpResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from `<PREFIX>_*` environment variables
    pub fn from_env_with_prefix(prefix: &str) -> SmtpResult<Self> {
        dotenvy::dotenv().ok();

        config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SmtpError::Config(e.to_string()))
    }

    /// Set the SMTP port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the SMTP credentials
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Set the delivery deadline in seconds
    pub fn timeout_seconds(mut self, seconds: i64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the async sender queue capacity
    pub fn async_buffer_size(mut self, size: i64) -> Self {
        self.async_buffer_size = size;
        self
    }

    /// Set the public base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Deadline used by [`MailApi::send`](crate::MailApi::send)
    pub fn send_timeout(&self) -> Duration {
        u64::try_from(self.timeout_seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEND_TIMEOUT)
    }
}

impl fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("async_buffer_size", &self.async_buffer_size)
            .field("base_url", &self.base_url)
            .finish()
    }
}
