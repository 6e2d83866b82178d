//! SMTP delivery for mailroute
//!
//! Provides the narrow capability mail handlers use to build and send
//! messages: [`MailApi`] bound to one immutable [`MailerConfig`].

mod client;
mod error;
mod settings;

pub use client::{Destination, MailApi};
pub use error::{SmtpError, SmtpResult};
pub use settings::{MailerConfig, DEFAULT_SEND_TIMEOUT, ENV_PREFIX};

/// Re-export lettre message types handlers need to finish a message
pub mod message {
    pub use lettre::message::{header::ContentType, Mailbox, MessageBuilder, MultiPart, SinglePart};
    pub use lettre::Message;
}
