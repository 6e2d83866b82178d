//! Error types for mail dispatch

use crate::{HandlerError, MailType};
use thiserror::Error;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that can occur while dispatching a mail request
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the request's mail type
    #[error("No handler registered for mail type '{0}'")]
    UnregisteredType(MailType),

    /// The handler ran and reported a failure
    #[error("Mail handler failed: {0}")]
    Handler(HandlerError),

    /// The handler panicked on the async worker
    #[error("Mail handler for '{0}' panicked")]
    HandlerPanicked(MailType),

    /// The request model could not be converted
    #[error("Invalid mail model: {0}")]
    InvalidModel(#[from] serde_json::Error),

    /// `start` was called on an async sender whose worker already runs
    #[error("Async mail worker already started")]
    AlreadyStarted,

    /// The async worker is gone and no longer accepts requests
    #[error("Async mail queue is closed")]
    QueueClosed,
}
