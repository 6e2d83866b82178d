//! Mail handler function values

use crate::SendRequest;
use futures::future::{BoxFuture, FutureExt};
use mailroute_smtp::MailApi;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Error returned by a mail handler; any error type converts into it with `?`
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias for the return type of a mail handler
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn = dyn Fn(MailApi, SendRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// Application logic that turns a [`SendRequest`] into a delivery through
/// the [`MailApi`] it is handed.
///
/// ```ignore
/// async fn welcome(api: MailApi, request: SendRequest) -> HandlerResult {
///     let user: User = request.model_as()?;
///     let message = api
///         .prepare_message(request.destination())?
///         .subject("Welcome!")
///         .body(format!("Hi {}", user.name))?;
///     api.send(message).await?;
///     Ok(())
/// }
///
/// sender.register("welcome", welcome);
/// ```
#[derive(Clone)]
pub struct MailHandler {
    inner: Arc<HandlerFn>,
}

impl MailHandler {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(MailApi, SendRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |api, request| handler(api, request).boxed()),
        }
    }

    pub(crate) fn call(&self, api: MailApi, request: SendRequest) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(api, request)
    }
}

impl fmt::Debug for MailHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailHandler").finish_non_exhaustive()
    }
}
