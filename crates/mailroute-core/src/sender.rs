//! Sender interface and the synchronous sender

use crate::{
    DispatchError, DispatchResult, HandlerRegistry, HandlerResult, MailHandler, MailType,
    SendRequest,
};
use async_trait::async_trait;
use mailroute_smtp::{MailApi, MailerConfig};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};

/// Submits mail requests without knowing how each mail type is delivered
#[async_trait]
pub trait Sender: Send + Sync {
    /// Submit a request for delivery
    async fn send(&self, request: SendRequest) -> DispatchResult<()>;

    /// Register the handler for a mail type, replacing any previous one
    fn register_mail_type(&self, mail_type: MailType, handler: MailHandler);

    /// Register a plain async function or closure as the handler for a mail
    /// type
    fn register<F, Fut>(&self, mail_type: impl Into<MailType>, handler: F)
    where
        Self: Sized,
        F: Fn(MailApi, SendRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_mail_type(mail_type.into(), MailHandler::new(handler));
    }
}

/// Resolve the handler for `request` and run it to completion.
///
/// Fails with [`DispatchError::UnregisteredType`] before any handler or
/// delivery code runs when the mail type is unknown.
pub(crate) async fn dispatch(
    registry: &HandlerRegistry,
    api: &MailApi,
    request: SendRequest,
) -> DispatchResult<()> {
    let mail_type = request.mail_type().clone();
    let handler = registry
        .resolve(&mail_type)
        .ok_or(DispatchError::UnregisteredType(mail_type.clone()))?;

    debug!(%mail_type, "Dispatching mail request");
    handler
        .call(api.clone(), request)
        .await
        .map_err(DispatchError::Handler)
}

/// Runs the handler on the caller's task; `send` resolves once the handler
/// has finished and reports its outcome.
#[derive(Debug)]
pub struct SyncSender {
    api: MailApi,
    registry: HandlerRegistry,
}

impl SyncSender {
    pub fn new(config: impl Into<Arc<MailerConfig>>) -> Self {
        Self {
            api: MailApi::new(config),
            registry: HandlerRegistry::new(),
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn configuration(&self) -> &MailerConfig {
        self.api.configuration()
    }
}

#[async_trait]
impl Sender for SyncSender {
    async fn send(&self, request: SendRequest) -> DispatchResult<()> {
        let mail_type = request.mail_type().clone();
        dispatch(&self.registry, &self.api, request)
            .await
            .inspect_err(|e| error!(%mail_type, "Failed to send mail: {}", e))
    }

    fn register_mail_type(&self, mail_type: MailType, handler: MailHandler) {
        self.registry.register(mail_type, handler);
    }
}
