//! Background worker draining the async sender queue

use crate::sender::dispatch;
use crate::{DispatchError, HandlerRegistry, SendRequest};
use futures::FutureExt;
use mailroute_smtp::MailApi;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Single consumer of the async queue. Handles one request at a time in
/// arrival order and exits once every producer is gone and the queue is
/// empty.
pub(crate) struct Worker {
    queue_rx: mpsc::Receiver<SendRequest>,
    registry: Arc<HandlerRegistry>,
    api: MailApi,
}

impl Worker {
    pub(crate) fn new(
        queue_rx: mpsc::Receiver<SendRequest>,
        registry: Arc<HandlerRegistry>,
        api: MailApi,
    ) -> Self {
        Self {
            queue_rx,
            registry,
            api,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Mail worker started, waiting for requests");

        while let Some(request) = self.queue_rx.recv().await {
            let mail_type = request.mail_type().clone();
            debug!(%mail_type, "Mail request dequeued");

            // A panicking handler must not take the worker down with it
            let outcome = AssertUnwindSafe(dispatch(&self.registry, &self.api, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(DispatchError::HandlerPanicked(mail_type.clone())));

            match outcome {
                Ok(()) => info!(%mail_type, "Mail sent"),
                Err(e) => error!(%mail_type, "Mail request dropped: {}", e),
            }
        }

        info!("Mail queue closed, worker stopped");
    }
}
