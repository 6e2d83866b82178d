//! Queue-backed asynchronous sender

use crate::worker::Worker;
use crate::{DispatchError, DispatchResult, HandlerRegistry, MailHandler, MailType, SendRequest, Sender};
use async_trait::async_trait;
use mailroute_smtp::{MailApi, MailerConfig};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Queue capacity used when the configuration does not set a positive one
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Queue capacity for an async sender built from `config`
pub fn queue_capacity(config: &MailerConfig) -> usize {
    usize::try_from(config.async_buffer_size)
        .ok()
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_QUEUE_CAPACITY)
}

/// Enqueues requests for a single background worker.
///
/// `send` returns as soon as the request is queued; while the queue is full
/// it waits for the worker to make room. The worker runs handlers one at a
/// time in enqueue order, logs failures and moves on, so callers never see
/// handler errors.
///
/// Clones share the queue, the registry and the worker. Once every clone is
/// dropped the worker finishes the requests already queued and stops; await
/// [`WorkerHandle::join`] to wait for that. Nothing is persisted, so requests
/// still queued when the process exits are lost.
///
/// ```ignore
/// let sender = AsyncSender::new(MailerConfig::from_env()?);
/// sender.register("welcome", welcome);
/// let worker = sender.start()?;
///
/// sender.send(request).await?;
///
/// drop(sender);
/// worker.join().await;
/// ```
#[derive(Debug, Clone)]
pub struct AsyncSender {
    api: MailApi,
    registry: Arc<HandlerRegistry>,
    queue_tx: mpsc::Sender<SendRequest>,
    /// Taken by `start`; empty once the worker runs
    queue_rx: Arc<Mutex<Option<mpsc::Receiver<SendRequest>>>>,
}

impl AsyncSender {
    pub fn new(config: impl Into<Arc<MailerConfig>>) -> Self {
        let api = MailApi::new(config);
        let (queue_tx, queue_rx) = mpsc::channel(queue_capacity(api.configuration()));

        Self {
            api,
            registry: Arc::new(HandlerRegistry::new()),
            queue_tx,
            queue_rx: Arc::new(Mutex::new(Some(queue_rx))),
        }
    }

    /// Spawn the background worker on the current tokio runtime.
    ///
    /// Only one worker ever runs per sender; a second call returns
    /// [`DispatchError::AlreadyStarted`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&self) -> DispatchResult<WorkerHandle> {
        let queue_rx = self
            .queue_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(DispatchError::AlreadyStarted)?;

        info!(capacity = self.capacity(), "Starting async mail worker");
        let worker = Worker::new(queue_rx, self.registry.clone(), self.api.clone());

        Ok(WorkerHandle {
            task: tokio::spawn(worker.run()),
        })
    }

    /// Maximum number of requests waiting in the queue
    pub fn capacity(&self) -> usize {
        self.queue_tx.max_capacity()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn configuration(&self) -> &MailerConfig {
        self.api.configuration()
    }
}

#[async_trait]
impl Sender for AsyncSender {
    async fn send(&self, request: SendRequest) -> DispatchResult<()> {
        let mail_type = request.mail_type().clone();

        self.queue_tx.send(request).await.map_err(|_| {
            warn!(%mail_type, "Mail worker has stopped, request rejected");
            DispatchError::QueueClosed
        })?;

        debug!(%mail_type, "Mail request queued");
        Ok(())
    }

    fn register_mail_type(&self, mail_type: MailType, handler: MailHandler) {
        self.registry.register(mail_type, handler);
    }
}

/// Handle to the running worker of an [`AsyncSender`]
#[derive(Debug)]
pub struct WorkerHandle {
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Wait for the worker to drain the queue and stop. The worker stops only
    /// after every clone of its sender has been dropped.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Mail worker task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
