//! Mail dispatch for mailroute
//!
//! Maps mail types to application handlers and runs them either on the
//! caller's task ([`SyncSender`]) or on a single background worker fed by a
//! bounded FIFO queue ([`AsyncSender`]).

mod async_sender;
mod error;
mod handler;
mod registry;
mod request;
mod sender;
mod worker;

pub use async_sender::{queue_capacity, AsyncSender, WorkerHandle, DEFAULT_QUEUE_CAPACITY};
pub use error::{DispatchError, DispatchResult};
pub use handler::{HandlerError, HandlerResult, MailHandler};
pub use registry::HandlerRegistry;
pub use request::{MailType, SendRequest};
pub use sender::{Sender, SyncSender};

pub use mailroute_smtp::{Destination, MailApi, MailerConfig};
