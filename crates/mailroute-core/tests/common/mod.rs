#![allow(dead_code)]

use mailroute_core::{Destination, HandlerError, MailHandler, MailerConfig, SendRequest};
use std::time::Duration;
use tokio::sync::mpsc;

pub fn config() -> MailerConfig {
    MailerConfig::new("smtp.example.com", "noreply@example.com")
}

/// Request whose model is a plain label the recording handler reports back
pub fn request(mail_type: &str, label: &str) -> SendRequest {
    SendRequest::new(mail_type, Destination::new().to("user@example.com"))
        .with_model(&label)
        .unwrap()
}

/// Handler that reports `<tag>:<label>` for every request it receives
pub fn recording(tag: &'static str, seen: mpsc::UnboundedSender<String>) -> MailHandler {
    MailHandler::new(move |_api, request: SendRequest| {
        let seen = seen.clone();
        async move {
            let label: String = request.model_as()?;
            seen.send(format!("{}:{}", tag, label))?;
            Ok::<(), HandlerError>(())
        }
    })
}

/// Collect `count` reports, failing the test if they do not arrive in time
pub async fn collect(seen: &mut mpsc::UnboundedReceiver<String>, count: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let next = tokio::time::timeout(Duration::from_secs(5), seen.recv())
            .await
            .expect("timed out waiting for handler")
            .expect("handler channel closed");
        out.push(next);
    }
    out
}
