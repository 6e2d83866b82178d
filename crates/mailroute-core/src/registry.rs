//! Mail type to handler registry

use crate::{MailHandler, MailType};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Maps mail types to the handler that delivers them.
///
/// Each sender owns one registry. Registration takes a write lock that is
/// released before any handler runs, so registering while requests are in
/// flight is allowed; a request resolved before the registration lands uses
/// the previous mapping.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<MailType, MailHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` for `mail_type`, replacing any earlier registration
    pub fn register(&self, mail_type: MailType, handler: MailHandler) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if handlers.insert(mail_type.clone(), handler).is_some() {
            debug!(%mail_type, "Replaced mail handler");
        } else {
            debug!(%mail_type, "Registered mail handler");
        }
    }

    /// Look up the handler for `mail_type`
    pub fn resolve(&self, mail_type: &MailType) -> Option<MailHandler> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(mail_type)
            .cloned()
    }

    pub fn contains(&self, mail_type: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(mail_type)
    }

    /// Registered mail types, sorted
    pub fn mail_types(&self) -> Vec<MailType> {
        let mut types: Vec<MailType> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
