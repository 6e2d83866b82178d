//! Mail types and send requests

use crate::{DispatchError, DispatchResult};
use mailroute_smtp::Destination;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

/// Tag identifying a category of mail, e.g. `"welcome"` or `"invoice"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MailType(String);

impl MailType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MailType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for MailType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl AsRef<str> for MailType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MailType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A request to send one mail of a given type.
///
/// The model is opaque to the dispatcher; only the handler registered for
/// the mail type interprets it, usually through [`SendRequest::model_as`].
#[derive(Debug, Clone)]
pub struct SendRequest {
    mail_type: MailType,
    model: Value,
    destination: Destination,
}

impl SendRequest {
    /// Create a request with an empty (`null`) model
    pub fn new(mail_type: impl Into<MailType>, destination: Destination) -> Self {
        Self {
            mail_type: mail_type.into(),
            model: Value::Null,
            destination,
        }
    }

    /// Attach a serializable model
    pub fn with_model<T: Serialize>(mut self, model: &T) -> DispatchResult<Self> {
        self.model = serde_json::to_value(model)?;
        Ok(self)
    }

    /// Attach an already serialized model
    pub fn with_raw_model(mut self, model: Value) -> Self {
        self.model = model;
        self
    }

    pub fn mail_type(&self) -> &MailType {
        &self.mail_type
    }

    pub fn model(&self) -> &Value {
        &self.model
    }

    /// Deserialize the model into the shape the handler expects
    pub fn model_as<T: DeserializeOwned>(&self) -> DispatchResult<T> {
        Deserialize::deserialize(&self.model).map_err(DispatchError::InvalidModel)
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        number: u32,
        total: String,
    }

    #[test]
    fn test_mail_type_equality_by_value() {
        assert_eq!(MailType::from("welcome"), MailType::new(String::from("welcome")));
        assert_ne!(MailType::from("welcome"), MailType::from("Welcome"));
        assert_eq!(MailType::from("invoice").to_string(), "invoice");
    }

    #[test]
    fn test_mail_type_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(MailType::from("invoice"), 1);
        assert_eq!(map.get("invoice"), Some(&1));
    }

    #[test]
    fn test_model_roundtrip_through_request() {
        let invoice = Invoice {
            number: 42,
            total: "12.50 EUR".into(),
        };
        let request = SendRequest::new("invoice", Destination::new().to("a@example.com"))
            .with_model(&invoice)
            .unwrap();

        assert_eq!(request.mail_type().as_str(), "invoice");
        assert_eq!(request.model()["number"], 42);
        assert_eq!(request.model_as::<Invoice>().unwrap(), invoice);
    }

    #[test]
    fn test_model_shape_mismatch() {
        let request = SendRequest::new("invoice", Destination::new())
            .with_raw_model(serde_json::json!({ "unexpected": true }));

        let result = request.model_as::<Invoice>();
        assert!(matches!(result, Err(DispatchError::InvalidModel(_))));
    }

    #[test]
    fn test_default_model_is_null() {
        let request = SendRequest::new("ping", Destination::new());
        assert!(request.model().is_null());
        assert_eq!(request.model_as::<Option<String>>().unwrap(), None);
    }
}
