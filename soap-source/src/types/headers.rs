//! SOAP header types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Headers returned by the service with the last response, keyed by name.
pub type OutputHeaders = Map<String, Value>;

/// A SOAP header attached to outgoing requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapHeader {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub must_understand: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl SoapHeader {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data,
            must_understand: false,
            actor: None,
        }
    }

    pub fn with_must_understand(mut self, must_understand: bool) -> Self {
        self.must_understand = must_understand;
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}
