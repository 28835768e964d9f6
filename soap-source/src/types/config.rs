//! Connection configuration for the SOAP data source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::error::{Error, Result};

/// Configuration handed to the SOAP client on connect.
///
/// Keys other than the ones named here are collected into [`options`] and
/// passed through to the client verbatim.
///
/// # Example
///
/// ```rust
/// use soap_source::SoapConfig;
///
/// let config = SoapConfig::new("https://api.example.com/service?wsdl")
///     .with_location("https://api.example.com/service")
///     .with_debug(true)
///     .with_option("connection_timeout", 30);
/// assert_eq!(config.host(), "https://api.example.com/service");
/// ```
///
/// [`options`]: SoapConfig::options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoapConfig {
    /// Location of the service description.
    #[serde(default)]
    pub wsdl: String,

    /// Endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Diagnostic mode, resolved by the caller before the session is built.
    #[serde(default)]
    pub debug: bool,

    /// Retain last request/response payloads. Replaced with `debug` on every
    /// connect.
    #[serde(default)]
    pub trace: bool,

    /// Pass-through client options.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SoapConfig {
    /// Create a configuration for the given WSDL location.
    pub fn new(wsdl: impl Into<String>) -> Self {
        Self {
            wsdl: wsdl.into(),
            ..Default::default()
        }
    }

    /// Parse a configuration from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Add a pass-through client option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Display name of the service: the endpoint override when set and
    /// non-empty, otherwise the WSDL location.
    pub fn host(&self) -> &str {
        match self.location.as_deref() {
            Some(location) if !location.is_empty() => location,
            _ => &self.wsdl,
        }
    }

    /// Check that the configuration can be handed to a client.
    pub fn validate(&self) -> Result<()> {
        if self.wsdl.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "wsdl is required to connect to a SOAP service".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-call options forwarded with every remote invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Endpoint to send this request to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Target namespace of the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// SOAPAction header value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soap_action: Option<String>,
}

impl CallOptions {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.uri.is_none() && self.soap_action.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_prefers_location() {
        let config = SoapConfig::new("https://example.com/svc?wsdl")
            .with_location("https://example.com/svc");
        assert_eq!(config.host(), "https://example.com/svc");
    }

    #[test]
    fn test_host_falls_back_to_wsdl() {
        let config = SoapConfig::new("https://example.com/svc?wsdl");
        assert_eq!(config.host(), "https://example.com/svc?wsdl");

        let config = config.with_location("");
        assert_eq!(config.host(), "https://example.com/svc?wsdl");
    }

    #[test]
    fn test_validate_requires_wsdl() {
        assert!(SoapConfig::new("svc.wsdl").validate().is_ok());
        assert!(matches!(
            SoapConfig::default().validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(SoapConfig::new("   ").validate().is_err());
    }

    #[test]
    fn test_from_json_collects_extra_options() {
        let config = SoapConfig::from_json(
            r#"{
                "wsdl": "https://example.com/svc?wsdl",
                "location": "https://example.com/svc",
                "debug": true,
                "trace": false,
                "login": "admin",
                "connection_timeout": 30
            }"#,
        )
        .unwrap();

        assert_eq!(config.wsdl, "https://example.com/svc?wsdl");
        assert_eq!(config.location.as_deref(), Some("https://example.com/svc"));
        assert!(config.debug);
        assert!(!config.trace);
        assert_eq!(config.options["login"], "admin");
        assert_eq!(config.options["connection_timeout"], 30);
        assert!(!config.options.contains_key("wsdl"));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        assert!(matches!(
            SoapConfig::from_json("{\"wsdl\": "),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_serialization_flattens_options() {
        let config = SoapConfig::new("svc.wsdl").with_option("encoding", "UTF-8");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["wsdl"], "svc.wsdl");
        assert_eq!(json["encoding"], "UTF-8");
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_call_options_is_empty() {
        let mut options = CallOptions::default();
        assert!(options.is_empty());
        options.soap_action = Some("urn:Search".to_string());
        assert!(!options.is_empty());
    }
}
