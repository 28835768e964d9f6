//! Error types for the SOAP data source.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A SOAP-layer fault raised by the client while connecting or calling.
///
/// Faults are the only failures the session absorbs: they are logged and
/// turned into a failed result. Every other [`Error`] variant propagates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapFault {
    /// Fault code, e.g. `soap:Client` or `soap:Server`.
    pub code: String,
    /// Human-readable fault string.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    /// Application-specific fault detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl SoapFault {
    /// Create a new fault with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            actor: None,
            detail: None,
        }
    }

    /// Attach fault detail.
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Attach the fault actor.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref detail) = self.detail {
            write!(f, " (detail: {})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for SoapFault {}

/// SOAP data source errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("SOAP fault: {0}")]
    Fault(#[from] SoapFault),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the fault if this error came from the SOAP layer.
    pub fn as_fault(&self) -> Option<&SoapFault> {
        match self {
            Error::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
