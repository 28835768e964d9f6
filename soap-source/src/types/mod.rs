//! Type definitions for the SOAP data source.

pub mod config;
pub mod error;
pub mod headers;
pub mod hooks;

// Re-export commonly used types
pub use config::{CallOptions, SoapConfig};
pub use error::{Error, Result, SoapFault};
pub use headers::{OutputHeaders, SoapHeader};
pub use hooks::{DefaultHooks, RemoteCall, SessionHooks};
