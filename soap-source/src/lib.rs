//! SOAP XML API data source.
//!
//! This crate lets a model layer treat a remote SOAP/XML web service as a
//! queryable data source. It manages the lifecycle of a SOAP session
//! (connect, log in, call, log out, disconnect), routes named queries either
//! to local operations or to remote SOAP methods, and exposes the last
//! request and response for diagnostics.
//!
//! Envelope construction, WSDL parsing and transport are not implemented
//! here: they sit behind the [`SoapConnector`] and [`SoapClient`] traits.
//! An in-memory implementation ([`FakeConnector`]) is provided for tests.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use soap_source::{FakeConnector, SoapConfig, SoapSource};
//!
//! # async fn example() -> soap_source::Result<()> {
//! let (connector, controller) = FakeConnector::build();
//! controller.respond("GetQuote", json!({"symbol": "ACME", "price": 12.5}));
//!
//! let mut source = SoapSource::new(SoapConfig::new("quotes.wsdl"), connector);
//! let quote = source.query("GetQuote", vec![json!("ACME")], &()).await?;
//! assert_eq!(quote.unwrap()["price"], 12.5);
//!
//! source.disconnect().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`types`] - Configuration, errors, headers and hooks
//! - [`internal`] - Client traits, fake client and operation dispatch
//! - [`client`] - The [`SoapSource`] session

pub mod types;
pub mod internal;
pub mod client;

// Re-export all public types at the crate root for convenience
pub use types::*;
pub use internal::transport::{
    FakeConnector, FakeController, FakeSoapClient, SentCall, SoapClient, SoapConnector,
};
pub use internal::{BuiltinOperation, Operation, OperationRegistry};
pub use client::SoapSource;
