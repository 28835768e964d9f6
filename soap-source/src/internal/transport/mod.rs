//! Client implementations for the SOAP data source.

mod base;
pub mod fake;

pub use base::{SoapClient, SoapConnector};
pub use fake::{FakeConnector, FakeController, FakeSoapClient, SentCall};
