//! Internal implementation details for the SOAP data source.

pub mod dispatch;
pub mod transport;

pub use dispatch::{BuiltinOperation, Operation, OperationRegistry};
