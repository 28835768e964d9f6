//! Client traits for SOAP communication.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{CallOptions, OutputHeaders, Result, SoapConfig, SoapHeader};

/// Builds SOAP client handles.
///
/// Implementations read the service description and prepare the transport.
/// A problem reported by the SOAP layer must be returned as
/// [`Error::Fault`](crate::Error::Fault); the session absorbs those and
/// propagates everything else.
#[async_trait]
pub trait SoapConnector: Send + Sync {
    /// Create a client for the service described at `wsdl`.
    ///
    /// # Arguments
    /// * `wsdl` - Service description location
    /// * `config` - Full configuration, including the resolved `trace` flag
    async fn connect(&self, wsdl: &str, config: &SoapConfig) -> Result<Box<dyn SoapClient>>;
}

/// A connected SOAP client handle.
///
/// Envelope construction, (de)serialization and transport all live behind
/// this trait.
#[async_trait]
pub trait SoapClient: Send {
    /// Invoke a remote operation.
    ///
    /// # Arguments
    /// * `method` - Remote operation name
    /// * `args` - Positional arguments
    /// * `options` - Per-call options (endpoint, namespace, SOAPAction)
    /// * `input_headers` - Headers to attach to the request
    /// * `output_headers` - Filled with the headers of the response
    async fn soap_call(
        &mut self,
        method: &str,
        args: &[Value],
        options: &CallOptions,
        input_headers: &[SoapHeader],
        output_headers: &mut OutputHeaders,
    ) -> Result<Value>;

    /// Headers of the last request. Only retained when tracing.
    fn last_request_headers(&self) -> Option<String>;

    /// Body of the last request. Only retained when tracing.
    fn last_request(&self) -> Option<String>;

    /// Headers of the last response. Only retained when tracing.
    fn last_response_headers(&self) -> Option<String>;

    /// Body of the last response. Only retained when tracing.
    fn last_response(&self) -> Option<String>;
}
