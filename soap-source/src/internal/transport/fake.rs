//! In-memory SOAP client for testing sessions and hooks without a service.
//!
//! # Example
//!
//! ```rust
//! # async fn example() -> soap_source::Result<()> {
//! use serde_json::json;
//! use soap_source::{FakeConnector, SoapConfig, SoapSource};
//!
//! let (connector, controller) = FakeConnector::build();
//! controller.respond("Add", json!(3));
//!
//! let mut source = SoapSource::new(SoapConfig::new("calc.wsdl"), connector);
//! let result = source.call("Add", vec![json!(1), json!(2)]).await?;
//!
//! assert_eq!(result, Some(json!(3)));
//! assert_eq!(controller.sent()[0].args, vec![json!(1), json!(2)]);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::base::{SoapClient, SoapConnector};
use crate::types::{
    CallOptions, Error, OutputHeaders, Result, SoapConfig, SoapFault, SoapHeader,
};

/// Scripted outcome of a remote call.
#[derive(Debug, Clone)]
enum FakeReply {
    Value(Value),
    Fault(SoapFault),
    Error(String),
}

/// A call as received by the fake client.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCall {
    pub method: String,
    pub args: Vec<Value>,
    pub options: CallOptions,
    pub input_headers: Vec<SoapHeader>,
}

#[derive(Default)]
struct FakeState {
    connect_failure: Option<FakeReply>,
    replies: HashMap<String, FakeReply>,
    response_headers: OutputHeaders,
    configs: Vec<SoapConfig>,
    sent: Vec<SentCall>,
    clients_dropped: usize,
}

#[derive(Clone, Default)]
struct SharedState(Arc<Mutex<FakeState>>);

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connector producing [`FakeSoapClient`] handles.
#[derive(Clone)]
pub struct FakeConnector {
    state: SharedState,
}

impl FakeConnector {
    /// Build a connector and the controller that scripts and inspects it.
    pub fn build() -> (FakeConnector, FakeController) {
        let state = SharedState::default();
        (
            FakeConnector {
                state: state.clone(),
            },
            FakeController { state },
        )
    }
}

#[async_trait]
impl SoapConnector for FakeConnector {
    async fn connect(&self, _wsdl: &str, config: &SoapConfig) -> Result<Box<dyn SoapClient>> {
        let mut state = self.state.lock();
        match state.connect_failure.clone() {
            Some(FakeReply::Fault(fault)) => return Err(Error::Fault(fault)),
            Some(FakeReply::Error(message)) => return Err(Error::Transport(message)),
            _ => {}
        }
        state.configs.push(config.clone());
        drop(state);

        Ok(Box::new(FakeSoapClient {
            state: self.state.clone(),
            trace: config.trace,
            location: config.host().to_string(),
            last_request_headers: None,
            last_request: None,
            last_response_headers: None,
            last_response: None,
        }))
    }
}

/// Handle for scripting replies and inspecting what the fake received.
#[derive(Clone)]
pub struct FakeController {
    state: SharedState,
}

impl FakeController {
    /// Reply to `method` with `value`. Unscripted methods reply with `null`.
    pub fn respond(&self, method: &str, value: Value) {
        self.state
            .lock()
            .replies
            .insert(method.to_string(), FakeReply::Value(value));
    }

    /// Raise `fault` whenever `method` is called.
    pub fn fault(&self, method: &str, fault: SoapFault) {
        self.state
            .lock()
            .replies
            .insert(method.to_string(), FakeReply::Fault(fault));
    }

    /// Fail `method` with a non-fault transport error.
    pub fn transport_error(&self, method: &str, message: &str) {
        self.state
            .lock()
            .replies
            .insert(method.to_string(), FakeReply::Error(message.to_string()));
    }

    /// Raise `fault` while building the next clients.
    pub fn fail_connect(&self, fault: SoapFault) {
        self.state.lock().connect_failure = Some(FakeReply::Fault(fault));
    }

    /// Fail client construction with a non-fault error.
    pub fn fail_connect_with_error(&self, message: &str) {
        self.state.lock().connect_failure = Some(FakeReply::Error(message.to_string()));
    }

    pub fn clear_connect_failure(&self) {
        self.state.lock().connect_failure = None;
    }

    /// Headers the service returns with every response.
    pub fn set_response_headers(&self, headers: OutputHeaders) {
        self.state.lock().response_headers = headers;
    }

    /// Every call received so far, in order.
    pub fn sent(&self) -> Vec<SentCall> {
        self.state.lock().sent.clone()
    }

    /// Configurations the clients were built with, in order.
    pub fn configs(&self) -> Vec<SoapConfig> {
        self.state.lock().configs.clone()
    }

    pub fn clients_built(&self) -> usize {
        self.state.lock().configs.len()
    }

    pub fn clients_dropped(&self) -> usize {
        self.state.lock().clients_dropped
    }
}

/// Client handle produced by [`FakeConnector`].
pub struct FakeSoapClient {
    state: SharedState,
    trace: bool,
    location: String,
    last_request_headers: Option<String>,
    last_request: Option<String>,
    last_response_headers: Option<String>,
    last_response: Option<String>,
}

impl FakeSoapClient {
    fn render_request(method: &str, args: &[Value]) -> String {
        let body = args
            .iter()
            .map(|arg| format!("<arg>{}</arg>", arg))
            .collect::<Vec<_>>()
            .join("");
        format!("<{method}>{body}</{method}>")
    }

    fn render_headers(start_line: &str, headers: &[(String, String)]) -> String {
        std::iter::once(start_line.to_string())
            .chain(headers.iter().map(|(name, value)| format!("{}: {}", name, value)))
            .collect::<Vec<_>>()
            .join("\r\n")
    }
}

#[async_trait]
impl SoapClient for FakeSoapClient {
    async fn soap_call(
        &mut self,
        method: &str,
        args: &[Value],
        options: &CallOptions,
        input_headers: &[SoapHeader],
        output_headers: &mut OutputHeaders,
    ) -> Result<Value> {
        let (reply, response_headers) = {
            let mut state = self.state.lock();
            state.sent.push(SentCall {
                method: method.to_string(),
                args: args.to_vec(),
                options: options.clone(),
                input_headers: input_headers.to_vec(),
            });
            let reply = state
                .replies
                .get(method)
                .cloned()
                .unwrap_or(FakeReply::Value(Value::Null));
            (reply, state.response_headers.clone())
        };

        if self.trace {
            let location = options.location.as_deref().unwrap_or(&self.location);
            let action = options.soap_action.as_deref().unwrap_or(method);
            self.last_request_headers = Some(Self::render_headers(
                &format!("POST {} HTTP/1.1", location),
                &[
                    ("Content-Type".to_string(), "text/xml; charset=utf-8".to_string()),
                    ("SOAPAction".to_string(), format!("\"{}\"", action)),
                ],
            ));
            self.last_request = Some(Self::render_request(method, args));
        }

        let result = match reply {
            FakeReply::Value(value) => {
                output_headers.clear();
                output_headers.extend(response_headers);
                if self.trace {
                    self.last_response = Some(format!("<{method}Response>{value}</{method}Response>"));
                }
                Ok(value)
            }
            FakeReply::Fault(fault) => {
                if self.trace {
                    self.last_response = Some(format!(
                        "<Fault><faultcode>{}</faultcode><faultstring>{}</faultstring></Fault>",
                        fault.code, fault.message
                    ));
                }
                Err(Error::Fault(fault))
            }
            FakeReply::Error(message) => return Err(Error::Transport(message)),
        };

        if self.trace {
            let status = if result.is_ok() { "200 OK" } else { "500 Internal Server Error" };
            self.last_response_headers = Some(Self::render_headers(
                &format!("HTTP/1.1 {}", status),
                &[("Content-Type".to_string(), "text/xml; charset=utf-8".to_string())],
            ));
        }

        result
    }

    fn last_request_headers(&self) -> Option<String> {
        self.last_request_headers.clone()
    }

    fn last_request(&self) -> Option<String> {
        self.last_request.clone()
    }

    fn last_response_headers(&self) -> Option<String> {
        self.last_response_headers.clone()
    }

    fn last_response(&self) -> Option<String> {
        self.last_response.clone()
    }
}

impl Drop for FakeSoapClient {
    fn drop(&mut self) {
        self.state.lock().clients_dropped += 1;
    }
}
