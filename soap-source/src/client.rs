//! SOAP data source session.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::internal::transport::{SoapClient, SoapConnector};
use crate::internal::{Operation, OperationRegistry};
use crate::types::{
    CallOptions, DefaultHooks, Error, OutputHeaders, RemoteCall, Result, SessionHooks, SoapConfig,
    SoapHeader,
};

/// Session adapter exposing a SOAP service as a queryable data source.
///
/// The session owns at most one client handle. It is created lazily by
/// [`connect`](Self::connect) (or by the first [`call`](Self::call)) and
/// released by [`disconnect`](Self::disconnect), after which the session is
/// pristine and can connect again.
///
/// SOAP faults raised while connecting or calling are logged and turned into
/// a failed result (`Ok(false)` / `Ok(None)`). Every other error propagates.
///
/// # Example
///
/// ```rust,no_run
/// use serde_json::json;
/// use soap_source::{FakeConnector, SoapConfig, SoapSource};
///
/// # async fn example() -> soap_source::Result<()> {
/// let (connector, _controller) = FakeConnector::build();
/// let config = SoapConfig::new("https://api.example.com/service?wsdl").with_debug(true);
/// let mut source = SoapSource::new(config, connector);
///
/// if let Some(result) = source.call("Search", vec![json!("rust")]).await? {
///     println!("{}", result);
/// }
/// println!("{:?}", source.last_request());
///
/// source.disconnect().await?;
/// # Ok(())
/// # }
/// ```
pub struct SoapSource {
    id: Uuid,
    config: SoapConfig,
    connector: Arc<dyn SoapConnector>,
    hooks: Arc<dyn SessionHooks>,
    operations: OperationRegistry,

    // Session state, reset on disconnect
    client: Option<Box<dyn SoapClient>>,
    call_options: CallOptions,
    input_headers: Vec<SoapHeader>,
    output_headers: OutputHeaders,
    host: Option<String>,
}

impl SoapSource {
    /// Create a disconnected session.
    ///
    /// # Arguments
    /// * `config` - Connection configuration
    /// * `connector` - Factory for SOAP client handles
    pub fn new(config: SoapConfig, connector: impl SoapConnector + 'static) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            connector: Arc::new(connector),
            hooks: Arc::new(DefaultHooks),
            operations: OperationRegistry::with_builtins(),
            client: None,
            call_options: CallOptions::default(),
            input_headers: Vec::new(),
            output_headers: OutputHeaders::new(),
            host: None,
        }
    }

    /// Replace the default hooks.
    pub fn with_hooks(mut self, hooks: impl SessionHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Make `operation` reachable through [`query`](Self::query) as `name`.
    ///
    /// Registering a built-in name replaces the built-in.
    pub fn register_operation(&mut self, name: impl Into<String>, operation: impl Operation + 'static) {
        self.operations.register(name, Arc::new(operation));
    }

    /// Create the client handle and log in.
    ///
    /// Returns the current state without doing anything when already
    /// connected. Otherwise returns the result of the login hook, or `false`
    /// when the SOAP layer raised a fault.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, or if the connector
    /// or login hook fail with anything other than a SOAP fault.
    pub async fn connect(&mut self) -> Result<bool> {
        if self.is_connected() {
            return Ok(true);
        }

        self.config.validate()?;
        let host = self.config.host().to_string();
        self.host = Some(host.clone());
        self.config.trace = self.config.debug;

        match self.connector.connect(&self.config.wsdl, &self.config).await {
            Ok(client) => {
                debug!(session = %self.id, host = %host, "Connection to SOAP XML API {} successful.", host);
                self.client = Some(client);
                self.login().await
            }
            Err(Error::Fault(fault)) => {
                error!(
                    session = %self.id,
                    host = %host,
                    fault = %fault,
                    "Connection to SOAP XML API {} failed: {}",
                    host,
                    fault
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Run the login hook.
    pub async fn login(&mut self) -> Result<bool> {
        let hooks = Arc::clone(&self.hooks);
        hooks.login(self).await
    }

    /// Log out and release the client handle.
    ///
    /// Returns `true` without doing anything when not connected. Otherwise
    /// the session is always torn down and the logout hook's result is
    /// returned.
    pub async fn disconnect(&mut self) -> Result<bool> {
        if !self.is_connected() {
            return Ok(true);
        }

        let success = self.logout().await;
        debug!(
            session = %self.id,
            host = self.host.as_deref().unwrap_or_default(),
            "Disconnect of SOAP XML API {} successful.",
            self.host.as_deref().unwrap_or_default()
        );
        self.reset();
        success
    }

    /// Run the logout hook.
    pub async fn logout(&mut self) -> Result<bool> {
        let hooks = Arc::clone(&self.hooks);
        hooks.logout(self).await
    }

    /// Alias for [`disconnect`](Self::disconnect).
    pub async fn close(&mut self) -> Result<bool> {
        self.disconnect().await
    }

    /// Invoke a remote SOAP operation.
    ///
    /// Connects first if needed. Returns `Ok(None)` when the connection
    /// could not be established or the call raised a SOAP fault; a `None`
    /// result is therefore indistinguishable from a failed call.
    ///
    /// # Arguments
    /// * `method` - Remote operation name
    /// * `args` - Positional arguments, passed through `before_call` first
    pub async fn call(&mut self, method: &str, args: Vec<Value>) -> Result<Option<Value>> {
        if !self.connect().await? {
            return Ok(None);
        }

        let mut call = RemoteCall::new(method, args);
        self.before_call(&mut call);

        let Some(client) = self.client.as_mut() else {
            return Ok(None);
        };

        let result = client
            .soap_call(
                &call.method,
                &call.args,
                &self.call_options,
                &self.input_headers,
                &mut self.output_headers,
            )
            .await;

        match result {
            Ok(value) => Ok(Some(value)),
            Err(Error::Fault(fault)) => {
                let args = render_args(&call.args);
                let host = self.host.as_deref().unwrap_or_default();
                error!(
                    session = %self.id,
                    method = %call.method,
                    args = %args,
                    host = %host,
                    fault = %fault,
                    "SOAP XML API call {}({}) to {} failed: {}",
                    call.method,
                    args,
                    host,
                    fault
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply the `before_call` hook to a pending call.
    pub fn before_call(&self, call: &mut RemoteCall) {
        self.hooks.before_call(call);
    }

    /// Invoke an operation by name on behalf of a model.
    ///
    /// Registered operations (see [`register_operation`](Self::register_operation))
    /// receive `params` as their arguments. Any other name is a remote SOAP
    /// operation and is forwarded to [`call`](Self::call).
    pub async fn query<M: ?Sized + Sync>(
        &mut self,
        method: &str,
        params: Vec<Value>,
        _model: &M,
    ) -> Result<Option<Value>> {
        match self.operations.get(method) {
            Some(operation) => operation.invoke(self, params).await,
            None => self.call(method, params).await,
        }
    }

    /// Headers of the last request, when connected with tracing.
    pub fn last_request_headers(&self) -> Option<String> {
        self.client.as_ref().and_then(|client| client.last_request_headers())
    }

    /// XML of the last request, when connected with tracing.
    pub fn last_request(&self) -> Option<String> {
        self.client.as_ref().and_then(|client| client.last_request())
    }

    /// Headers of the last response, when connected with tracing.
    pub fn last_response_headers(&self) -> Option<String> {
        self.client.as_ref().and_then(|client| client.last_response_headers())
    }

    /// XML of the last response, when connected with tracing.
    pub fn last_response(&self) -> Option<String> {
        self.client.as_ref().and_then(|client| client.last_response())
    }

    /// Run `body` against this session and disconnect afterwards.
    ///
    /// The session is disconnected (logout hook included) whether `body`
    /// succeeds, fails or panics. A panic is resumed after cleanup. An error
    /// from `body` takes precedence over an error from disconnecting.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use serde_json::json;
    /// # use soap_source::{FakeConnector, SoapConfig, SoapSource};
    /// # async fn example() -> soap_source::Result<()> {
    /// # let (connector, _controller) = FakeConnector::build();
    /// let source = SoapSource::new(SoapConfig::new("svc.wsdl"), connector);
    /// let result = source
    ///     .scoped(|source| Box::pin(async move { source.call("Ping", vec![]).await }))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<T, F>(mut self, body: F) -> Result<T>
    where
        T: Send,
        F: for<'a> FnOnce(&'a mut SoapSource) -> BoxFuture<'a, Result<T>> + Send,
    {
        let outcome = AssertUnwindSafe(body(&mut self)).catch_unwind().await;
        let disconnected = self.disconnect().await;

        match outcome {
            Ok(result) => {
                let value = result?;
                disconnected?;
                Ok(value)
            }
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Whether a client handle is held.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Display name of the service, set while connecting.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SoapConfig {
        &self.config
    }

    pub fn call_options(&self) -> &CallOptions {
        &self.call_options
    }

    pub fn call_options_mut(&mut self) -> &mut CallOptions {
        &mut self.call_options
    }

    pub fn input_headers(&self) -> &[SoapHeader] {
        &self.input_headers
    }

    /// Headers attached to every subsequent call until disconnect.
    pub fn input_headers_mut(&mut self) -> &mut Vec<SoapHeader> {
        &mut self.input_headers
    }

    /// Headers the service returned with the last response.
    pub fn output_headers(&self) -> &OutputHeaders {
        &self.output_headers
    }

    /// Whether `name` is dispatched locally by [`query`](Self::query).
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains(name)
    }

    fn reset(&mut self) {
        self.client = None;
        self.call_options = CallOptions::default();
        self.input_headers.clear();
        self.output_headers.clear();
        self.host = None;
    }
}

fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// Async logout cannot run here; the handle is still released.
impl Drop for SoapSource {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!(
                session = %self.id,
                host = self.host.as_deref().unwrap_or_default(),
                "SoapSource dropped without calling disconnect(); releasing client without logout"
            );
            self.reset();
        }
    }
}
