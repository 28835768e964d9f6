//! Named operations reachable through [`SoapSource::query`].
//!
//! The registry maps framework-facing operation names to handlers. Names it
//! does not know are forwarded as remote SOAP calls by the session.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::SoapSource;
use crate::types::{Error, RemoteCall, Result};

/// An operation invocable by name through [`SoapSource::query`].
#[async_trait]
pub trait Operation: Send + Sync {
    async fn invoke(&self, source: &mut SoapSource, params: Vec<Value>) -> Result<Option<Value>>;
}

/// Operations every session exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOperation {
    Connect,
    Disconnect,
    Close,
    Login,
    Logout,
    Call,
    BeforeCall,
    GetLastRequestHeaders,
    GetLastRequest,
    GetLastResponseHeaders,
    GetLastResponse,
}

impl BuiltinOperation {
    pub const ALL: [BuiltinOperation; 11] = [
        Self::Connect,
        Self::Disconnect,
        Self::Close,
        Self::Login,
        Self::Logout,
        Self::Call,
        Self::BeforeCall,
        Self::GetLastRequestHeaders,
        Self::GetLastRequest,
        Self::GetLastResponseHeaders,
        Self::GetLastResponse,
    ];

    /// Name under which the operation is registered.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Close => "close",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Call => "call",
            Self::BeforeCall => "beforeCall",
            Self::GetLastRequestHeaders => "getLastRequestHeaders",
            Self::GetLastRequest => "getLastRequest",
            Self::GetLastResponseHeaders => "getLastResponseHeaders",
            Self::GetLastResponse => "getLastResponse",
        }
    }
}

/// Split `params` into a remote method name and its arguments.
fn remote_call(operation: BuiltinOperation, mut params: Vec<Value>) -> Result<RemoteCall> {
    if params.is_empty() {
        return Err(Error::InvalidArguments {
            operation: operation.name().to_string(),
            reason: "missing remote method name".to_string(),
        });
    }
    match params.remove(0) {
        Value::String(method) => Ok(RemoteCall::new(method, params)),
        other => Err(Error::InvalidArguments {
            operation: operation.name().to_string(),
            reason: format!("remote method name must be a string, got {}", other),
        }),
    }
}

#[async_trait]
impl Operation for BuiltinOperation {
    async fn invoke(&self, source: &mut SoapSource, params: Vec<Value>) -> Result<Option<Value>> {
        let diagnostic = |text: Option<String>| -> Result<Option<Value>> {
            Ok(Some(text.map(Value::String).unwrap_or(Value::Null)))
        };

        match self {
            Self::Connect => Ok(Some(Value::Bool(source.connect().await?))),
            Self::Disconnect => Ok(Some(Value::Bool(source.disconnect().await?))),
            Self::Close => Ok(Some(Value::Bool(source.close().await?))),
            Self::Login => Ok(Some(Value::Bool(source.login().await?))),
            Self::Logout => Ok(Some(Value::Bool(source.logout().await?))),
            Self::Call => {
                let call = remote_call(*self, params)?;
                source.call(&call.method, call.args).await
            }
            Self::BeforeCall => {
                let mut call = remote_call(*self, params)?;
                source.before_call(&mut call);
                let mut mutated = Vec::with_capacity(call.args.len() + 1);
                mutated.push(Value::String(call.method));
                mutated.extend(call.args);
                Ok(Some(Value::Array(mutated)))
            }
            Self::GetLastRequestHeaders => diagnostic(source.last_request_headers()),
            Self::GetLastRequest => diagnostic(source.last_request()),
            Self::GetLastResponseHeaders => diagnostic(source.last_response_headers()),
            Self::GetLastResponse => diagnostic(source.last_response()),
        }
    }
}

/// Lookup table from operation name to handler.
#[derive(Clone)]
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Registry holding only the built-in operations.
    pub fn with_builtins() -> Self {
        let operations = BuiltinOperation::ALL
            .iter()
            .map(|op| (op.name().to_string(), Arc::new(*op) as Arc<dyn Operation>))
            .collect();
        Self { operations }
    }

    /// Add an operation, replacing any existing one with the same name.
    pub fn register(&mut self, name: impl Into<String>, operation: Arc<dyn Operation>) {
        self.operations.insert(name.into(), operation);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Operation>> {
        self.operations.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtins_are_registered() {
        let registry = OperationRegistry::with_builtins();
        for op in BuiltinOperation::ALL {
            assert!(registry.contains(op.name()), "missing {}", op.name());
        }
        assert!(!registry.contains("SomeRemoteOp"));
        assert_eq!(registry.names().len(), BuiltinOperation::ALL.len());
    }

    #[test]
    fn test_remote_call_splits_method_name() {
        let call = remote_call(BuiltinOperation::Call, vec![json!("Foo"), json!(1), json!(2)]).unwrap();
        assert_eq!(call.method, "Foo");
        assert_eq!(call.args, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_remote_call_rejects_missing_or_invalid_name() {
        assert!(matches!(
            remote_call(BuiltinOperation::Call, vec![]),
            Err(Error::InvalidArguments { .. })
        ));
        let err = remote_call(BuiltinOperation::BeforeCall, vec![json!(42)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments for beforeCall: remote method name must be a string, got 42"
        );
    }

    struct Echo;

    #[async_trait]
    impl Operation for Echo {
        async fn invoke(&self, _source: &mut SoapSource, params: Vec<Value>) -> Result<Option<Value>> {
            Ok(Some(Value::Array(params)))
        }
    }

    #[test]
    fn test_register_overrides_existing_name() {
        let mut registry = OperationRegistry::with_builtins();
        registry.register("getLastRequest", Arc::new(Echo));
        registry.register("echo", Arc::new(Echo));
        assert!(registry.contains("echo"));
        assert_eq!(registry.names().len(), BuiltinOperation::ALL.len() + 1);
    }
}
