//! Session hooks for service-specific authentication and request shaping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::SoapSource;
use crate::types::error::Result;

/// A remote invocation about to be transmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    /// Remote operation name.
    pub method: String,
    /// Positional arguments, marshaled by the SOAP client.
    pub args: Vec<Value>,
}

impl RemoteCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Hooks run by [`SoapSource`] around its lifecycle.
///
/// Every method has a default, so implementors only override what their
/// service needs. `login` and `logout` receive the session itself and may
/// issue remote calls or set input headers through it.
///
/// # Example
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use serde_json::json;
/// use soap_source::{Result, SessionHooks, SoapHeader, SoapSource};
///
/// struct TokenAuth {
///     user: String,
///     password: String,
/// }
///
/// #[async_trait]
/// impl SessionHooks for TokenAuth {
///     async fn login(&self, source: &mut SoapSource) -> Result<bool> {
///         let token = source
///             .call("Login", vec![json!(self.user), json!(self.password)])
///             .await?;
///         match token {
///             Some(token) => {
///                 source
///                     .input_headers_mut()
///                     .push(SoapHeader::new("urn:auth", "Session", token));
///                 Ok(true)
///             }
///             None => Ok(false),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHooks: Send + Sync {
    /// Authenticate after the client handle has been created.
    async fn login(&self, _source: &mut SoapSource) -> Result<bool> {
        Ok(true)
    }

    /// Release the remote session before the client handle is dropped.
    async fn logout(&self, _source: &mut SoapSource) -> Result<bool> {
        Ok(true)
    }

    /// Mutate a call before it is transmitted.
    fn before_call(&self, _call: &mut RemoteCall) {}
}

/// Hooks with every default: login and logout succeed, calls are untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl SessionHooks for DefaultHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_before_call_is_identity() {
        let mut call = RemoteCall::new("Search", vec![serde_json::json!("term")]);
        let original = call.clone();
        DefaultHooks.before_call(&mut call);
        assert_eq!(call, original);
    }
}
