pub mod executions;
pub mod workflows;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::McpError;
use crate::protocol::Params;
use crate::upstream::WorkflowApi;

/// Future returned by a method handler. `'static` so the dispatcher can run
/// it on its own task.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, McpError>> + Send>>;

/// An asynchronous method handler: params in, JSON result or taxonomy error out.
pub type Handler = Arc<dyn Fn(Params) -> HandlerFuture + Send + Sync>;

/// Immutable mapping from method name to handler, built once at startup.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    handlers: BTreeMap<String, Handler>,
}

impl MethodRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, method: &str) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Collects handler groups into a [`MethodRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: BTreeMap<String, Handler>,
}

impl RegistryBuilder {
    /// Register one handler. A repeated name replaces the earlier entry.
    pub fn register<F, Fut>(mut self, method: impl Into<String>, f: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, McpError>> + Send + 'static,
    {
        let method = method.into();
        let handler: Handler = Arc::new(move |params: Params| -> HandlerFuture { Box::pin(f(params)) });
        if self.handlers.insert(method.clone(), handler).is_some() {
            tracing::warn!(method = %method, "duplicate method registration, last one wins");
        }
        self
    }

    /// Register a group of handlers produced by one of the `register`
    /// functions in the submodules.
    pub fn group(self, register: impl FnOnce(Self) -> Self) -> Self {
        register(self)
    }

    pub fn build(self) -> MethodRegistry {
        MethodRegistry {
            handlers: self.handlers,
        }
    }
}

/// Build the full registry over one upstream client.
pub fn build_registry(client: Arc<dyn WorkflowApi>) -> MethodRegistry {
    let workflow_client = Arc::clone(&client);
    MethodRegistry::builder()
        .group(|b| workflows::register(b, workflow_client))
        .group(|b| executions::register(b, client))
        .build()
}

/// Decode handler params into a typed struct. Type mismatches surface as
/// invalid params rather than internal errors.
pub(crate) fn decode_params<T: DeserializeOwned>(method: &str, params: Params) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| McpError::invalid_params(format!("Invalid params for {method}: {e}")))
}

/// Normalize a caller-supplied identifier. n8n hands out numeric execution
/// ids, so numbers are accepted alongside strings. Null and `""` count as
/// absent.
pub(crate) fn id_text(id: Option<Value>, what: &str) -> Result<Option<String>, McpError> {
    match id {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(McpError::invalid_params(format!(
            "{what} ID must be a string or a number"
        ))),
    }
}

/// Required identifier check shared by the get/execute handlers.
pub(crate) fn require_id(id: Option<Value>, what: &str) -> Result<String, McpError> {
    id_text(id, what)?.ok_or_else(|| McpError::invalid_params(format!("{what} ID is required")))
}
