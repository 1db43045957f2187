//! Request/response state machine.
//!
//! ```text
//! Received -> Validated -> Routed -> {Succeeded | HandlerFailed} -> Responded
//! ```
//!
//! Every path ends in `Responded` with exactly one [`JsonRpcResponse`].
//! Parse and validation failures short-circuit straight to `Responded`.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::McpError;
use crate::handlers::MethodRegistry;
use crate::protocol::{read_id, validate_request, JsonRpcRequest, JsonRpcResponse, RpcId};
use crate::tools::{ToolCatalog, TOOLS_LIST_METHOD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Validated,
    Routed,
    Succeeded,
    HandlerFailed,
    Responded,
}

/// One state transition, reported to the [`DispatchObserver`].
#[derive(Debug, Clone, Copy)]
pub struct DispatchEvent<'a> {
    pub state: DispatchState,
    pub id: Option<&'a RpcId>,
    pub method: Option<&'a str>,
    pub error: Option<&'a McpError>,
}

/// Observability sink injected into the dispatcher.
pub trait DispatchObserver: Send + Sync {
    fn observe(&self, event: &DispatchEvent<'_>);
}

/// Production observer: forwards transitions to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn observe(&self, event: &DispatchEvent<'_>) {
        let id = event.id.map(ToString::to_string);
        let method = event.method.unwrap_or("-");
        match (event.state, event.error) {
            (DispatchState::Received, _) => info!("MCP request received"),
            (DispatchState::Validated, _) => debug!(?id, method, "MCP request validated"),
            (DispatchState::Routed, _) => info!(?id, method, "Processing MCP request"),
            (DispatchState::Succeeded, _) => info!(?id, method, "MCP request successful"),
            (DispatchState::HandlerFailed, Some(err)) => error!(
                ?id,
                method,
                kind = err.kind(),
                code = err.code(),
                error_message = err.message(),
                data = ?err.data(),
                "Error executing method"
            ),
            (DispatchState::HandlerFailed, None) => error!(?id, method, "Error executing method"),
            (DispatchState::Responded, Some(err)) => warn!(
                ?id,
                method,
                kind = err.kind(),
                code = err.code(),
                error_message = err.message(),
                "MCP request answered with error"
            ),
            (DispatchState::Responded, None) => debug!(?id, method, "MCP response sent"),
        }
    }
}

/// Terminal result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub response: JsonRpcResponse,
    /// True when the request never got past parsing/validation.
    pub pre_dispatch: bool,
}

/// Validates, routes and invokes; never fails and never panics outward.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    tools: Arc<ToolCatalog>,
    observer: Arc<dyn DispatchObserver>,
}

impl Dispatcher {
    pub fn new(registry: Arc<MethodRegistry>, tools: Arc<ToolCatalog>) -> Self {
        Self {
            registry,
            tools,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Entry point for raw transport bodies.
    pub async fn dispatch_bytes(&self, body: &[u8]) -> DispatchOutcome {
        self.emit(DispatchState::Received, None, None, None);
        match serde_json::from_slice::<Value>(body) {
            Ok(raw) => self.dispatch_received(&raw).await,
            Err(e) => self.reject(None, None, McpError::parse(format!("Parse error: {e}"))),
        }
    }

    /// Entry point for an already-decoded JSON body.
    pub async fn dispatch_value(&self, raw: &Value) -> DispatchOutcome {
        self.emit(DispatchState::Received, None, None, None);
        self.dispatch_received(raw).await
    }

    async fn dispatch_received(&self, raw: &Value) -> DispatchOutcome {
        match validate_request(raw) {
            Ok(req) => DispatchOutcome {
                response: self.dispatch(req).await,
                pre_dispatch: false,
            },
            Err(err) => {
                let method = raw.get("method").and_then(Value::as_str);
                self.reject(read_id(raw), method, err)
            }
        }
    }

    /// Route and invoke a validated request.
    pub async fn dispatch(&self, req: JsonRpcRequest) -> JsonRpcResponse {
        let JsonRpcRequest { id, method, params, .. } = req;
        let id_ref = id.as_ref();
        let method_ref = Some(method.as_str());
        self.emit(DispatchState::Validated, id_ref, method_ref, None);

        if method == TOOLS_LIST_METHOD {
            self.emit(DispatchState::Routed, id_ref, method_ref, None);
            self.emit(DispatchState::Succeeded, id_ref, method_ref, None);
            return self.respond(id, method_ref, Ok(self.tools.list_result()));
        }

        let Some(handler) = self.registry.get(&method) else {
            let err = McpError::method_not_found(&method);
            return self.respond(id, method_ref, Err(err));
        };

        self.emit(DispatchState::Routed, id_ref, method_ref, None);

        // Own task so a panicking handler still yields an envelope.
        let outcome = match tokio::spawn((handler.as_ref())(params)).await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(McpError::internal(panic_message(
                join_err.into_panic(),
            ))),
            Err(join_err) => Err(McpError::internal(format!("Handler task failed: {join_err}"))),
        };

        match &outcome {
            Ok(_) => self.emit(DispatchState::Succeeded, id_ref, method_ref, None),
            Err(err) => self.emit(DispatchState::HandlerFailed, id_ref, method_ref, Some(err)),
        }

        self.respond(id, method_ref, outcome)
    }

    fn reject(&self, id: Option<RpcId>, method: Option<&str>, err: McpError) -> DispatchOutcome {
        DispatchOutcome {
            response: self.respond(id, method, Err(err)),
            pre_dispatch: true,
        }
    }

    fn respond(
        &self,
        id: Option<RpcId>,
        method: Option<&str>,
        outcome: Result<Value, McpError>,
    ) -> JsonRpcResponse {
        match outcome {
            Ok(result) => {
                self.emit(DispatchState::Responded, id.as_ref(), method, None);
                JsonRpcResponse::success(id, result)
            }
            Err(err) => {
                self.emit(DispatchState::Responded, id.as_ref(), method, Some(&err));
                JsonRpcResponse::error(id, (&err).into())
            }
        }
    }

    fn emit(
        &self,
        state: DispatchState,
        id: Option<&RpcId>,
        method: Option<&str>,
        error: Option<&McpError>,
    ) {
        self.observer.observe(&DispatchEvent {
            state,
            id,
            method,
            error,
        });
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Handler panicked".to_string()
    }
}
