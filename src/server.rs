//! HTTP transport: `POST /mcp`, `GET /health`, and a JSON 404 for anything else.
//!
//! Status codes: requests rejected before dispatch (unparseable body,
//! invalid envelope) get 400; every response produced after validation,
//! including method-not-found and handler errors, is 200 so the JSON-RPC
//! error payload is the single source of truth.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::McpError;
use crate::protocol::JsonRpcResponse;

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the router around a dispatcher.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(dispatcher)
}

async fn handle_mcp(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let status = rejection.status();
            let err = McpError::parse(format!("Parse error: {}", rejection.body_text()));
            warn!(status = status.as_u16(), error = %err, "failed to read MCP request body");
            return (status, Json(JsonRpcResponse::error(None, err.into()))).into_response();
        }
    };

    let outcome = dispatcher.dispatch_bytes(&body).await;
    let status = if outcome.pre_dispatch {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(outcome.response)).into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    warn!(%uri, "route not found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "code": 404, "message": "Not found" } })),
    )
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    if let Some(addr) = addr {
        info!("Server running at http://{addr}");
    }
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        () = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
