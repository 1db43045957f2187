//! End-to-end tests over HTTP: status-code convention, health and 404.

mod common;

use std::sync::Arc;

use common::{dispatcher_over, sample_api};
use n8n_mcp_server::server::serve;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Running {
    base: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for Running {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn start() -> Running {
    let (dispatcher, _) = dispatcher_over(Arc::new(sample_api()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, Arc::new(dispatcher), async move {
        let _ = rx.await;
    }));
    Running {
        base: format!("http://{addr}"),
        shutdown: Some(tx),
    }
}

async fn post_raw(server: &Running, body: impl Into<reqwest::Body>) -> (StatusCode, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/mcp", server.base))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn post(server: &Running, body: Value) -> (StatusCode, Value) {
    post_raw(server, body.to_string()).await
}

#[tokio::test]
async fn successful_call_returns_200_envelope() {
    let server = start().await;
    let (status, body) = post(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": "2",
            "method": "n8n_list_workflows",
            "params": { "filter": "lead" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], "2");
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["workflows"][0]["name"], "Lead Import");
}

#[tokio::test]
async fn tools_list_over_http() {
    let server = start().await;
    let (status, body) = post(
        &server,
        json!({ "jsonrpc": "2.0", "id": "1", "method": "mcp.tools.list", "params": {} }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"n8n_get_workflow"));
    assert!(names.contains(&"n8n_execute_workflow"));
}

#[tokio::test]
async fn pre_dispatch_failures_return_400() {
    let server = start().await;

    let (status, body) = post_raw(&server, "{broken").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);

    let (status, body) = post(&server, json!({ "id": "x", "method": "m", "params": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], "x");
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn post_validation_errors_return_200() {
    let server = start().await;

    let (status, body) = post(&server, json!({ "id": 1, "method": "no.such.method" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32601);

    let (status, body) = post(
        &server,
        json!({ "id": 2, "method": "n8n_get_workflow", "params": { "id": "missing" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32601);
    assert!(body.get("result").is_none());

    let (status, body) = post(&server, json!({ "id": 3, "method": "n8n_get_execution" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let server = start().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{}/health", server.base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({ "status": "ok" }));

    let resp = client.get(format!("{}/nowhere", server.base)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({ "error": { "code": 404, "message": "Not found" } })
    );
}
