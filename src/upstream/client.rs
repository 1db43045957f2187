use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use super::{Execution, ExecutionQuery, ListResponse, Workflow, WorkflowApi};
use crate::error::McpError;

/// Header n8n reads the API key from.
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// reqwest-backed client for the n8n public REST API.
#[derive(Debug, Clone)]
pub struct N8nClient {
    base_url: Url,
    http: Client,
}

impl N8nClient {
    /// Build a client with the API key and JSON content type preset on
    /// every request.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, McpError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| McpError::internal(format!("Invalid n8n base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(McpError::internal(format!(
                "Invalid n8n base URL '{base_url}': cannot be a base"
            )));
        }

        let mut headers = header::HeaderMap::new();
        let key = header::HeaderValue::from_str(api_key)
            .map_err(|e| McpError::internal(format!("Invalid n8n API key header: {e}")))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| McpError::internal(format!("Failed to build HTTP client: {e}")))?;

        info!(base_url = %base_url, "n8n API client initialized");
        Ok(Self { base_url, http })
    }

    /// Resolve an API-relative path. Segments are percent-encoded, so ids
    /// cannot escape their path position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, McpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| McpError::internal("n8n base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<T, McpError> {
        debug!(%method, %url, "calling n8n API");
        let mut request = self.http.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(%method, %url, error = %e, "n8n API request failed");
            McpError::internal(format!("n8n API request failed: {e}"))
        })?;

        decode(response, &method, &url).await
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    method: &Method,
    url: &Url,
) -> Result<T, McpError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        McpError::internal(format!("Failed to read n8n API response: {e}"))
    })?;

    if !status.is_success() {
        let err = map_status(status, &body, url.as_str());
        error!(%method, %url, status = status.as_u16(), error_message = err.message(), "n8n API error");
        return Err(err);
    }

    serde_json::from_str(&body).map_err(|e| {
        McpError::internal(format!("Unexpected n8n API response from {url}: {e}"))
    })
}

/// Map a non-2xx upstream response onto the taxonomy.
///
/// The message is the upstream body's `message` field when there is one,
/// otherwise the status line.
pub fn map_status(status: StatusCode, body: &str, url: &str) -> McpError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "Request failed with status code {}{}",
                status.as_u16(),
                status
                    .canonical_reason()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default()
            )
        });

    match status {
        StatusCode::NOT_FOUND => McpError::not_found(message),
        StatusCode::BAD_REQUEST => McpError::invalid_params(message),
        _ => McpError::upstream_api(message).with_data(json!({
            "status": status.as_u16(),
            "url": url,
        })),
    }
}

#[async_trait]
impl WorkflowApi for N8nClient {
    async fn list_workflows(&self) -> Result<ListResponse<Workflow>, McpError> {
        let url = self.endpoint(&["workflows"])?;
        let list: ListResponse<Workflow> = self.send(Method::GET, url, &[], None).await?;
        debug!(count = list.data.len(), "retrieved workflows");
        Ok(list)
    }

    async fn get_workflow(&self, id: &str) -> Result<Workflow, McpError> {
        let url = self.endpoint(&["workflows", id])?;
        self.send(Method::GET, url, &[], None).await
    }

    async fn execute_workflow(&self, id: &str, data: Value) -> Result<Execution, McpError> {
        let url = self.endpoint(&["workflows", id, "execute"])?;
        let payload = json!({
            "workflowData": { "id": id },
            "runData": { "data": data },
        });
        self.send(Method::POST, url, &[], Some(&payload)).await
    }

    async fn list_executions(
        &self,
        query: &ExecutionQuery,
    ) -> Result<ListResponse<Execution>, McpError> {
        let url = self.endpoint(&["executions"])?;
        let list: ListResponse<Execution> =
            self.send(Method::GET, url, &query.pairs(), None).await?;
        debug!(count = list.data.len(), "retrieved executions");
        Ok(list)
    }

    async fn get_execution(&self, id: &str) -> Result<Execution, McpError> {
        let url = self.endpoint(&["executions", id])?;
        self.send(Method::GET, url, &[], None).await
    }
}
