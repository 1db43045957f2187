//! Boundary to the n8n REST API.
//!
//! Handlers only see the [`WorkflowApi`] trait; [`client::N8nClient`] is the
//! production implementation and tests substitute in-memory doubles.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::McpError;

pub use client::N8nClient;

/// Paged list wrapper returned by the n8n list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(rename = "nextCursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data, next_cursor: None }
    }
}

/// n8n workflow record.
///
/// Only the fields used for projections are typed; everything else the
/// upstream sends is kept in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// n8n execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: Value,
    #[serde(rename = "workflowId", default)]
    pub workflow_id: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "startedAt", default)]
    pub started_at: Option<String>,
    #[serde(rename = "finishedAt", default)]
    pub finished_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for listing executions. `None` fields are not sent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionQuery {
    pub workflow_id: Option<String>,
    pub limit: Option<u64>,
}

impl ExecutionQuery {
    /// Query-string pairs in a stable order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(workflow_id) = &self.workflow_id {
            pairs.push(("workflowId", workflow_id.clone()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// The five upstream operations the method handlers delegate to.
///
/// Implementations report failures as taxonomy errors: a 404 as
/// [`McpError::NotFound`], a 400 as [`McpError::InvalidParams`], any other
/// non-2xx as [`McpError::UpstreamApi`].
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn list_workflows(&self) -> Result<ListResponse<Workflow>, McpError>;

    async fn get_workflow(&self, id: &str) -> Result<Workflow, McpError>;

    async fn execute_workflow(&self, id: &str, data: Value) -> Result<Execution, McpError>;

    async fn list_executions(&self, query: &ExecutionQuery)
        -> Result<ListResponse<Execution>, McpError>;

    async fn get_execution(&self, id: &str) -> Result<Execution, McpError>;
}
