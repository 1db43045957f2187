use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{decode_params, require_id, RegistryBuilder};
use crate::error::McpError;
use crate::protocol::Params;
use crate::upstream::{Workflow, WorkflowApi};

pub const LIST_WORKFLOWS: &str = "n8n_list_workflows";
pub const GET_WORKFLOW: &str = "n8n_get_workflow";
pub const EXECUTE_WORKFLOW: &str = "n8n_execute_workflow";

#[derive(Debug, Default, Deserialize)]
pub struct ListWorkflowsParams {
    #[serde(default)]
    pub filter: Option<String>,
}

/// `id` wins over the `workflowId` spelling when both are sent.
#[derive(Debug, Deserialize)]
pub struct GetWorkflowParams {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "workflowId")]
    pub workflow_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteWorkflowParams {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "workflowId")]
    pub workflow_id: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Public projection of a workflow; upstream-internal fields stay behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowSummary {
    pub id: Value,
    pub name: String,
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

impl From<Workflow> for WorkflowSummary {
    fn from(wf: Workflow) -> Self {
        Self {
            id: wf.id,
            name: wf.name,
            active: wf.active,
            created_at: wf.created_at,
            updated_at: wf.updated_at,
        }
    }
}

pub fn register(builder: RegistryBuilder, client: Arc<dyn WorkflowApi>) -> RegistryBuilder {
    let list_client = Arc::clone(&client);
    let get_client = Arc::clone(&client);
    builder
        .register(LIST_WORKFLOWS, move |params| {
            list_workflows(Arc::clone(&list_client), params)
        })
        .register(GET_WORKFLOW, move |params| {
            get_workflow(Arc::clone(&get_client), params)
        })
        .register(EXECUTE_WORKFLOW, move |params| {
            execute_workflow(Arc::clone(&client), params)
        })
}

/// List workflows, optionally keeping only names that contain `filter`
/// (case-insensitive). Filtering happens after the fetch.
pub async fn list_workflows(client: Arc<dyn WorkflowApi>, params: Params) -> Result<Value, McpError> {
    let params: ListWorkflowsParams = decode_params(LIST_WORKFLOWS, params)?;
    debug!(?params, "handling {LIST_WORKFLOWS}");

    let response = client.list_workflows().await?;
    let total = response.data.len();

    let workflows: Vec<WorkflowSummary> = match params.filter.as_deref() {
        Some(filter) if !filter.is_empty() => {
            let needle = filter.to_lowercase();
            let kept: Vec<WorkflowSummary> = response
                .data
                .into_iter()
                .filter(|wf| wf.name.to_lowercase().contains(&needle))
                .map(WorkflowSummary::from)
                .collect();
            debug!("filtered workflows from {total} to {}", kept.len());
            kept
        }
        _ => response.data.into_iter().map(WorkflowSummary::from).collect(),
    };

    Ok(json!({ "workflows": workflows }))
}

/// Fetch one workflow in full.
pub async fn get_workflow(client: Arc<dyn WorkflowApi>, params: Params) -> Result<Value, McpError> {
    let params: GetWorkflowParams = decode_params(GET_WORKFLOW, params)?;
    debug!(?params, "handling {GET_WORKFLOW}");

    let id = require_id(params.id.or(params.workflow_id), "Workflow")?;
    let workflow = client.get_workflow(&id).await?;
    Ok(json!({ "workflow": workflow }))
}

/// Start a workflow run. `data` defaults to an empty object.
pub async fn execute_workflow(
    client: Arc<dyn WorkflowApi>,
    params: Params,
) -> Result<Value, McpError> {
    let params: ExecuteWorkflowParams = decode_params(EXECUTE_WORKFLOW, params)?;
    debug!(id = ?params.id, "handling {EXECUTE_WORKFLOW}");

    let id = require_id(params.id.or(params.workflow_id), "Workflow")?;
    let data = match params.data {
        None | Some(Value::Null) => json!({}),
        Some(data) => data,
    };

    let execution = client.execute_workflow(&id, data).await?;
    Ok(json!({
        "executionId": execution.id,
        "status": execution.status,
    }))
}
