use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{decode_params, id_text, require_id, RegistryBuilder};
use crate::error::McpError;
use crate::protocol::Params;
use crate::upstream::{Execution, ExecutionQuery, WorkflowApi};

pub const LIST_EXECUTIONS: &str = "n8n_list_executions";
pub const GET_EXECUTION: &str = "n8n_get_execution";

#[derive(Debug, Default, Deserialize)]
pub struct ListExecutionsParams {
    #[serde(default, rename = "workflowId")]
    pub workflow_id: Option<Value>,
    /// Number or numeric string; anything else is ignored.
    #[serde(default)]
    pub limit: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct GetExecutionParams {
    #[serde(default)]
    pub id: Option<Value>,
}

/// Public projection of an execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    pub id: Value,
    #[serde(rename = "workflowId")]
    pub workflow_id: Option<Value>,
    pub status: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<String>,
    #[serde(rename = "finishedAt", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl From<Execution> for ExecutionSummary {
    fn from(exec: Execution) -> Self {
        Self {
            id: exec.id,
            workflow_id: exec.workflow_id,
            status: exec.status,
            started_at: exec.started_at,
            finished_at: exec.finished_at,
        }
    }
}

pub fn register(builder: RegistryBuilder, client: Arc<dyn WorkflowApi>) -> RegistryBuilder {
    let list_client = Arc::clone(&client);
    builder
        .register(LIST_EXECUTIONS, move |params| {
            list_executions(Arc::clone(&list_client), params)
        })
        .register(GET_EXECUTION, move |params| {
            get_execution(Arc::clone(&client), params)
        })
}

/// Positive integer limits pass through; zero, negatives and
/// non-numeric values are dropped.
fn parse_limit(limit: Option<&Value>) -> Option<u64> {
    let n = match limit? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (n > 0).then_some(n)
}

/// List executions, optionally scoped to one workflow.
pub async fn list_executions(
    client: Arc<dyn WorkflowApi>,
    params: Params,
) -> Result<Value, McpError> {
    let params: ListExecutionsParams = decode_params(LIST_EXECUTIONS, params)?;
    debug!(?params, "handling {LIST_EXECUTIONS}");

    let query = ExecutionQuery {
        workflow_id: id_text(params.workflow_id, "Workflow")?,
        limit: parse_limit(params.limit.as_ref()),
    };

    let response = client.list_executions(&query).await?;
    let executions: Vec<ExecutionSummary> = response
        .data
        .into_iter()
        .map(ExecutionSummary::from)
        .collect();

    Ok(json!({ "executions": executions }))
}

/// Fetch one execution in full.
pub async fn get_execution(client: Arc<dyn WorkflowApi>, params: Params) -> Result<Value, McpError> {
    let params: GetExecutionParams = decode_params(GET_EXECUTION, params)?;
    debug!(?params, "handling {GET_EXECUTION}");

    let id = require_id(params.id, "Execution")?;
    let execution = client.get_execution(&id).await?;
    Ok(json!({ "execution": execution }))
}
