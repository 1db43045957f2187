//! Shared fixtures: an in-memory `WorkflowApi` double and a recording
//! dispatch observer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use n8n_mcp_server::dispatcher::{DispatchEvent, DispatchObserver, DispatchState, Dispatcher};
use n8n_mcp_server::error::McpError;
use n8n_mcp_server::handlers::build_registry;
use n8n_mcp_server::tools::ToolCatalog;
use n8n_mcp_server::upstream::{
    Execution, ExecutionQuery, ListResponse, Workflow, WorkflowApi,
};
use serde_json::{json, Map, Value};

pub fn workflow(id: &str, name: &str, active: bool) -> Workflow {
    let mut extra = Map::new();
    extra.insert("nodes".into(), json!([{ "name": "Start" }]));
    extra.insert("connections".into(), json!({}));
    Workflow {
        id: json!(id),
        name: name.to_string(),
        active,
        created_at: Some("2024-01-01T00:00:00.000Z".into()),
        updated_at: Some("2024-02-01T00:00:00.000Z".into()),
        extra,
    }
}

pub fn execution(id: &str, workflow_id: &str, status: &str, finished: bool) -> Execution {
    let mut extra = Map::new();
    extra.insert("mode".into(), json!("manual"));
    Execution {
        id: json!(id),
        workflow_id: Some(json!(workflow_id)),
        status: Some(status.to_string()),
        started_at: Some("2024-03-01T10:00:00.000Z".into()),
        finished_at: finished.then(|| "2024-03-01T10:00:05.000Z".to_string()),
        extra,
    }
}

/// Upstream ids travel as URL path segments, so `"555"` names the same
/// record as `555`.
pub fn same_id(stored: &Value, id: &str) -> bool {
    match stored {
        Value::String(s) => s == id,
        other => other.to_string() == id,
    }
}

/// In-memory upstream. Unknown ids produce a 404-flavored `NotFound`;
/// `fail_with` makes every call fail with the given error.
#[derive(Default)]
pub struct FakeWorkflowApi {
    pub workflows: Vec<Workflow>,
    pub executions: Vec<Execution>,
    pub fail_with: Option<McpError>,
    pub calls: AtomicUsize,
    pub execution_queries: Mutex<Vec<ExecutionQuery>>,
    pub executed: Mutex<Vec<(String, Value)>>,
}

impl FakeWorkflowApi {
    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        Self {
            workflows,
            ..Self::default()
        }
    }

    pub fn failing(err: McpError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), McpError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkflowApi for FakeWorkflowApi {
    async fn list_workflows(&self) -> Result<ListResponse<Workflow>, McpError> {
        self.enter()?;
        Ok(ListResponse::new(self.workflows.clone()))
    }

    async fn get_workflow(&self, id: &str) -> Result<Workflow, McpError> {
        self.enter()?;
        self.workflows
            .iter()
            .find(|wf| same_id(&wf.id, id))
            .cloned()
            .ok_or_else(|| McpError::not_found(format!("Workflow {id} not found")))
    }

    async fn execute_workflow(&self, id: &str, data: Value) -> Result<Execution, McpError> {
        self.enter()?;
        if !self.workflows.iter().any(|wf| same_id(&wf.id, id)) {
            return Err(McpError::not_found(format!("Workflow {id} not found")));
        }
        self.executed
            .lock()
            .unwrap()
            .push((id.to_string(), data));
        Ok(execution("exec-1", id, "running", false))
    }

    async fn list_executions(
        &self,
        query: &ExecutionQuery,
    ) -> Result<ListResponse<Execution>, McpError> {
        self.enter()?;
        self.execution_queries.lock().unwrap().push(query.clone());
        let mut data: Vec<Execution> = self
            .executions
            .iter()
            .filter(|e| match &query.workflow_id {
                Some(wf) => e.workflow_id.as_ref().is_some_and(|v| same_id(v, wf)),
                None => true,
            })
            .cloned()
            .collect();
        if let Some(limit) = query.limit {
            data.truncate(limit as usize);
        }
        Ok(ListResponse::new(data))
    }

    async fn get_execution(&self, id: &str) -> Result<Execution, McpError> {
        self.enter()?;
        self.executions
            .iter()
            .find(|e| same_id(&e.id, id))
            .cloned()
            .ok_or_else(|| McpError::not_found(format!("Execution {id} not found")))
    }
}

/// Observer that records `(state, method, error code)` triples.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<(DispatchState, Option<String>, Option<i32>)>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<DispatchState> {
        self.events.lock().unwrap().iter().map(|(s, _, _)| *s).collect()
    }
}

impl DispatchObserver for RecordingObserver {
    fn observe(&self, event: &DispatchEvent<'_>) {
        self.events.lock().unwrap().push((
            event.state,
            event.method.map(str::to_string),
            event.error.map(McpError::code),
        ));
    }
}

/// Standard fixture: two workflows, three executions.
pub fn sample_api() -> FakeWorkflowApi {
    FakeWorkflowApi {
        workflows: vec![
            workflow("wf-1", "Invoice Sync", true),
            workflow("wf-2", "Lead Import", false),
        ],
        executions: vec![
            execution("100", "wf-1", "success", true),
            execution("101", "wf-1", "error", true),
            execution("102", "wf-2", "running", false),
        ],
        ..FakeWorkflowApi::default()
    }
}

pub fn dispatcher_over(api: Arc<FakeWorkflowApi>) -> (Dispatcher, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let registry = build_registry(api);
    let dispatcher = Dispatcher::new(Arc::new(registry), Arc::new(ToolCatalog::builtin()))
        .with_observer(observer.clone());
    (dispatcher, observer)
}
