//! Static tool metadata served by `mcp.tools.list`.
//!
//! The catalog is read once at startup from a JSON document. When the
//! document is missing or does not satisfy [`CATALOG_SCHEMA`], the built-in
//! catalog describing the n8n methods is used instead.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::handlers::executions::{GET_EXECUTION, LIST_EXECUTIONS};
use crate::handlers::workflows::{EXECUTE_WORKFLOW, GET_WORKFLOW, LIST_WORKFLOWS};
use crate::schema::{validate_value, SchemaValidationError};

/// Method name answered directly from the catalog, never from the registry.
pub const TOOLS_LIST_METHOD: &str = "mcp.tools.list";

/// JSON Schema every catalog document must satisfy.
pub const CATALOG_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["name", "version", "description", "tools"],
  "properties": {
    "name": { "type": "string", "minLength": 1 },
    "version": { "type": "string", "minLength": 1 },
    "description": { "type": "string" },
    "tools": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name", "description", "parameters"],
        "properties": {
          "name": { "type": "string", "minLength": 1 },
          "description": { "type": "string" },
          "parameters": { "type": "object" }
        }
      }
    }
  }
}"#;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("cannot read tool catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tool catalog failed schema validation: {0}")]
    Schema(#[from] SchemaValidationError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalog {
    pub name: String,
    pub version: String,
    pub description: String,
    pub tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Parse and schema-check a catalog document.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        let schema: Value = serde_json::from_str(CATALOG_SCHEMA)?;
        validate_value(&schema, &value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Load from `path` if given, falling back to [`ToolCatalog::builtin`]
    /// on any problem.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            info!("no tool catalog configured, using built-in catalog");
            return Self::builtin();
        };
        match Self::from_file(path) {
            Ok(catalog) => {
                info!(path = %path.display(), tools = catalog.tools.len(), "loaded tool catalog");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to built-in tool catalog");
                Self::builtin()
            }
        }
    }

    /// Result payload for `mcp.tools.list`.
    pub fn list_result(&self) -> Value {
        json!({ "tools": self.tools })
    }

    pub fn builtin() -> Self {
        let id_param = |what: &str| {
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": ["string", "number"], "description": format!("{what} ID") }
                }
            })
        };

        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Manage n8n workflows and executions".to_string(),
            tools: vec![
                ToolDescriptor {
                    name: LIST_WORKFLOWS.to_string(),
                    description: "List n8n workflows, optionally filtered by name".to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "filter": {
                                "type": "string",
                                "description": "Case-insensitive substring to match against workflow names"
                            }
                        }
                    }),
                },
                ToolDescriptor {
                    name: GET_WORKFLOW.to_string(),
                    description: "Get a single n8n workflow by ID".to_string(),
                    parameters: id_param("Workflow"),
                },
                ToolDescriptor {
                    name: EXECUTE_WORKFLOW.to_string(),
                    description: "Execute an n8n workflow with optional input data".to_string(),
                    parameters: json!({
                        "type": "object",
                        "required": ["id"],
                        "properties": {
                            "id": { "type": ["string", "number"], "description": "Workflow ID" },
                            "data": { "type": "object", "description": "Input data for the run" }
                        }
                    }),
                },
                ToolDescriptor {
                    name: LIST_EXECUTIONS.to_string(),
                    description: "List workflow executions".to_string(),
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "workflowId": { "type": ["string", "number"], "description": "Only executions of this workflow" },
                            "limit": { "type": "integer", "minimum": 1, "description": "Maximum number of executions" }
                        }
                    }),
                },
                ToolDescriptor {
                    name: GET_EXECUTION.to_string(),
                    description: "Get a single workflow execution by ID".to_string(),
                    parameters: id_param("Execution"),
                },
            ],
        }
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
