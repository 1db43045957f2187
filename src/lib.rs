//! MCP server for n8n.
//!
//! Exposes `n8n_list_workflows`, `n8n_get_workflow`, `n8n_execute_workflow`,
//! `n8n_list_executions`, `n8n_get_execution` and `mcp.tools.list` over a
//! single JSON-RPC 2.0 HTTP endpoint (`POST /mcp`).
//!
//! The [`dispatcher::Dispatcher`] is the core: it validates each envelope,
//! routes it through the immutable [`handlers::MethodRegistry`] and maps
//! every outcome onto one response envelope using the [`error::McpError`]
//! taxonomy.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod protocol;
pub mod schema;
pub mod server;
pub mod tools;
pub mod upstream;
