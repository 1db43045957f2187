use serde_json::Value;

use super::request::{JsonRpcRequest, Params, RpcId};
use super::response::JSONRPC_VERSION;
use crate::error::McpError;

/// Structurally validate an inbound envelope.
///
/// Checks, in order: the envelope is an object, `jsonrpc` (if sent) is
/// `"2.0"`, `id` is present and is a string, number or null, `method` is a
/// non-empty string, and `params` (if sent) is an object. Absent `params`
/// becomes an empty object.
///
/// `id` is a presence check: `0` and `""` are legitimate ids.
pub fn validate_request(raw: &Value) -> Result<JsonRpcRequest, McpError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| McpError::invalid_request("Invalid request format: Request must be an object"))?;

    let jsonrpc = match obj.get("jsonrpc") {
        None => None,
        Some(Value::String(v)) if v == JSONRPC_VERSION => Some(v.clone()),
        Some(_) => {
            return Err(McpError::invalid_request(
                "Invalid request format: Field \"jsonrpc\" must be \"2.0\"",
            ))
        }
    };

    let id = match obj.get("id") {
        None => {
            return Err(McpError::invalid_request(
                "Invalid request format: Missing required field \"id\"",
            ))
        }
        Some(Value::Null) => None,
        Some(value) => Some(RpcId::from_value(value).ok_or_else(|| {
            McpError::invalid_request(
                "Invalid request format: Field \"id\" must be a string, number or null",
            )
        })?),
    };

    let method = match obj.get("method") {
        None => {
            return Err(McpError::invalid_request(
                "Invalid request format: Missing required field \"method\"",
            ))
        }
        Some(Value::String(m)) if m.is_empty() => {
            return Err(McpError::invalid_request(
                "Invalid request format: Field \"method\" must not be empty",
            ))
        }
        Some(Value::String(m)) => m.clone(),
        Some(_) => {
            return Err(McpError::invalid_request(
                "Invalid request format: Field \"method\" must be a string",
            ))
        }
    };

    let params = match obj.get("params") {
        None => Params::new(),
        Some(Value::Object(p)) => p.clone(),
        Some(_) => {
            return Err(McpError::invalid_request(
                "Invalid request format: Field \"params\" must be an object",
            ))
        }
    };

    Ok(JsonRpcRequest {
        jsonrpc,
        id,
        method,
        params,
    })
}

/// Best-effort id extraction for envelopes that failed validation.
pub fn read_id(raw: &Value) -> Option<RpcId> {
    raw.get("id").and_then(RpcId::from_value)
}
