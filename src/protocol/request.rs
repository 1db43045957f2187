use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Handler parameters: always a JSON object once validated.
pub type Params = Map<String, Value>;

/// JSON-RPC 2.0 ID: a number or a string.
///
/// A literal `null` id is represented as `None` at the envelope level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(serde_json::Number),
    Str(String),
}

impl RpcId {
    /// Read an id out of a raw JSON value. Returns `None` for types the
    /// protocol does not allow (and for `null`).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for RpcId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Validated JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub id: Option<RpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Params,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<RpcId>, method: impl Into<String>, params: Params) -> Self {
        Self {
            jsonrpc: Some("2.0".into()),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }
}
