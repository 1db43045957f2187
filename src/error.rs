use serde_json::Value;

// JSON-RPC 2.0 reserved codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Server-defined codes (-32000..=-32099)
pub const UNAUTHORIZED: i32 = -32001;
pub const FORBIDDEN: i32 = -32002;
pub const UPSTREAM_API_ERROR: i32 = -32003;
pub const VALIDATION_ERROR: i32 = -32004;

/// Taxonomy error raised by the validator, handlers and the upstream client.
///
/// Every variant carries a human-readable message and optional structured
/// detail. Only the dispatcher turns these into wire payloads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum McpError {
    #[error("{message}")]
    Parse { message: String, data: Option<Value> },
    #[error("{message}")]
    InvalidRequest { message: String, data: Option<Value> },
    #[error("{message}")]
    MethodNotFound { message: String, data: Option<Value> },
    /// A resource addressed by a handler does not exist upstream.
    #[error("{message}")]
    NotFound { message: String, data: Option<Value> },
    #[error("{message}")]
    InvalidParams { message: String, data: Option<Value> },
    #[error("{message}")]
    Internal { message: String, data: Option<Value> },
    #[error("{message}")]
    Unauthorized { message: String, data: Option<Value> },
    #[error("{message}")]
    Forbidden { message: String, data: Option<Value> },
    #[error("{message}")]
    UpstreamApi { message: String, data: Option<Value> },
    #[error("{message}")]
    Validation { message: String, data: Option<Value> },
}

impl McpError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into(), data: None }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into(), data: None }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::MethodNotFound {
            message: format!("Method '{method}' not found"),
            data: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into(), data: None }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams { message: message.into(), data: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), data: None }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into(), data: None }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into(), data: None }
    }

    pub fn upstream_api(message: impl Into<String>) -> Self {
        Self::UpstreamApi { message: message.into(), data: None }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), data: None }
    }

    /// Attach structured detail, replacing any previous value.
    pub fn with_data(mut self, detail: Value) -> Self {
        match &mut self {
            Self::Parse { data, .. }
            | Self::InvalidRequest { data, .. }
            | Self::MethodNotFound { data, .. }
            | Self::NotFound { data, .. }
            | Self::InvalidParams { data, .. }
            | Self::Internal { data, .. }
            | Self::Unauthorized { data, .. }
            | Self::Forbidden { data, .. }
            | Self::UpstreamApi { data, .. }
            | Self::Validation { data, .. } => *data = Some(detail),
        }
        self
    }

    /// Numeric wire code for this kind.
    ///
    /// `NotFound` deliberately shares the method-not-found code: callers see
    /// a missing workflow the same way they see a missing method.
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse { .. } => PARSE_ERROR,
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotFound { .. } | Self::NotFound { .. } => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => INVALID_PARAMS,
            Self::Internal { .. } => INTERNAL_ERROR,
            Self::Unauthorized { .. } => UNAUTHORIZED,
            Self::Forbidden { .. } => FORBIDDEN,
            Self::UpstreamApi { .. } => UPSTREAM_API_ERROR,
            Self::Validation { .. } => VALIDATION_ERROR,
        }
    }

    /// Stable kind label, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::NotFound { .. } => "not_found",
            Self::InvalidParams { .. } => "invalid_params",
            Self::Internal { .. } => "internal_error",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::UpstreamApi { .. } => "upstream_api_error",
            Self::Validation { .. } => "validation_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Parse { message, .. }
            | Self::InvalidRequest { message, .. }
            | Self::MethodNotFound { message, .. }
            | Self::NotFound { message, .. }
            | Self::InvalidParams { message, .. }
            | Self::Internal { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::UpstreamApi { message, .. }
            | Self::Validation { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Parse { data, .. }
            | Self::InvalidRequest { data, .. }
            | Self::MethodNotFound { data, .. }
            | Self::NotFound { data, .. }
            | Self::InvalidParams { data, .. }
            | Self::Internal { data, .. }
            | Self::Unauthorized { data, .. }
            | Self::Forbidden { data, .. }
            | Self::UpstreamApi { data, .. }
            | Self::Validation { data, .. } => data.as_ref(),
        }
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Serialization failed: {err}"))
    }
}
