//! Tool catalog, argument validation and dispatch against a venue client.

mod dispatcher;
mod registry;

pub use dispatcher::{Dispatcher, DEFAULT_CALL_TIMEOUT};
pub use registry::{
    RegisteredTool, ToolDefinition, ToolHandler, ToolRegistry, GET_ALL_MIDS, PLACE_LIMIT_ORDER,
};

use async_trait::async_trait;
use hypermcp_core::VenueError;
use hypermcp_schema::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Wire names of the error taxonomy, serialized verbatim as `error.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    VenueError,
    VenueTimeout,
    /// Startup only; never produced by a tool call.
    ConfigurationError,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] SchemaError),
    #[error(transparent)]
    Venue(#[from] VenueError),
    #[error("venue call exceeded {0:?}")]
    Timeout(Duration),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::UnknownTool(_) => ErrorKind::UnknownTool,
            ToolError::InvalidArguments(_) => ErrorKind::InvalidArguments,
            ToolError::Venue(VenueError::Timeout) | ToolError::Timeout(_) => ErrorKind::VenueTimeout,
            ToolError::Venue(_) => ErrorKind::VenueError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    /// Offending argument names, for `InvalidArguments`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Uniform envelope for every tool call outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorBody>,
}

impl ToolCallResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: &ToolError) -> Self {
        let fields = match error {
            ToolError::InvalidArguments(schema) => schema.fields(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            data: None,
            error: Some(ToolErrorBody {
                kind: error.kind(),
                message: error.to_string(),
                fields,
            }),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Executes a tool by name. Implemented by [`Dispatcher`].
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn call(&self, name: &str, input: Value) -> Result<Value, ToolError>;
}
