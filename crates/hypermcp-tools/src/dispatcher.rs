use crate::{ToolCallResult, ToolError, ToolExecutor, ToolHandler, ToolRegistry};
use async_trait::async_trait;
use hypermcp_schema::SchemaError;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves, validates and executes tool calls. Never fails: every outcome
/// is folded into a [`ToolCallResult`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub async fn execute(&self, tool_name: &str, arguments: Value) -> ToolCallResult {
        let span = tracing::info_span!("tool_call", tool = %tool_name);
        async {
            match self.call(tool_name, arguments).await {
                Ok(data) => {
                    tracing::info!("tool call succeeded");
                    ToolCallResult::ok(data)
                }
                Err(error) => {
                    tracing::warn!(kind = ?error.kind(), %error, "tool call failed");
                    ToolCallResult::failure(&error)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl ToolExecutor for Dispatcher {
    async fn call(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self
            .registry
            .resolve(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args = tool.definition.parameters.validate(&into_object(input)?)?;

        let call = ToolHandler::call(tool.handler.as_ref(), args);
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(self.call_timeout)),
        }
    }
}

fn into_object(input: Value) -> Result<Map<String, Value>, SchemaError> {
    match input {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(SchemaError::single("arguments", "must be an object")),
    }
}
