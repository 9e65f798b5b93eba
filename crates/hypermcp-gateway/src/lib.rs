//! HTTP surface for the tool service: discovery, execution and health.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hypermcp::hypermcp_tools::{ErrorKind, ToolCallResult, ToolDefinition, ToolErrorBody};
use hypermcp::HyperMcp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub struct AppState {
    pub service: HyperMcp,
    /// Status used for `UnknownTool` results; every other outcome is 200.
    pub unknown_tool_status: StatusCode,
}

impl AppState {
    pub fn new(service: HyperMcp) -> Self {
        Self {
            service,
            unknown_tool_status: StatusCode::OK,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct ListToolsResponse<'a> {
    pub tools: Vec<&'a ToolDefinition>,
}

/// Loads `.env` (or `path`) into the process environment without overriding
/// variables that are already set. A missing file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(cmd_health))
        .route("/mcp/tools", post(cmd_list_tools))
        .route("/mcp/call", post(cmd_call_tool))
        .with_state(state)
}

async fn cmd_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// The request body (`{}`) carries nothing, so it is not parsed.
async fn cmd_list_tools(State(state): State<Arc<AppState>>) -> Response {
    Json(ListToolsResponse {
        tools: state.service.tools(),
    })
    .into_response()
}

async fn cmd_call_tool(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CallToolRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "malformed tool call request");
            let result = ToolCallResult {
                success: false,
                data: None,
                error: Some(ToolErrorBody {
                    kind: ErrorKind::InvalidArguments,
                    message: rejection.body_text(),
                    fields: Vec::new(),
                }),
            };
            return (rejection.status(), Json(result)).into_response();
        }
    };

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("mcp_call", %request_id);
    let result = state
        .service
        .call(&request.tool_name, request.arguments)
        .instrument(span)
        .await;

    let status = match result.error_kind() {
        Some(ErrorKind::UnknownTool) => state.unknown_tool_status,
        _ => StatusCode::OK,
    };
    (status, Json(result)).into_response()
}
