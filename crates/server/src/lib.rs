use axum::{
    extract::{Json as ExtractJson, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tooling::{tool_options, ToolContext, ToolInput, ToolOutput, ToolRegistry, ToolRequest};

pub mod errors;
pub mod models;

use errors::ApiError;
use models::{InvokeToolRequest, ToolOptionsResponse};

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn list_tools() -> Json<ToolOptionsResponse> {
    Json(ToolOptionsResponse {
        options: tool_options().into_iter().map(str::to_string).collect(),
    })
}

async fn invoke_tool(
    State(context): State<Arc<ToolContext>>,
    ExtractJson(request): ExtractJson<InvokeToolRequest>,
) -> Result<Json<ToolOutput>, ApiError> {
    let factory = context.get_tool_by_label(&request.tool)?;
    let tool_request = ToolRequest {
        assistant_id: request.assistant_id,
        description: request.description,
    };
    let registry = ToolRegistry::from_tools(factory.build(&tool_request).await?)?;

    let name = match request.name {
        Some(name) => name,
        None if registry.tool_count() == 1 => registry.list_tools().remove(0),
        None => {
            return Err(ApiError::ValidationError(format!(
                "'{}' provides {} tools, pick one with 'name': {:?}",
                request.tool,
                registry.tool_count(),
                registry.list_tools()
            )))
        }
    };

    tracing::info!("Invoking {} ({})", name, request.tool);
    let output = registry
        .execute_tool(ToolInput {
            name,
            arguments: request.arguments,
        })
        .await?;
    Ok(Json(output))
}

pub fn create_app(context: Arc<ToolContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/invoke", post(invoke_tool))
        .with_state(context)
}
