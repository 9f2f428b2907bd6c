use axum::extract::Path;
use axum::Json;
use serde_json::Value;

use crate::tools::{ToolInfo, ToolRegistry};
use crate::utils::error::ApiError;

pub async fn list_tools() -> Json<Vec<ToolInfo>> {
    Json(ToolRegistry::list())
}

pub async fn execute_tool(
    Path(tool_name): Path<String>,
    Json(arguments): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let result = ToolRegistry::execute(&tool_name, &arguments)?;
    Ok(Json(result))
}
