use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use perch_types::api::{PermissionChangeRequest, SearchResponse};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query_str: String,
}

pub async fn permission_change(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Json<Value>> {
    workspace.admin_permission_change(&token, req.u_id, req.permission_id)?;
    Ok(Json(json!({})))
}

pub async fn search(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    Ok(Json(workspace.search(&token, &query.query_str)?))
}

/// Test-isolation entry point: drops all workspace state.
pub async fn clear(State(workspace): State<AppState>) -> Json<Value> {
    workspace.reset();
    Json(json!({}))
}
