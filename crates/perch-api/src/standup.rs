use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use perch_types::api::{
    StandupActiveResponse, StandupSendRequest, StandupStartRequest, StandupStartResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

#[derive(Debug, Deserialize)]
pub struct StandupQuery {
    pub channel_id: u64,
}

/// Registers the standup and schedules its single drain job. The drain
/// re-enters the store lock, so it serializes with regular sends.
pub async fn start(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<Json<StandupStartResponse>> {
    let response = workspace.standup_start(&token, req.channel_id, req.length)?;

    let channel_id = req.channel_id;
    let delay = req.length.max(0) as u64;
    debug!(channel_id, delay, "scheduling standup drain");

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(delay)).await;
        workspace.standup_finish(channel_id);
    });

    Ok(Json(response))
}

pub async fn active(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<StandupQuery>,
) -> ApiResult<Json<StandupActiveResponse>> {
    Ok(Json(workspace.standup_active(&token, query.channel_id)?))
}

pub async fn send(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<Json<Value>> {
    workspace.standup_send(&token, req.channel_id, &req.message)?;
    Ok(Json(json!({})))
}
