use std::time::Duration;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;

use perch_types::api::{
    EditMessageRequest, PinRequest, ReactRequest, RemoveMessageRequest, SendLaterRequest,
    SendMessageRequest, SendMessageResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

pub async fn send(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    Ok(Json(workspace.message_send(&token, req.channel_id, &req.message)?))
}

/// Validates and parks the message now, then schedules the commit for the
/// fire time. The pre-allocated message id is returned immediately.
pub async fn send_later(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    let (response, fire_at) =
        workspace.message_send_later(&token, req.channel_id, &req.message, req.time_sent)?;

    let message_id = response.message_id;
    let delay = (fire_at - Utc::now().timestamp()).max(0) as u64;
    debug!(message_id, delay, "scheduling deferred send");

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(delay)).await;
        workspace.commit_deferred(message_id);
    });

    Ok(Json(response))
}

pub async fn edit(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_edit(&token, req.message_id, &req.message)?;
    Ok(Json(json!({})))
}

pub async fn remove(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<RemoveMessageRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_remove(&token, req.message_id)?;
    Ok(Json(json!({})))
}

pub async fn react(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_react(&token, req.message_id, req.react_id)?;
    Ok(Json(json!({})))
}

pub async fn unreact(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_unreact(&token, req.message_id, req.react_id)?;
    Ok(Json(json!({})))
}

pub async fn pin(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<PinRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_pin(&token, req.message_id)?;
    Ok(Json(json!({})))
}

pub async fn unpin(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<PinRequest>,
) -> ApiResult<Json<Value>> {
    workspace.message_unpin(&token, req.message_id)?;
    Ok(Json(json!({})))
}
