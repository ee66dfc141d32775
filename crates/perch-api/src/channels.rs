use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use perch_types::api::{
    ChannelCreateRequest, ChannelCreateResponse, ChannelDetailsResponse, ChannelIdRequest,
    ChannelListResponse, InviteRequest, MessagesPage, OwnerChangeRequest,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub channel_id: u64,
    pub start: usize,
}

pub async fn create(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ChannelCreateRequest>,
) -> ApiResult<Json<ChannelCreateResponse>> {
    Ok(Json(workspace.channels_create(&token, &req.name, req.is_public)?))
}

pub async fn list(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ChannelListResponse>> {
    Ok(Json(workspace.channels_list(&token)?))
}

pub async fn list_all(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ChannelListResponse>> {
    Ok(Json(workspace.channels_list_all(&token)?))
}

pub async fn invite(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<InviteRequest>,
) -> ApiResult<Json<Value>> {
    workspace.channel_invite(&token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn details(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<ChannelDetailsResponse>> {
    Ok(Json(workspace.channel_details(&token, query.channel_id)?))
}

pub async fn messages(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<MessagesPage>> {
    Ok(Json(workspace.channel_messages(&token, query.channel_id, query.start)?))
}

pub async fn leave(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<Json<Value>> {
    workspace.channel_leave(&token, req.channel_id)?;
    Ok(Json(json!({})))
}

pub async fn join(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<Json<Value>> {
    workspace.channel_join(&token, req.channel_id)?;
    Ok(Json(json!({})))
}

pub async fn add_owner(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<OwnerChangeRequest>,
) -> ApiResult<Json<Value>> {
    workspace.channel_add_owner(&token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn remove_owner(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<OwnerChangeRequest>,
) -> ApiResult<Json<Value>> {
    workspace.channel_remove_owner(&token, req.channel_id, req.u_id)?;
    Ok(Json(json!({})))
}
