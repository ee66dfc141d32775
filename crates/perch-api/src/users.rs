use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use perch_types::api::{
    SetEmailRequest, SetHandleRequest, SetNameRequest, UserProfileResponse, UsersAllResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub u_id: u64,
}

pub async fn profile(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<ProfileQuery>,
) -> ApiResult<Json<UserProfileResponse>> {
    Ok(Json(workspace.user_profile(&token, query.u_id)?))
}

pub async fn set_name(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Json<Value>> {
    workspace.user_set_name(&token, &req.name_first, &req.name_last)?;
    Ok(Json(json!({})))
}

pub async fn set_email(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Json<Value>> {
    workspace.user_set_email(&token, &req.email)?;
    Ok(Json(json!({})))
}

pub async fn set_handle(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Json<Value>> {
    workspace.user_set_handle(&token, &req.handle_str)?;
    Ok(Json(json!({})))
}

pub async fn all(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<UsersAllResponse>> {
    Ok(Json(workspace.users_all(&token)?))
}
