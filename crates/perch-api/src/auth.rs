use axum::Json;
use axum::extract::State;

use perch_types::api::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest};

use crate::AppState;
use crate::error::ApiResult;
use crate::extract::BearerToken;

pub async fn register(
    State(workspace): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let auth = workspace.auth_register(&req.email, &req.password, &req.name_first, &req.name_last)?;
    Ok(Json(auth))
}

pub async fn login(
    State(workspace): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let auth = workspace.auth_login(&req.email, &req.password)?;
    Ok(Json(auth))
}

pub async fn logout(
    State(workspace): State<AppState>,
    BearerToken(token): BearerToken,
) -> Json<LogoutResponse> {
    Json(workspace.auth_logout(&token))
}
