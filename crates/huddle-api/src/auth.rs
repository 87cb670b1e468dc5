use axum::{Extension, Json, extract::State};
use serde_json::Value;

use huddle_types::api::{
    AuthResponse, LoginRequest, PasswordResetBody, PasswordResetRequestBody, RegisterRequest,
};

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut store = state.store.lock().unwrap();
    let (token, auth_user_id) = huddle_core::auth::register(
        &mut store,
        &req.email,
        &req.password,
        &req.name_first,
        &req.name_last,
    )?;
    Ok(Json(AuthResponse { token, auth_user_id }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let mut store = state.store.lock().unwrap();
    let (token, auth_user_id) = huddle_core::auth::login(&mut store, &req.email, &req.password)?;
    Ok(Json(AuthResponse { token, auth_user_id }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::auth::logout(&mut store, &auth.token)?;
    Ok(empty_object())
}

pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequestBody>,
) -> Json<Value> {
    let mut store = state.store.lock().unwrap();
    huddle_core::auth::password_reset_request(&mut store, &req.email, state.mailer.as_ref());
    empty_object()
}

pub async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::auth::password_reset(&mut store, &req.reset_code, &req.new_password)?;
    Ok(empty_object())
}
