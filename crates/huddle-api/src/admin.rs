use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{AdminUserRemoveQuery, PermissionChangeRequest};

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn remove_user(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<AdminUserRemoveQuery>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::admin::remove_user(&mut store, auth.user_id, query.u_id)?;
    Ok(empty_object())
}

pub async fn change_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::admin::change_permission(&mut store, auth.user_id, req.u_id, req.permission_id)?;
    Ok(empty_object())
}
