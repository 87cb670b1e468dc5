use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{
    SetEmailRequest, SetHandleRequest, SetNameRequest, UploadPhotoRequest, UserProfileQuery,
    UserProfileResponse, UserStatsView, UsersAllResponse, WorkspaceStatsView,
};

use huddle_core::users::CropRect;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn profile(
    State(state): State<AppState>,
    Extension(_auth): Extension<Auth>,
    Query(query): Query<UserProfileQuery>,
) -> ApiResult<Json<UserProfileResponse>> {
    let store = state.store.lock().unwrap();
    let user = huddle_core::users::profile(&store, query.u_id)?;
    Ok(Json(UserProfileResponse { user }))
}

pub async fn all(State(state): State<AppState>) -> Json<UsersAllResponse> {
    let store = state.store.lock().unwrap();
    Json(UsersAllResponse { users: huddle_core::users::all(&store) })
}

pub async fn set_name(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::users::set_name(&mut store, auth.user_id, &req.name_first, &req.name_last)?;
    Ok(empty_object())
}

pub async fn set_email(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::users::set_email(&mut store, auth.user_id, &req.email)?;
    Ok(empty_object())
}

pub async fn set_handle(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::users::set_handle(&mut store, auth.user_id, &req.handle_str)?;
    Ok(empty_object())
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<UploadPhotoRequest>,
) -> ApiResult<Json<Value>> {
    let rect = CropRect {
        x_start: req.x_start,
        y_start: req.y_start,
        x_end: req.x_end,
        y_end: req.y_end,
    };
    let mut store = state.store.lock().unwrap();
    huddle_core::users::upload_photo(
        &mut store,
        state.images.as_ref(),
        auth.user_id,
        &req.img_url,
        rect,
    )?;
    Ok(empty_object())
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<Json<UserStatsView>> {
    let mut store = state.store.lock().unwrap();
    let stats = huddle_core::stats::user_stats(&mut store, auth.user_id)?;
    Ok(Json(UserStatsView::from(&stats)))
}

pub async fn workspace_stats(State(state): State<AppState>) -> Json<WorkspaceStatsView> {
    let mut store = state.store.lock().unwrap();
    let stats = huddle_core::stats::workspace_stats(&mut store);
    Json(WorkspaceStatsView::from(&stats))
}
