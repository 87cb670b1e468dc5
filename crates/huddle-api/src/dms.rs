use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{
    DmCreateRequest, DmCreateResponse, DmDetailsResponse, DmIdBody, DmIdQuery, DmListResponse,
    DmMessagesQuery, MessagesPage,
};
use huddle_types::models::ChatRef;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<DmCreateRequest>,
) -> ApiResult<Json<DmCreateResponse>> {
    let mut store = state.store.lock().unwrap();
    let dm_id = huddle_core::dms::create(&mut store, auth.user_id, &req.u_ids)?;
    Ok(Json(DmCreateResponse { dm_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> Json<DmListResponse> {
    let store = state.store.lock().unwrap();
    Json(DmListResponse { dms: huddle_core::dms::list(&store, auth.user_id) })
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<DmIdQuery>,
) -> ApiResult<Json<DmDetailsResponse>> {
    let store = state.store.lock().unwrap();
    let details = huddle_core::dms::details(&store, auth.user_id, query.dm_id)?;
    Ok(Json(details))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<DmIdBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::dms::leave(&mut store, auth.user_id, req.dm_id)?;
    Ok(empty_object())
}

/// Deleting a DM also aborts any deliveries still scheduled into it.
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<DmIdQuery>,
) -> ApiResult<Json<Value>> {
    {
        let mut store = state.store.lock().unwrap();
        huddle_core::dms::remove(&mut store, auth.user_id, query.dm_id)?;
    }
    state.scheduler.cancel_chat(ChatRef::Dm(query.dm_id));
    Ok(empty_object())
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<DmMessagesQuery>,
) -> ApiResult<Json<MessagesPage>> {
    let store = state.store.lock().unwrap();
    let page = huddle_core::dms::messages(&store, auth.user_id, query.dm_id, query.start)?;
    Ok(Json(page))
}
