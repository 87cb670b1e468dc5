use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{
    ChannelDetailsQuery, ChannelDetailsResponse, ChannelIdBody, ChannelListResponse,
    ChannelMessagesQuery, ChannelUserBody, ChannelsCreateRequest, ChannelsCreateResponse,
    MessagesPage,
};

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelsCreateRequest>,
) -> ApiResult<Json<ChannelsCreateResponse>> {
    let mut store = state.store.lock().unwrap();
    let channel_id =
        huddle_core::channels::create(&mut store, auth.user_id, &req.name, req.is_public)?;
    Ok(Json(ChannelsCreateResponse { channel_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> Json<ChannelListResponse> {
    let store = state.store.lock().unwrap();
    Json(ChannelListResponse { channels: huddle_core::channels::list(&store, auth.user_id) })
}

pub async fn list_all(State(state): State<AppState>) -> Json<ChannelListResponse> {
    let store = state.store.lock().unwrap();
    Json(ChannelListResponse { channels: huddle_core::channels::list_all(&store) })
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<ChannelDetailsQuery>,
) -> ApiResult<Json<ChannelDetailsResponse>> {
    let store = state.store.lock().unwrap();
    let details = huddle_core::channels::details(&store, auth.user_id, query.channel_id)?;
    Ok(Json(details))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelIdBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::channels::join(&mut store, auth.user_id, req.channel_id)?;
    Ok(empty_object())
}

pub async fn invite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelUserBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::channels::invite(&mut store, auth.user_id, req.channel_id, req.u_id)?;
    Ok(empty_object())
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelIdBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::channels::leave(&mut store, auth.user_id, req.channel_id)?;
    Ok(empty_object())
}

pub async fn add_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelUserBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::channels::add_owner(&mut store, auth.user_id, req.channel_id, req.u_id)?;
    Ok(empty_object())
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<ChannelUserBody>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::channels::remove_owner(&mut store, auth.user_id, req.channel_id, req.u_id)?;
    Ok(empty_object())
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<ChannelMessagesQuery>,
) -> ApiResult<Json<MessagesPage>> {
    let store = state.store.lock().unwrap();
    let page =
        huddle_core::channels::messages(&store, auth.user_id, query.channel_id, query.start)?;
    Ok(Json(page))
}
