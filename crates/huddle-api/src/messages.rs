use std::time::Duration;

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{
    MessageEditRequest, MessageIdQuery, MessageIdResponse, MessagePinRequest, MessageReactRequest,
    MessageSendDmRequest, MessageSendLaterDmRequest, MessageSendLaterRequest, MessageSendRequest,
    MessageShareRequest, MessageShareResponse,
};
use huddle_types::models::{ChatRef, Timestamp};

use huddle_core::scheduler::TaskKey;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageSendRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let mut store = state.store.lock().unwrap();
    let message_id = huddle_core::messages::send(
        &mut store,
        auth.user_id,
        ChatRef::Channel(req.channel_id),
        &req.message,
    )?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn send_dm(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageSendDmRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let mut store = state.store.lock().unwrap();
    let message_id = huddle_core::messages::send(
        &mut store,
        auth.user_id,
        ChatRef::Dm(req.dm_id),
        &req.message,
    )?;
    Ok(Json(MessageIdResponse { message_id }))
}

/// Validates now, delivers when the requested time arrives. The message id
/// is handed back immediately and keys the pending task.
fn schedule_send(
    state: &AppState,
    auth: &Auth,
    chat: ChatRef,
    text: &str,
    time_sent: Timestamp,
) -> ApiResult<MessageIdResponse> {
    let message = {
        let mut store = state.store.lock().unwrap();
        huddle_core::messages::prepare_scheduled(&mut store, auth.user_id, chat, text, time_sent)?
    };
    let message_id = message.id;
    let delay = Duration::from_secs((time_sent - huddle_core::now()).max(0) as u64);

    let store = state.store.clone();
    state.scheduler.schedule(TaskKey::Message { chat, id: message_id }, delay, async move {
        let mut store = store.lock().unwrap();
        huddle_core::messages::deliver(&mut store, chat, message);
    });
    Ok(MessageIdResponse { message_id })
}

pub async fn send_later(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageSendLaterRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let chat = ChatRef::Channel(req.channel_id);
    Ok(Json(schedule_send(&state, &auth, chat, &req.message, req.time_sent)?))
}

pub async fn send_later_dm(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageSendLaterDmRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let chat = ChatRef::Dm(req.dm_id);
    Ok(Json(schedule_send(&state, &auth, chat, &req.message, req.time_sent)?))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageEditRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::edit(&mut store, auth.user_id, req.message_id, &req.message)?;
    Ok(empty_object())
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<MessageIdQuery>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::remove(&mut store, auth.user_id, query.message_id)?;
    Ok(empty_object())
}

pub async fn react(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageReactRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::react(&mut store, auth.user_id, req.message_id, req.react_id)?;
    Ok(empty_object())
}

pub async fn unreact(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageReactRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::unreact(&mut store, auth.user_id, req.message_id, req.react_id)?;
    Ok(empty_object())
}

pub async fn pin(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessagePinRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::pin(&mut store, auth.user_id, req.message_id)?;
    Ok(empty_object())
}

pub async fn unpin(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessagePinRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::messages::unpin(&mut store, auth.user_id, req.message_id)?;
    Ok(empty_object())
}

pub async fn share(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<MessageShareRequest>,
) -> ApiResult<Json<MessageShareResponse>> {
    let mut store = state.store.lock().unwrap();
    let shared_message_id = huddle_core::messages::share(
        &mut store,
        auth.user_id,
        req.og_message_id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?;
    Ok(Json(MessageShareResponse { shared_message_id }))
}
