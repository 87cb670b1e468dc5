use std::time::Duration;

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;

use huddle_types::api::{
    StandupActiveQuery, StandupActiveResponse, StandupSendRequest, StandupStartRequest,
    StandupStartResponse,
};

use huddle_core::scheduler::TaskKey;

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn start(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<Json<StandupStartResponse>> {
    let time_finish = {
        let mut store = state.store.lock().unwrap();
        huddle_core::standup::start(&mut store, auth.user_id, req.channel_id, req.length)?
    };

    let store = state.store.clone();
    let channel_id = req.channel_id;
    let starter_id = auth.user_id;
    state.scheduler.schedule(
        TaskKey::Standup { channel: channel_id },
        Duration::from_secs(req.length.max(0) as u64),
        async move {
            let mut store = store.lock().unwrap();
            huddle_core::standup::finish(&mut store, channel_id, starter_id);
        },
    );
    Ok(Json(StandupStartResponse { time_finish }))
}

pub async fn active(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<StandupActiveQuery>,
) -> ApiResult<Json<StandupActiveResponse>> {
    let store = state.store.lock().unwrap();
    let (is_active, time_finish) =
        huddle_core::standup::active(&store, auth.user_id, query.channel_id)?;
    Ok(Json(StandupActiveResponse { is_active, time_finish }))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.lock().unwrap();
    huddle_core::standup::send(&mut store, auth.user_id, req.channel_id, &req.message)?;
    Ok(empty_object())
}
