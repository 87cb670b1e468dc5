use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde_json::Value;
use tracing::info;

use huddle_types::api::{NotificationsResponse, NotificationView, SearchQuery, SearchResponse};

use crate::error::ApiResult;
use crate::middleware::Auth;
use crate::{AppState, empty_object};

pub async fn notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> ApiResult<Json<NotificationsResponse>> {
    let store = state.store.lock().unwrap();
    let notifications = huddle_core::notifications::get(&store, auth.user_id)?
        .iter()
        .map(NotificationView::from)
        .collect();
    Ok(Json(NotificationsResponse { notifications }))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let store = state.store.lock().unwrap();
    let messages = huddle_core::search::search(&store, auth.user_id, &query.query_str)?;
    Ok(Json(SearchResponse { messages }))
}

/// Wipes the workspace back to its initial state, aborting every pending
/// deferred task.
pub async fn clear(State(state): State<AppState>) -> Json<Value> {
    state.scheduler.clear();
    let mut store = state.store.lock().unwrap();
    store.reset();
    info!("workspace cleared");
    empty_object()
}
