//! HTTP surface. Routes map one-to-one onto the service operations; the
//! handlers lock the shared store, run a synchronous service call, and
//! translate the result. Deferred work (send-later, standup finishes) goes
//! through the scheduler held in the app state.

pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod standup;
pub mod users;
pub mod workspace;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use huddle_core::auth::ResetMailer;
use huddle_core::scheduler::Scheduler;
use huddle_core::users::ProfileImages;
use huddle_store::SharedStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: SharedStore,
    pub scheduler: Arc<Scheduler>,
    pub mailer: Arc<dyn ResetMailer>,
    pub images: Arc<dyn ProfileImages>,
}

/// Operations with nothing to report respond with an empty JSON object.
pub(crate) fn empty_object() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/passwordreset/request", post(auth::password_reset_request))
        .route("/auth/passwordreset/reset", post(auth::password_reset))
        .route("/clear", delete(workspace::clear));

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/channels/create", post(channels::create))
        .route("/channels/list", get(channels::list))
        .route("/channels/listall", get(channels::list_all))
        .route("/channel/details", get(channels::details))
        .route("/channel/join", post(channels::join))
        .route("/channel/invite", post(channels::invite))
        .route("/channel/leave", post(channels::leave))
        .route("/channel/addowner", post(channels::add_owner))
        .route("/channel/removeowner", post(channels::remove_owner))
        .route("/channel/messages", get(channels::messages))
        .route("/dm/create", post(dms::create))
        .route("/dm/list", get(dms::list))
        .route("/dm/details", get(dms::details))
        .route("/dm/leave", post(dms::leave))
        .route("/dm/remove", delete(dms::remove))
        .route("/dm/messages", get(dms::messages))
        .route("/message/send", post(messages::send))
        .route("/message/senddm", post(messages::send_dm))
        .route("/message/sendlater", post(messages::send_later))
        .route("/message/sendlaterdm", post(messages::send_later_dm))
        .route("/message/edit", put(messages::edit))
        .route("/message/remove", delete(messages::remove))
        .route("/message/react", post(messages::react))
        .route("/message/unreact", post(messages::unreact))
        .route("/message/pin", post(messages::pin))
        .route("/message/unpin", post(messages::unpin))
        .route("/message/share", post(messages::share))
        .route("/notifications/get", get(workspace::notifications))
        .route("/search", get(workspace::search))
        .route("/users/all", get(users::all))
        .route("/users/stats", get(users::workspace_stats))
        .route("/user/profile", get(users::profile))
        .route("/user/profile/setname", put(users::set_name))
        .route("/user/profile/setemail", put(users::set_email))
        .route("/user/profile/sethandle", put(users::set_handle))
        .route("/user/profile/uploadphoto", post(users::upload_photo))
        .route("/user/stats", get(users::stats))
        .route("/standup/start", post(standup::start))
        .route("/standup/active", get(standup::active))
        .route("/standup/send", post(standup::send))
        .route("/admin/user/remove", delete(admin::remove_user))
        .route("/admin/userpermission/change", post(admin::change_permission))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth));

    public.merge(protected).with_state(state)
}
