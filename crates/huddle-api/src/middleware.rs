use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use huddle_types::Error;
use huddle_types::models::UserId;

use crate::AppState;
use crate::error::ApiError;

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`]. The raw token is kept so logout can revoke exactly
/// the session that made the call.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: UserId,
    pub token: String,
}

/// Resolves the bearer token in the `Authorization` header to a live
/// session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError(Error::invalid_token()))?
        .to_string();

    let user_id = {
        let store = state.store.lock().unwrap();
        huddle_core::auth::resolve_session(&store, &token)?
    };

    req.extensions_mut().insert(Auth { user_id, token });
    Ok(next.run(req).await)
}
