//! Services implementing the workspace semantics: identity, membership,
//! messaging, notification fan-out, statistics, standups, and the deferred
//! task scheduler. Every service call takes the locked [`huddle_store::Store`]
//! plus the acting user and validates before mutating.

pub mod admin;
pub mod auth;
pub mod channels;
pub mod conversation;
pub mod dms;
pub mod messages;
pub mod notifications;
pub mod scheduler;
pub mod search;
pub mod standup;
pub mod stats;
pub mod users;

use huddle_types::models::Timestamp;

/// Current unix time in whole seconds.
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}
