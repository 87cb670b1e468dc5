//! The single mutable aggregate behind every operation: users, channels,
//! DMs, sessions, reset codes, and workspace statistics. Handlers lock the
//! shared store, run a synchronous service call, and unlock; persistence
//! happens through explicit snapshot checkpoints, never inside mutators.

pub mod snapshot;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use huddle_types::models::{
    Channel, ChannelId, Dm, DmId, ResetRequest, Session, User, UserId, WorkspaceStats,
};

pub type SharedStore = Arc<Mutex<Store>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub users: Vec<User>,
    pub channels: Vec<Channel>,
    pub dms: Vec<Dm>,
    pub sessions: Vec<Session>,
    pub reset_requests: Vec<ResetRequest>,
    pub stats: WorkspaceStats,
    next_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            channels: Vec::new(),
            dms: Vec::new(),
            sessions: Vec::new(),
            reset_requests: Vec::new(),
            stats: WorkspaceStats::default(),
            next_id: 1,
        }
    }
}

impl Store {
    pub fn shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Allocates the next entity id. Ids are unique across users, channels,
    /// DMs, and messages.
    pub fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Resets everything to the initial state.
    pub fn reset(&mut self) {
        *self = Store::default();
    }

    // -- Users --

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn user_by_handle(&self, handle: &str) -> Option<&User> {
        self.users.iter().find(|u| u.handle == handle)
    }

    // -- Channels / DMs --

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id == id)
    }

    pub fn dm(&self, id: DmId) -> Option<&Dm> {
        self.dms.iter().find(|d| d.id == id)
    }

    pub fn dm_mut(&mut self, id: DmId) -> Option<&mut Dm> {
        self.dms.iter_mut().find(|d| d.id == id)
    }

    /// Messages alive across all channels and DMs.
    pub fn total_messages(&self) -> usize {
        let in_channels: usize = self.channels.iter().map(|c| c.messages.len()).sum();
        let in_dms: usize = self.dms.iter().map(|d| d.messages.len()).sum();
        in_channels + in_dms
    }

    // -- Sessions --

    pub fn create_session(&mut self, token_digest: String, user_id: UserId) {
        self.sessions.push(Session { token_digest, user_id });
    }

    pub fn session_user(&self, token_digest: &str) -> Option<UserId> {
        self.sessions
            .iter()
            .find(|s| s.token_digest == token_digest)
            .map(|s| s.user_id)
    }

    /// Removes one session. Returns false if the digest was unknown.
    pub fn remove_session(&mut self, token_digest: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.token_digest != token_digest);
        self.sessions.len() != before
    }

    /// Invalidates every session of one user (password reset, admin removal).
    pub fn drop_user_sessions(&mut self, user_id: UserId) {
        self.sessions.retain(|s| s.user_id != user_id);
    }
}
