use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ChannelId = u64;
pub type DmId = u64;
pub type MessageId = u64;

/// Unix timestamp in whole seconds.
pub type Timestamp = i64;

/// Maximum message / query text length.
pub const MAX_TEXT_LEN: usize = 1000;

/// Notification feeds keep only the most recent entries.
pub const NOTIFICATION_CAP: usize = 20;

/// Workspace-wide role. Serialized as the numeric permission id
/// (1 = global owner, 2 = member).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Permission {
    GlobalOwner,
    Member,
}

impl From<Permission> for u8 {
    fn from(p: Permission) -> u8 {
        match p {
            Permission::GlobalOwner => 1,
            Permission::Member => 2,
        }
    }
}

impl TryFrom<u8> for Permission {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Permission::GlobalOwner),
            2 => Ok(Permission::Member),
            other => Err(format!("invalid permission id {other}")),
        }
    }
}

/// Identifies the chat a message or notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatRef {
    Channel(ChannelId),
    Dm(DmId),
}

/// A single point of an append-only usage series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPoint {
    pub value: u64,
    pub time_stamp: Timestamp,
}

impl StatPoint {
    pub fn new(value: u64, time_stamp: Timestamp) -> Self {
        Self { value, time_stamp }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub channels_joined: Vec<StatPoint>,
    pub dms_joined: Vec<StatPoint>,
    pub messages_sent: Vec<StatPoint>,
    pub involvement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub channels_exist: Vec<StatPoint>,
    pub dms_exist: Vec<StatPoint>,
    pub messages_exist: Vec<StatPoint>,
    pub utilization_rate: f64,
}

impl Default for WorkspaceStats {
    fn default() -> Self {
        Self {
            channels_exist: vec![StatPoint::new(0, 0)],
            dms_exist: vec![StatPoint::new(0, 0)],
            messages_exist: vec![StatPoint::new(0, 0)],
            utilization_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub target: ChatRef,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub handle: String,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub password_hash: String,
    pub permission: Permission,
    pub stats: UserStats,
    pub profile_img_url: String,
    pub notifications: Vec<Notification>,
}

impl User {
    /// Removed users are scrubbed in place: their id stays referenced by
    /// historical messages, but the account can no longer be used.
    pub fn is_removed(&self) -> bool {
        self.email.is_empty()
    }

    pub fn is_global_owner(&self) -> bool {
        self.permission == Permission::GlobalOwner
    }
}

/// A per-user set of reactions of one kind on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct React {
    pub react_id: u32,
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: UserId,
    pub text: String,
    pub time_sent: Timestamp,
    pub reacts: Vec<React>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(id: MessageId, author_id: UserId, text: String, time_sent: Timestamp) -> Self {
        Self {
            id,
            author_id,
            text,
            time_sent,
            reacts: vec![React { react_id: 1, user_ids: vec![] }],
            is_pinned: false,
        }
    }
}

/// Transient standup state inside a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standup {
    pub is_active: bool,
    pub time_finish: Option<Timestamp>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub is_public: bool,
    pub owner_ids: Vec<UserId>,
    pub member_ids: Vec<UserId>,
    /// Newest first. Consumers rely on this ordering.
    pub messages: Vec<Message>,
    pub standup: Standup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dm {
    pub id: DmId,
    /// Derived at creation: sorted member handles, comma-space joined.
    pub name: String,
    /// The creator. DM ownership is single-valued and non-transferable.
    pub owner_id: UserId,
    pub member_ids: Vec<UserId>,
    /// Newest first.
    pub messages: Vec<Message>,
}

/// A live session: sha-256 digest of the bearer token, mapped to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token_digest: String,
    pub user_id: UserId,
}

/// An outstanding password-reset code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    pub user_id: UserId,
    pub code: String,
}
