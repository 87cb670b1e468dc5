//! Request and response bodies for the HTTP surface.
//!
//! Field names serialize in camelCase to match the original wire format
//! (`channelId`, `uId`, `handleStr`, ...). Chat references use `-1`
//! sentinels on the wire where no channel / DM applies.

use serde::{Deserialize, Serialize};

use crate::models::{
    ChatRef, Message, Notification, StatPoint, Timestamp, User, UserId, UserStats, WorkspaceStats,
};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub auth_user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequestBody {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetBody {
    pub reset_code: String,
    pub new_password: String,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsCreateRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsCreateResponse {
    pub channel_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub channel_id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdBody {
    pub channel_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUserBody {
    pub channel_id: u64,
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetailsQuery {
    pub channel_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetailsResponse {
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserDetails>,
    pub all_members: Vec<UserDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMessagesQuery {
    pub channel_id: u64,
    pub start: usize,
}

// -- DMs --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmCreateRequest {
    pub u_ids: Vec<UserId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmCreateResponse {
    pub dm_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmSummary {
    pub dm_id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmListResponse {
    pub dms: Vec<DmSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmIdBody {
    pub dm_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmIdQuery {
    pub dm_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmDetailsResponse {
    pub name: String,
    pub members: Vec<UserDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmMessagesQuery {
    pub dm_id: u64,
    pub start: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendRequest {
    pub channel_id: u64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendDmRequest {
    pub dm_id: u64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendLaterRequest {
    pub channel_id: u64,
    pub message: String,
    pub time_sent: Timestamp,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendLaterDmRequest {
    pub dm_id: u64,
    pub message: String,
    pub time_sent: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageIdResponse {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEditRequest {
    pub message_id: u64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageIdQuery {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReactRequest {
    pub message_id: u64,
    pub react_id: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePinRequest {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageShareRequest {
    pub og_message_id: u64,
    /// Optional text prepended to the shared message. May be empty.
    #[serde(default)]
    pub message: String,
    /// -1 when sharing to a DM.
    pub channel_id: i64,
    /// -1 when sharing to a channel.
    pub dm_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageShareResponse {
    pub shared_message_id: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactView {
    pub react_id: u32,
    pub u_ids: Vec<UserId>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub message_id: u64,
    pub u_id: UserId,
    pub message: String,
    pub time_sent: Timestamp,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

impl MessageView {
    /// Renders a message for a particular viewer, so each react carries
    /// whether the viewer is part of it.
    pub fn for_viewer(message: &Message, viewer: UserId) -> Self {
        Self {
            message_id: message.id,
            u_id: message.author_id,
            message: message.text.clone(),
            time_sent: message.time_sent,
            reacts: message
                .reacts
                .iter()
                .map(|r| ReactView {
                    react_id: r.react_id,
                    u_ids: r.user_ids.clone(),
                    is_this_user_reacted: r.user_ids.contains(&viewer),
                })
                .collect(),
            is_pinned: message.is_pinned,
        }
    }
}

/// One page of a chat's message list: up to 50 entries, newest first.
/// `end` is `start + 50`, or -1 once the oldest message was reached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesPage {
    pub messages: Vec<MessageView>,
    pub start: usize,
    pub end: i64,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub channel_id: i64,
    pub dm_id: i64,
    pub notification_message: String,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        let (channel_id, dm_id) = match n.target {
            ChatRef::Channel(id) => (id as i64, -1),
            ChatRef::Dm(id) => (-1, id as i64),
        };
        Self { channel_id, dm_id, notification_message: n.message.clone() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationView>,
}

// -- Users --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub u_id: UserId,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub profile_img_url: String,
}

impl From<&User> for UserDetails {
    fn from(u: &User) -> Self {
        Self {
            u_id: u.id,
            email: u.email.clone(),
            name_first: u.name_first.clone(),
            name_last: u.name_last.clone(),
            handle_str: u.handle.clone(),
            profile_img_url: u.profile_img_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub user: UserDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersAllResponse {
    pub users: Vec<UserDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileQuery {
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHandleRequest {
    pub handle_str: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoRequest {
    pub img_url: String,
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

// -- Stats --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsJoinedPoint {
    pub num_channels_joined: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmsJoinedPoint {
    pub num_dms_joined: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesSentPoint {
    pub num_messages_sent: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsView {
    pub channels_joined: Vec<ChannelsJoinedPoint>,
    pub dms_joined: Vec<DmsJoinedPoint>,
    pub messages_sent: Vec<MessagesSentPoint>,
    pub involvement_rate: f64,
}

impl From<&UserStats> for UserStatsView {
    fn from(s: &UserStats) -> Self {
        Self {
            channels_joined: s
                .channels_joined
                .iter()
                .map(|p| ChannelsJoinedPoint { num_channels_joined: p.value, time_stamp: p.time_stamp })
                .collect(),
            dms_joined: s
                .dms_joined
                .iter()
                .map(|p| DmsJoinedPoint { num_dms_joined: p.value, time_stamp: p.time_stamp })
                .collect(),
            messages_sent: s
                .messages_sent
                .iter()
                .map(|p| MessagesSentPoint { num_messages_sent: p.value, time_stamp: p.time_stamp })
                .collect(),
            involvement_rate: s.involvement_rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsExistPoint {
    pub num_channels_exist: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DmsExistPoint {
    pub num_dms_exist: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesExistPoint {
    pub num_messages_exist: u64,
    pub time_stamp: Timestamp,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatsView {
    pub channels_exist: Vec<ChannelsExistPoint>,
    pub dms_exist: Vec<DmsExistPoint>,
    pub messages_exist: Vec<MessagesExistPoint>,
    pub utilization_rate: f64,
}

impl From<&WorkspaceStats> for WorkspaceStatsView {
    fn from(s: &WorkspaceStats) -> Self {
        Self {
            channels_exist: s
                .channels_exist
                .iter()
                .map(|p| ChannelsExistPoint { num_channels_exist: p.value, time_stamp: p.time_stamp })
                .collect(),
            dms_exist: s
                .dms_exist
                .iter()
                .map(|p| DmsExistPoint { num_dms_exist: p.value, time_stamp: p.time_stamp })
                .collect(),
            messages_exist: s
                .messages_exist
                .iter()
                .map(|p| MessagesExistPoint { num_messages_exist: p.value, time_stamp: p.time_stamp })
                .collect(),
            utilization_rate: s.utilization_rate,
        }
    }
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupStartRequest {
    pub channel_id: u64,
    /// Standup window in seconds.
    pub length: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupStartResponse {
    pub time_finish: Timestamp,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupActiveQuery {
    pub channel_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupActiveResponse {
    pub is_active: bool,
    pub time_finish: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupSendRequest {
    pub channel_id: u64,
    pub message: String,
}

// -- Search --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query_str: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub messages: Vec<MessageView>,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRemoveQuery {
    pub u_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionChangeRequest {
    pub u_id: UserId,
    pub permission_id: u8,
}
