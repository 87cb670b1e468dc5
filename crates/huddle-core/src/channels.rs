//! Channel lifecycle and membership: create, list, details, join, invite,
//! leave, and owner management. Owners are always members; the last owner
//! of a channel cannot be removed.

use huddle_store::Store;
use huddle_types::api::{ChannelDetailsResponse, ChannelSummary, MessagesPage};
use huddle_types::models::{Channel, ChannelId, ChatRef, Standup, UserId};
use huddle_types::{Error, Result};

use crate::conversation::{self, Conversation};
use crate::{notifications, stats, users};

pub fn create(store: &mut Store, user_id: UserId, name: &str, is_public: bool) -> Result<ChannelId> {
    if name.is_empty() || name.len() > 20 {
        return Err(Error::InvalidRequest("channel name must be 1 to 20 characters".into()));
    }
    let id = store.alloc_id();
    store.channels.push(Channel {
        id,
        name: name.to_string(),
        is_public,
        owner_ids: vec![user_id],
        member_ids: vec![user_id],
        messages: Vec::new(),
        standup: Standup::default(),
    });
    stats::push_channels_joined(store, user_id);
    stats::push_channels_exist(store);
    Ok(id)
}

/// Channels the user belongs to.
pub fn list(store: &Store, user_id: UserId) -> Vec<ChannelSummary> {
    store
        .channels
        .iter()
        .filter(|c| c.is_member(user_id))
        .map(|c| ChannelSummary { channel_id: c.id, name: c.name.clone() })
        .collect()
}

/// Every channel, private ones included.
pub fn list_all(store: &Store) -> Vec<ChannelSummary> {
    store
        .channels
        .iter()
        .map(|c| ChannelSummary { channel_id: c.id, name: c.name.clone() })
        .collect()
}

pub fn details(store: &Store, user_id: UserId, channel_id: ChannelId) -> Result<ChannelDetailsResponse> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(user_id) {
        return Err(Error::not_member("channel"));
    }
    Ok(ChannelDetailsResponse {
        name: channel.name.clone(),
        is_public: channel.is_public,
        owner_members: users::member_details(store, &channel.owner_ids),
        all_members: users::member_details(store, &channel.member_ids),
    })
}

/// Public channels accept anyone; private channels only global owners.
/// Joining as a global owner grants membership, never ownership.
pub fn join(store: &mut Store, user_id: UserId, channel_id: ChannelId) -> Result<()> {
    let user = store.user(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    let is_global_owner = user.is_global_owner();
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if channel.is_member(user_id) {
        return Err(Error::already_member("channel"));
    }
    if !channel.is_public && !is_global_owner {
        return Err(Error::InvalidRequest("the channel is private".into()));
    }

    if let Some(channel) = store.channel_mut(channel_id) {
        channel.member_ids.push(user_id);
    }
    stats::push_channels_joined(store, user_id);
    Ok(())
}

/// Any member may invite; the invitee joins immediately and is notified.
pub fn invite(store: &mut Store, actor_id: UserId, channel_id: ChannelId, target_id: UserId) -> Result<()> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(actor_id) {
        return Err(Error::not_member("channel"));
    }
    let target = store.user(target_id).ok_or_else(|| Error::invalid_id("user"))?;
    if target.is_removed() {
        return Err(Error::invalid_id("user"));
    }
    if channel.is_member(target_id) {
        return Err(Error::already_member("channel"));
    }
    let name = channel.name.clone();

    if let Some(channel) = store.channel_mut(channel_id) {
        channel.member_ids.push(target_id);
    }
    notifications::push_invited(store, actor_id, target_id, ChatRef::Channel(channel_id), &name);
    stats::push_channels_joined(store, target_id);
    Ok(())
}

/// Leaving also surrenders ownership. The channel may be left ownerless.
pub fn leave(store: &mut Store, user_id: UserId, channel_id: ChannelId) -> Result<()> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(user_id) {
        return Err(Error::not_member("channel"));
    }

    if let Some(channel) = store.channel_mut(channel_id) {
        channel.member_ids.retain(|&id| id != user_id);
        channel.owner_ids.retain(|&id| id != user_id);
    }
    stats::push_channels_joined(store, user_id);
    Ok(())
}

/// The actor must be a channel owner or a global owner; a global owner may
/// add an owner without being a member themselves.
pub fn add_owner(store: &mut Store, actor_id: UserId, channel_id: ChannelId, target_id: UserId) -> Result<()> {
    let actor = store.user(actor_id).ok_or_else(|| Error::invalid_id("user"))?;
    let actor_is_global = actor.is_global_owner();
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if store.user(target_id).is_none() {
        return Err(Error::invalid_id("user"));
    }
    if !channel.is_member(target_id) {
        return Err(Error::not_member("channel"));
    }
    if channel.is_owner(target_id) {
        return Err(Error::InvalidRequest("user is already an owner".into()));
    }
    if !channel.is_owner(actor_id) && !actor_is_global {
        return Err(Error::insufficient_perms());
    }

    if let Some(channel) = store.channel_mut(channel_id) {
        channel.owner_ids.push(target_id);
    }
    Ok(())
}

/// Unlike [`add_owner`], a global owner must also be a member of the
/// channel to remove an owner. Removing the last owner fails.
pub fn remove_owner(store: &mut Store, actor_id: UserId, channel_id: ChannelId, target_id: UserId) -> Result<()> {
    let actor = store.user(actor_id).ok_or_else(|| Error::invalid_id("user"))?;
    let actor_is_global = actor.is_global_owner();
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if store.user(target_id).is_none() {
        return Err(Error::invalid_id("user"));
    }
    if !channel.is_owner(target_id) {
        return Err(Error::InvalidRequest("user is not an owner".into()));
    }
    if channel.owner_ids.len() == 1 {
        return Err(Error::InvalidRequest("cannot remove the last owner".into()));
    }
    if !channel.is_owner(actor_id) && !(actor_is_global && channel.is_member(actor_id)) {
        return Err(Error::insufficient_perms());
    }

    if let Some(channel) = store.channel_mut(channel_id) {
        channel.owner_ids.retain(|&id| id != target_id);
    }
    Ok(())
}

pub fn messages(store: &Store, user_id: UserId, channel_id: ChannelId, start: usize) -> Result<MessagesPage> {
    let conv = conversation::get_for_member(store, ChatRef::Channel(channel_id), user_id)?;
    conversation::paginate(conv.messages(), start, user_id)
}
