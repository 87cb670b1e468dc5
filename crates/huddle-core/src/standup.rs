//! Channel standups. One standup can run per channel at a time; messages
//! sent into it are buffered as `handle: text` lines, and when the window
//! closes the buffer is flushed as a single summary message from the
//! starter.

use huddle_store::Store;
use huddle_types::models::{ChannelId, MAX_TEXT_LEN, Standup, Timestamp, UserId};
use huddle_types::{Error, Result};

use huddle_types::models::Message;

use crate::conversation::Conversation;
use crate::stats;

/// Starts a standup lasting `length` seconds. The caller is responsible
/// for scheduling the matching [`finish`].
pub fn start(
    store: &mut Store,
    user_id: UserId,
    channel_id: ChannelId,
    length: i64,
) -> Result<Timestamp> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(user_id) {
        return Err(Error::not_member("channel"));
    }
    if length < 0 {
        return Err(Error::InvalidRequest("standup length is negative".into()));
    }
    if channel.standup.is_active {
        return Err(Error::InvalidRequest("a standup is already active".into()));
    }

    let time_finish = crate::now() + length;
    if let Some(channel) = store.channel_mut(channel_id) {
        channel.standup = Standup {
            is_active: true,
            time_finish: Some(time_finish),
            lines: Vec::new(),
        };
    }
    Ok(time_finish)
}

/// Closes a channel's standup, posting the buffered lines as one message
/// from the starter. An empty buffer posts nothing. The summary bypasses
/// the length limit and the starter's current membership, and its tags do
/// not notify anyone.
pub fn finish(store: &mut Store, channel_id: ChannelId, starter_id: UserId) {
    let Some(channel) = store.channel_mut(channel_id) else {
        return;
    };
    let lines = std::mem::take(&mut channel.standup.lines);
    channel.standup = Standup::default();

    if lines.is_empty() {
        return;
    }
    let summary = lines.join("\n");
    let id = store.alloc_id();
    let message = Message::new(id, starter_id, summary, crate::now());
    if let Some(channel) = store.channel_mut(channel_id) {
        channel.messages.insert(0, message);
    }
    stats::push_messages_sent(store, starter_id);
    stats::push_messages_exist(store);
}

pub fn active(
    store: &Store,
    user_id: UserId,
    channel_id: ChannelId,
) -> Result<(bool, Option<Timestamp>)> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(user_id) {
        return Err(Error::not_member("channel"));
    }
    Ok((channel.standup.is_active, channel.standup.time_finish))
}

/// Buffers a line into the running standup. Buffered lines carry the
/// sender's handle and never produce tag notifications of their own.
pub fn send(store: &mut Store, user_id: UserId, channel_id: ChannelId, text: &str) -> Result<()> {
    let channel = store.channel(channel_id).ok_or_else(|| Error::invalid_id("channel"))?;
    if !channel.is_member(user_id) {
        return Err(Error::not_member("channel"));
    }
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::too_long("message", MAX_TEXT_LEN));
    }
    if !channel.standup.is_active {
        return Err(Error::InvalidRequest("no standup is active".into()));
    }

    let handle = store
        .user(user_id)
        .map(|u| u.handle.clone())
        .ok_or_else(|| Error::invalid_id("user"))?;
    if let Some(channel) = store.channel_mut(channel_id) {
        channel.standup.lines.push(format!("{handle}: {text}"));
    }
    Ok(())
}
