//! A single polymorphic view over channels and DMs. Membership, ownership,
//! and message-list logic is shared wherever the two behave identically;
//! the variants differ only in how ownership is represented.

use huddle_store::Store;
use huddle_types::api::{MessagesPage, MessageView};
use huddle_types::models::{Channel, ChatRef, Dm, Message, UserId};
use huddle_types::{Error, Result};

/// Page size for message listings.
pub const PAGE_SIZE: usize = 50;

pub trait Conversation {
    fn chat_ref(&self) -> ChatRef;
    fn name(&self) -> &str;
    /// "channel" or "dm", for error messages.
    fn kind(&self) -> &'static str;
    fn member_ids(&self) -> &[UserId];
    fn members_mut(&mut self) -> &mut Vec<UserId>;
    /// Newest first.
    fn messages(&self) -> &[Message];
    fn messages_mut(&mut self) -> &mut Vec<Message>;
    fn is_owner(&self, user: UserId) -> bool;

    fn is_member(&self, user: UserId) -> bool {
        self.member_ids().contains(&user)
    }
}

impl Conversation for Channel {
    fn chat_ref(&self) -> ChatRef {
        ChatRef::Channel(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "channel"
    }

    fn member_ids(&self) -> &[UserId] {
        &self.member_ids
    }

    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.member_ids
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn is_owner(&self, user: UserId) -> bool {
        self.owner_ids.contains(&user)
    }
}

impl Conversation for Dm {
    fn chat_ref(&self) -> ChatRef {
        ChatRef::Dm(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "dm"
    }

    fn member_ids(&self) -> &[UserId] {
        &self.member_ids
    }

    fn members_mut(&mut self) -> &mut Vec<UserId> {
        &mut self.member_ids
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn is_owner(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

pub fn get(store: &Store, chat: ChatRef) -> Option<&dyn Conversation> {
    match chat {
        ChatRef::Channel(id) => store.channel(id).map(|c| c as &dyn Conversation),
        ChatRef::Dm(id) => store.dm(id).map(|d| d as &dyn Conversation),
    }
}

pub fn get_mut(store: &mut Store, chat: ChatRef) -> Option<&mut dyn Conversation> {
    match chat {
        ChatRef::Channel(id) => store.channel_mut(id).map(|c| c as &mut dyn Conversation),
        ChatRef::Dm(id) => store.dm_mut(id).map(|d| d as &mut dyn Conversation),
    }
}

/// Resolves a chat the acting user can see, or fails with the chat-kind's
/// invalid-id / not-a-member error.
pub fn get_for_member<'a>(
    store: &'a Store,
    chat: ChatRef,
    user: UserId,
) -> Result<&'a dyn Conversation> {
    let kind = match chat {
        ChatRef::Channel(_) => "channel",
        ChatRef::Dm(_) => "dm",
    };
    let conv = get(store, chat).ok_or_else(|| Error::invalid_id(kind))?;
    if !conv.is_member(user) {
        return Err(Error::not_member(kind));
    }
    Ok(conv)
}

/// One page of a chat's messages for a viewer, newest first. `start` past
/// the end of the list fails; `end` is -1 once the oldest message is
/// included, otherwise `start + 50`.
pub fn paginate(messages: &[Message], start: usize, viewer: UserId) -> Result<MessagesPage> {
    if start > messages.len() {
        return Err(Error::InvalidRequest(
            "start is greater than the number of messages".into(),
        ));
    }

    let upper = (start + PAGE_SIZE).min(messages.len());
    let end = if start + PAGE_SIZE >= messages.len() {
        -1
    } else {
        (start + PAGE_SIZE) as i64
    };

    let page = messages[start..upper]
        .iter()
        .map(|m| MessageView::for_viewer(m, viewer))
        .collect();

    Ok(MessagesPage { messages: page, start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: u64) -> Message {
        Message::new(id, 1, format!("m{id}"), id as i64)
    }

    #[test]
    fn paginate_short_list_ends_at_minus_one() {
        let messages: Vec<Message> = (0..3).map(msg).collect();
        let page = paginate(&messages, 0, 1).unwrap();
        assert_eq!(page.messages.len(), 3);
        assert_eq!(page.start, 0);
        assert_eq!(page.end, -1);
    }

    #[test]
    fn paginate_full_page_reports_next_start() {
        let messages: Vec<Message> = (0..60).map(msg).collect();
        let page = paginate(&messages, 0, 1).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, 50);
        // first entry is the newest
        assert_eq!(page.messages[0].message_id, 0);
    }

    #[test]
    fn paginate_exact_boundary_is_final_page() {
        let messages: Vec<Message> = (0..50).map(msg).collect();
        let page = paginate(&messages, 0, 1).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, -1);
    }

    #[test]
    fn paginate_start_past_len_fails() {
        let messages: Vec<Message> = (0..3).map(msg).collect();
        assert!(paginate(&messages, 4, 1).is_err());
        // start == len is allowed and empty
        let page = paginate(&messages, 3, 1).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.end, -1);
    }
}
