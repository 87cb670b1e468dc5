//! The message state machine: send, deferred send, edit, remove, react,
//! pin, and share. Messages live inside their chat's newest-first list and
//! are only visible to that chat's members.

use huddle_store::Store;
use huddle_types::models::{ChatRef, MAX_TEXT_LEN, Message, MessageId, Timestamp, UserId};
use huddle_types::{Error, Result};

use crate::conversation::{self, Conversation};
use crate::{notifications, stats};

/// Finds the chat containing `message_id` among the chats the user belongs
/// to. Messages in chats the user cannot see are indistinguishable from
/// missing ones.
pub fn find_for_user(store: &Store, user_id: UserId, message_id: MessageId) -> Result<ChatRef> {
    let channels = store.channels.iter().map(|c| c as &dyn Conversation);
    let dms = store.dms.iter().map(|d| d as &dyn Conversation);
    channels
        .chain(dms)
        .find(|conv| conv.is_member(user_id) && conv.messages().iter().any(|m| m.id == message_id))
        .map(|conv| conv.chat_ref())
        .ok_or_else(|| Error::invalid_id("message"))
}

fn message_in<'a>(store: &'a Store, chat: ChatRef, message_id: MessageId) -> Result<&'a Message> {
    conversation::get(store, chat)
        .and_then(|conv| conv.messages().iter().find(|m| m.id == message_id))
        .ok_or_else(|| Error::invalid_id("message"))
}

fn message_in_mut<'a>(
    store: &'a mut Store,
    chat: ChatRef,
    message_id: MessageId,
) -> Result<&'a mut Message> {
    conversation::get_mut(store, chat)
        .and_then(|conv| conv.messages_mut().iter_mut().find(|m| m.id == message_id))
        .ok_or_else(|| Error::invalid_id("message"))
}

/// Owner-level rights in a chat: chat owner, or global owner.
fn ensure_owner_rights(store: &Store, user_id: UserId, chat: ChatRef) -> Result<()> {
    let conv = conversation::get(store, chat).ok_or_else(|| Error::invalid_id("chat"))?;
    let user = store.user(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    if conv.is_owner(user_id) || user.is_global_owner() {
        Ok(())
    } else {
        Err(Error::insufficient_perms())
    }
}

fn validate_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::too_short("message", 1));
    }
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::too_long("message", MAX_TEXT_LEN));
    }
    Ok(())
}

/// Sends a message to a chat the user belongs to.
pub fn send(store: &mut Store, user_id: UserId, chat: ChatRef, text: &str) -> Result<MessageId> {
    conversation::get_for_member(store, chat, user_id)?;
    validate_text(text)?;
    push_message(store, user_id, chat, text)
}

/// Inserts a message without length validation, scanning for tags and
/// updating the usage series. Internal sends (shares, standup summaries)
/// come through here so overlong composed text still lands.
pub(crate) fn push_message(
    store: &mut Store,
    user_id: UserId,
    chat: ChatRef,
    text: &str,
) -> Result<MessageId> {
    let id = store.alloc_id();
    let message = Message::new(id, user_id, text.to_string(), crate::now());
    let conv = conversation::get_mut(store, chat).ok_or_else(|| Error::invalid_id("chat"))?;
    conv.messages_mut().insert(0, message);

    notifications::push_tagged(store, user_id, text, chat);
    stats::push_messages_sent(store, user_id);
    stats::push_messages_exist(store);
    Ok(id)
}

/// Validates a deferred send and builds the message that will be delivered
/// once the delay elapses. The id is allocated now so the caller can hand
/// it back (and key cancellation on it) immediately; `time_sent` is the
/// requested delivery time.
pub fn prepare_scheduled(
    store: &mut Store,
    user_id: UserId,
    chat: ChatRef,
    text: &str,
    deliver_at: Timestamp,
) -> Result<Message> {
    if deliver_at < crate::now() {
        return Err(Error::InvalidRequest("send time is in the past".into()));
    }
    conversation::get_for_member(store, chat, user_id)?;
    validate_text(text)?;
    let id = store.alloc_id();
    Ok(Message::new(id, user_id, text.to_string(), deliver_at))
}

/// Lands a scheduled message. A no-op when the chat was deleted in the
/// meantime (the scheduler cancels DM tasks on removal, but a checkpoint
/// reload can race that). No tag scan happens on deferred delivery.
pub fn deliver(store: &mut Store, chat: ChatRef, message: Message) {
    let author_id = message.author_id;
    let Some(conv) = conversation::get_mut(store, chat) else {
        return;
    };
    conv.messages_mut().insert(0, message);
    stats::push_messages_sent(store, author_id);
    stats::push_messages_exist(store);
}

/// Edits a message's text. Permitted for the author, a chat owner, or a
/// global owner; an empty replacement removes the message instead. The
/// timestamp is not re-stamped, and only tags the edit introduced notify.
pub fn edit(store: &mut Store, user_id: UserId, message_id: MessageId, text: &str) -> Result<()> {
    if text.is_empty() {
        return remove(store, user_id, message_id);
    }
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::too_long("message", MAX_TEXT_LEN));
    }

    let chat = find_for_user(store, user_id, message_id)?;
    let message = message_in(store, chat, message_id)?;
    let author_id = message.author_id;
    let old_text = message.text.clone();
    if author_id != user_id {
        ensure_owner_rights(store, user_id, chat)?;
    }

    message_in_mut(store, chat, message_id)?.text = text.to_string();
    notifications::push_tag_diff(store, user_id, &old_text, text, chat);
    Ok(())
}

pub fn remove(store: &mut Store, user_id: UserId, message_id: MessageId) -> Result<()> {
    let chat = find_for_user(store, user_id, message_id)?;
    let author_id = message_in(store, chat, message_id)?.author_id;
    if author_id != user_id {
        ensure_owner_rights(store, user_id, chat)?;
    }

    if let Some(conv) = conversation::get_mut(store, chat) {
        conv.messages_mut().retain(|m| m.id != message_id);
    }
    stats::push_messages_exist(store);
    Ok(())
}

/// Adds the user to a react on a message in one of their chats. Only react
/// id 1 exists; reacting twice fails.
pub fn react(store: &mut Store, user_id: UserId, message_id: MessageId, react_id: u32) -> Result<()> {
    let chat = find_for_user(store, user_id, message_id)?;
    let author_id = message_in(store, chat, message_id)?.author_id;

    let message = message_in_mut(store, chat, message_id)?;
    let react = message
        .reacts
        .iter_mut()
        .find(|r| r.react_id == react_id)
        .ok_or_else(|| Error::invalid_id("react"))?;
    if react.user_ids.contains(&user_id) {
        return Err(Error::InvalidRequest("already reacted to this message".into()));
    }
    react.user_ids.push(user_id);

    notifications::push_reacted(store, user_id, author_id, chat);
    Ok(())
}

pub fn unreact(store: &mut Store, user_id: UserId, message_id: MessageId, react_id: u32) -> Result<()> {
    let chat = find_for_user(store, user_id, message_id)?;
    let message = message_in_mut(store, chat, message_id)?;
    let react = message
        .reacts
        .iter_mut()
        .find(|r| r.react_id == react_id)
        .ok_or_else(|| Error::invalid_id("react"))?;
    if !react.user_ids.contains(&user_id) {
        return Err(Error::InvalidRequest("no react from this user to remove".into()));
    }
    react.user_ids.retain(|&id| id != user_id);
    Ok(())
}

/// Pins a message. Requires owner rights in the containing chat.
pub fn pin(store: &mut Store, user_id: UserId, message_id: MessageId) -> Result<()> {
    let chat = find_for_user(store, user_id, message_id)?;
    ensure_owner_rights(store, user_id, chat)?;
    let message = message_in_mut(store, chat, message_id)?;
    if message.is_pinned {
        return Err(Error::InvalidRequest("message is already pinned".into()));
    }
    message.is_pinned = true;
    Ok(())
}

pub fn unpin(store: &mut Store, user_id: UserId, message_id: MessageId) -> Result<()> {
    let chat = find_for_user(store, user_id, message_id)?;
    ensure_owner_rights(store, user_id, chat)?;
    let message = message_in_mut(store, chat, message_id)?;
    if !message.is_pinned {
        return Err(Error::InvalidRequest("message is not pinned".into()));
    }
    message.is_pinned = false;
    Ok(())
}

/// Shares an existing message into another chat, with optional extra text.
/// Exactly one of `channel_id` / `dm_id` must be a real target; the other
/// is the -1 sentinel. The shared copy is a fresh message composed as
/// `{extra}\n---\n{original}\n---` and goes through the normal send path.
pub fn share(
    store: &mut Store,
    user_id: UserId,
    og_message_id: MessageId,
    extra: &str,
    channel_id: i64,
    dm_id: i64,
) -> Result<MessageId> {
    let channel_exists = channel_id >= 0 && store.channel(channel_id as u64).is_some();
    let dm_exists = dm_id >= 0 && store.dm(dm_id as u64).is_some();
    if !channel_exists && !dm_exists {
        return Err(Error::InvalidRequest("neither channel nor dm id is valid".into()));
    }
    if channel_id != -1 && dm_id != -1 {
        return Err(Error::InvalidRequest("share targets both a channel and a dm".into()));
    }

    let target = if dm_id == -1 {
        ChatRef::Channel(channel_id as u64)
    } else {
        ChatRef::Dm(dm_id as u64)
    };
    conversation::get_for_member(store, target, user_id)?;

    let og_chat = find_for_user(store, user_id, og_message_id)?;
    let og_text = message_in(store, og_chat, og_message_id)?.text.clone();
    if extra.len() > MAX_TEXT_LEN {
        return Err(Error::too_long("message", MAX_TEXT_LEN));
    }

    let composed = format!("{extra}\n---\n{og_text}\n---");
    push_message(store, user_id, target, &composed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth, channels, dms};

    fn setup() -> (Store, UserId, UserId, ChatRef) {
        let mut store = Store::default();
        let (_, a) = auth::register(&mut store, "a@example.com", "password", "Ada", "L").unwrap();
        let (_, b) = auth::register(&mut store, "b@example.com", "password", "Bob", "B").unwrap();
        let ch = channels::create(&mut store, a, "general", true).unwrap();
        channels::join(&mut store, b, ch).unwrap();
        (store, a, b, ChatRef::Channel(ch))
    }

    #[test]
    fn send_validates_membership_and_length() {
        let (mut store, a, _, chat) = setup();
        let (_, c) = auth::register(&mut store, "c@example.com", "password", "Cat", "C").unwrap();

        assert!(send(&mut store, c, chat, "hi").is_err());
        assert!(send(&mut store, a, chat, "").is_err());
        assert!(send(&mut store, a, chat, &"x".repeat(1001)).is_err());
        assert!(send(&mut store, a, chat, &"x".repeat(1000)).is_ok());
        assert!(send(&mut store, a, ChatRef::Channel(9999), "hi").is_err());
    }

    #[test]
    fn messages_are_newest_first() {
        let (mut store, a, _, chat) = setup();
        let first = send(&mut store, a, chat, "one").unwrap();
        let second = send(&mut store, a, chat, "two").unwrap();
        assert_ne!(first, second);

        let ChatRef::Channel(ch) = chat else { unreachable!() };
        let msgs = &store.channel(ch).unwrap().messages;
        assert_eq!(msgs[0].id, second);
        assert_eq!(msgs[1].id, first);
    }

    #[test]
    fn sending_a_tag_notifies_the_member() {
        let (mut store, a, b, chat) = setup();
        send(&mut store, a, chat, "hey @bobb look at this").unwrap();
        let feed = &store.user(b).unwrap().notifications;
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].message, "adal tagged you in general: hey @bobb look at th");
    }

    #[test]
    fn tag_of_a_departed_member_is_silent() {
        let (mut store, a, b, chat) = setup();
        send(&mut store, a, chat, "hi @bobb").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 1);

        let ChatRef::Channel(ch) = chat else { unreachable!() };
        channels::leave(&mut store, b, ch).unwrap();
        // the same text again, but bobb is no longer in the member set
        send(&mut store, a, chat, "hi @bobb").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 1);
    }

    #[test]
    fn find_for_user_respects_membership() {
        let (mut store, a, _, chat) = setup();
        let (_, c) = auth::register(&mut store, "c@example.com", "password", "Cat", "C").unwrap();
        let id = send(&mut store, a, chat, "secret").unwrap();
        assert!(find_for_user(&store, c, id).is_err());
        assert_eq!(find_for_user(&store, a, id).unwrap(), chat);
    }

    #[test]
    fn edit_rights_are_author_or_owner() {
        let (mut store, a, b, chat) = setup();
        let id = send(&mut store, b, chat, "typo").unwrap();

        let (_, c) = auth::register(&mut store, "c@example.com", "password", "Cat", "C").unwrap();
        let ChatRef::Channel(ch) = chat else { unreachable!() };
        channels::join(&mut store, c, ch).unwrap();
        // plain member editing someone else's message
        assert!(edit(&mut store, c, id, "hijack").is_err());

        edit(&mut store, b, id, "fixed").unwrap();
        // channel owner may edit too
        edit(&mut store, a, id, "owner fixed").unwrap();
        let msgs = &store.channel(ch).unwrap().messages;
        assert_eq!(msgs[0].text, "owner fixed");
    }

    #[test]
    fn edit_notifies_only_newly_added_tags() {
        let (mut store, a, b, chat) = setup();
        let id = send(&mut store, a, chat, "hi @bobb").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 1);

        // the tag survives the edit, so no second notification
        edit(&mut store, a, id, "hi again @bobb").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 1);

        edit(&mut store, a, id, "no tag here").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 1);

        // re-introducing the tag counts as newly added
        edit(&mut store, a, id, "back @bobb").unwrap();
        assert_eq!(store.user(b).unwrap().notifications.len(), 2);

        // timestamps survive edits
        let ChatRef::Channel(ch) = chat else { unreachable!() };
        let message = &store.channel(ch).unwrap().messages[0];
        assert_eq!(message.text, "back @bobb");
        assert_eq!(message.id, id);
    }

    #[test]
    fn empty_edit_removes() {
        let (mut store, a, _, chat) = setup();
        let id = send(&mut store, a, chat, "going away").unwrap();
        edit(&mut store, a, id, "").unwrap();
        assert!(find_for_user(&store, a, id).is_err());
    }

    #[test]
    fn remove_deletes_and_updates_workspace_count() {
        let (mut store, _a, b, chat) = setup();
        let id = send(&mut store, b, chat, "oops").unwrap();
        assert!(remove(&mut store, b, id).is_ok());
        assert!(remove(&mut store, b, id).is_err());
        assert_eq!(store.total_messages(), 0);
    }

    #[test]
    fn react_and_unreact() {
        let (mut store, a, b, chat) = setup();
        let id = send(&mut store, a, chat, "react to me").unwrap();

        assert!(react(&mut store, b, id, 2).is_err());
        react(&mut store, b, id, 1).unwrap();
        assert!(react(&mut store, b, id, 1).is_err());

        let feed = &store.user(a).unwrap().notifications;
        assert_eq!(feed[0].message, "bobb reacted to your message in general");

        unreact(&mut store, b, id, 1).unwrap();
        assert!(unreact(&mut store, b, id, 1).is_err());
    }

    #[test]
    fn react_after_the_author_left_notifies_nobody() {
        let (mut store, a, b, chat) = setup();
        let id = send(&mut store, b, chat, "parting words").unwrap();
        let ChatRef::Channel(ch) = chat else { unreachable!() };
        channels::leave(&mut store, b, ch).unwrap();

        react(&mut store, a, id, 1).unwrap();
        assert!(store.user(b).unwrap().notifications.is_empty());
    }

    #[test]
    fn pin_requires_owner_rights() {
        let (mut store, a, b, chat) = setup();
        let id = send(&mut store, b, chat, "important").unwrap();

        assert!(pin(&mut store, b, id).is_err());
        pin(&mut store, a, id).unwrap();
        assert!(pin(&mut store, a, id).is_err());

        assert!(unpin(&mut store, b, id).is_err());
        unpin(&mut store, a, id).unwrap();
        assert!(unpin(&mut store, a, id).is_err());
    }

    #[test]
    fn prepare_scheduled_rejects_past_times() {
        let (mut store, a, _, chat) = setup();
        let past = crate::now() - 10;
        assert!(prepare_scheduled(&mut store, a, chat, "later", past).is_err());
    }

    #[test]
    fn deliver_lands_prepared_message() {
        let (mut store, a, _, chat) = setup();
        let when = crate::now() + 60;
        let message = prepare_scheduled(&mut store, a, chat, "later", when).unwrap();
        let id = message.id;

        // not visible until delivery
        assert!(find_for_user(&store, a, id).is_err());
        deliver(&mut store, chat, message);
        assert_eq!(find_for_user(&store, a, id).unwrap(), chat);

        let ChatRef::Channel(ch) = chat else { unreachable!() };
        assert_eq!(store.channel(ch).unwrap().messages[0].time_sent, when);
    }

    #[test]
    fn deliver_into_deleted_chat_is_dropped() {
        let (mut store, a, b, _) = setup();
        let dm = dms::create(&mut store, a, &[b]).unwrap();
        let when = crate::now() + 60;
        let message =
            prepare_scheduled(&mut store, a, ChatRef::Dm(dm), "later", when).unwrap();

        dms::remove(&mut store, a, dm).unwrap();
        deliver(&mut store, ChatRef::Dm(dm), message);
        assert_eq!(store.total_messages(), 0);
    }

    #[test]
    fn share_composes_and_targets_one_chat() {
        let (mut store, a, b, chat) = setup();
        let ChatRef::Channel(ch) = chat else { unreachable!() };
        let og = send(&mut store, a, chat, "original").unwrap();
        let dm = dms::create(&mut store, a, &[b]).unwrap();

        assert!(share(&mut store, a, og, "", -1, -1).is_err());
        assert!(share(&mut store, a, og, "", ch as i64, dm as i64).is_err());

        let shared = share(&mut store, a, og, "fyi", -1, dm as i64).unwrap();
        let text = &store.dm(dm).unwrap().messages[0].text;
        assert_eq!(text, "fyi\n---\noriginal\n---");
        assert_ne!(shared, og);
    }

    #[test]
    fn share_requires_target_membership_and_visible_source() {
        let (mut store, a, b, chat) = setup();
        let og = send(&mut store, a, chat, "original").unwrap();
        let (_, c) = auth::register(&mut store, "c@example.com", "password", "Cat", "C").unwrap();
        let dm = dms::create(&mut store, a, &[b]).unwrap();

        // c is in neither the source channel nor the target dm
        assert!(share(&mut store, c, og, "", -1, dm as i64).is_err());
        // b is in both the source channel and the target dm
        assert!(share(&mut store, b, og, "", -1, dm as i64).is_ok());
        // a message id that does not exist
        assert!(share(&mut store, a, 9999, "", -1, dm as i64).is_err());
    }
}
