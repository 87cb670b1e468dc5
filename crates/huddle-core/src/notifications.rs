//! Notification fan-out. Three event kinds feed a per-user bounded feed:
//! being added to a chat, being tagged in a message, and having a message
//! reacted to. The feed keeps the newest 20 entries; overflow drops the
//! oldest silently.

use std::collections::HashSet;

use huddle_store::Store;
use huddle_types::models::{ChatRef, Notification, NOTIFICATION_CAP, User, UserId};
use huddle_types::{Error, Result};

use crate::conversation;

pub fn get(store: &Store, user_id: UserId) -> Result<Vec<Notification>> {
    let user = store.user(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    Ok(user.notifications.clone())
}

fn push(user: &mut User, notification: Notification) {
    user.notifications.insert(0, notification);
    user.notifications.truncate(NOTIFICATION_CAP);
}

/// Notifies a user they were added to a channel or DM.
pub fn push_invited(store: &mut Store, actor_id: UserId, target_id: UserId, chat: ChatRef, chat_name: &str) {
    let Some(actor_handle) = store.user(actor_id).map(|u| u.handle.clone()) else {
        return;
    };
    let message = format!("{actor_handle} added you to {chat_name}");
    if let Some(target) = store.user_mut(target_id) {
        push(target, Notification { target: chat, message });
    }
}

/// Scans message text for `@handle` tags of current chat members and
/// notifies each tagged member once. Tags are matched against the member
/// set at scan time; a tag token runs to the first non-alphanumeric
/// character and must equal a member handle exactly.
pub fn push_tagged(store: &mut Store, actor_id: UserId, text: &str, chat: ChatRef) {
    notify_tags(store, actor_id, tag_tokens(text), text, chat);
}

/// Tag scan for edits: only tags the edit introduced notify. Dropping a
/// tag notifies nobody.
pub fn push_tag_diff(store: &mut Store, actor_id: UserId, old_text: &str, new_text: &str, chat: ChatRef) {
    let mut added = tag_tokens(new_text);
    for token in tag_tokens(old_text) {
        added.remove(&token);
    }
    notify_tags(store, actor_id, added, new_text, chat);
}

fn notify_tags(store: &mut Store, actor_id: UserId, tags: HashSet<String>, text: &str, chat: ChatRef) {
    if tags.is_empty() {
        return;
    }
    let Some(conv) = conversation::get(store, chat) else {
        return;
    };
    let Some(actor_handle) = store.user(actor_id).map(|u| u.handle.clone()) else {
        return;
    };

    let chat_name = conv.name().to_string();
    let tagged: Vec<UserId> = conv
        .member_ids()
        .iter()
        .copied()
        .filter(|uid| {
            store
                .user(*uid)
                .is_some_and(|u| !u.handle.is_empty() && tags.contains(&u.handle))
        })
        .collect();

    let snippet: String = text.chars().take(20).collect();
    let message = format!("{actor_handle} tagged you in {chat_name}: {snippet}");
    for uid in tagged {
        if let Some(user) = store.user_mut(uid) {
            push(user, Notification { target: chat, message: message.clone() });
        }
    }
}

/// Notifies a message author their message was reacted to, unless they have
/// since left the chat.
pub fn push_reacted(store: &mut Store, actor_id: UserId, author_id: UserId, chat: ChatRef) {
    let Some(conv) = conversation::get(store, chat) else {
        return;
    };
    if !conv.is_member(author_id) {
        return;
    }
    let chat_name = conv.name().to_string();
    let Some(actor_handle) = store.user(actor_id).map(|u| u.handle.clone()) else {
        return;
    };
    let message = format!("{actor_handle} reacted to your message in {chat_name}");
    if let Some(author) = store.user_mut(author_id) {
        push(author, Notification { target: chat, message });
    }
}

/// Every `@` in the text starts a candidate tag: the run of alphanumeric
/// characters that follows it.
fn tag_tokens(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for (i, c) in text.char_indices() {
        if c != '@' {
            continue;
        }
        let token: String = text[i + c.len_utf8()..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        if !token.is_empty() {
            tokens.insert(token);
        }
    }
    tokens
}
