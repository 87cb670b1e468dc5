//! Case-insensitive substring search over every message the caller can
//! see.

use huddle_store::Store;
use huddle_types::api::MessageView;
use huddle_types::models::{MAX_TEXT_LEN, UserId};
use huddle_types::{Error, Result};

use crate::conversation::Conversation;

pub fn search(store: &Store, user_id: UserId, query: &str) -> Result<Vec<MessageView>> {
    if query.trim().is_empty() {
        return Err(Error::too_short("query", 1));
    }
    if query.len() > MAX_TEXT_LEN {
        return Err(Error::too_long("query", MAX_TEXT_LEN));
    }

    let needle = query.to_lowercase();
    let channels = store.channels.iter().map(|c| c as &dyn Conversation);
    let dms = store.dms.iter().map(|d| d as &dyn Conversation);

    let hits = channels
        .chain(dms)
        .filter(|conv| conv.is_member(user_id))
        .flat_map(|conv| conv.messages())
        .filter(|m| m.text.to_lowercase().contains(&needle))
        .map(|m| MessageView::for_viewer(m, user_id))
        .collect();
    Ok(hits)
}
