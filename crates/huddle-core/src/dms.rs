//! Direct messages. A DM's member set is fixed at creation (members may
//! only leave), its name is derived from the sorted member handles, and
//! ownership stays with the creator forever.

use huddle_store::Store;
use huddle_types::api::{DmDetailsResponse, DmSummary, MessagesPage};
use huddle_types::models::{ChatRef, Dm, DmId, UserId};
use huddle_types::{Error, Result};

use crate::conversation::{self, Conversation};
use crate::{notifications, stats, users};

/// Creates a DM between the creator and `invited`. The creator must not be
/// listed; duplicate or unknown ids fail. Everyone listed is notified.
pub fn create(store: &mut Store, creator_id: UserId, invited: &[UserId]) -> Result<DmId> {
    let creator = store.user(creator_id).ok_or_else(|| Error::invalid_id("user"))?;
    let mut member_ids = vec![creator_id];
    let mut handles = vec![creator.handle.clone()];

    for &uid in invited {
        let user = store.user(uid).ok_or_else(|| Error::invalid_id("user"))?;
        if user.is_removed() {
            return Err(Error::invalid_id("user"));
        }
        if member_ids.contains(&uid) {
            return Err(Error::InvalidRequest("duplicate user in dm".into()));
        }
        member_ids.push(uid);
        handles.push(user.handle.clone());
    }

    handles.sort_unstable();
    let name = handles.join(", ");

    let id = store.alloc_id();
    store.dms.push(Dm {
        id,
        name: name.clone(),
        owner_id: creator_id,
        member_ids: member_ids.clone(),
        messages: Vec::new(),
    });

    for &uid in invited {
        notifications::push_invited(store, creator_id, uid, ChatRef::Dm(id), &name);
    }
    for uid in member_ids {
        stats::push_dms_joined(store, uid);
    }
    stats::push_dms_exist(store);
    Ok(id)
}

/// DMs the user belongs to.
pub fn list(store: &Store, user_id: UserId) -> Vec<DmSummary> {
    store
        .dms
        .iter()
        .filter(|d| d.is_member(user_id))
        .map(|d| DmSummary { dm_id: d.id, name: d.name.clone() })
        .collect()
}

pub fn details(store: &Store, user_id: UserId, dm_id: DmId) -> Result<DmDetailsResponse> {
    let dm = store.dm(dm_id).ok_or_else(|| Error::invalid_id("dm"))?;
    if !dm.is_member(user_id) {
        return Err(Error::not_member("dm"));
    }
    Ok(DmDetailsResponse {
        name: dm.name.clone(),
        members: users::member_details(store, &dm.member_ids),
    })
}

pub fn leave(store: &mut Store, user_id: UserId, dm_id: DmId) -> Result<()> {
    let dm = store.dm(dm_id).ok_or_else(|| Error::invalid_id("dm"))?;
    if !dm.is_member(user_id) {
        return Err(Error::not_member("dm"));
    }
    if let Some(dm) = store.dm_mut(dm_id) {
        dm.member_ids.retain(|&id| id != user_id);
    }
    stats::push_dms_joined(store, user_id);
    Ok(())
}

/// Deletes the DM for everyone. Only the creator may do this, and only
/// while they are still a member.
pub fn remove(store: &mut Store, user_id: UserId, dm_id: DmId) -> Result<()> {
    let dm = store.dm(dm_id).ok_or_else(|| Error::invalid_id("dm"))?;
    if !dm.is_owner(user_id) {
        return Err(Error::InvalidRequest("only the creator may remove a dm".into()));
    }
    if !dm.is_member(user_id) {
        return Err(Error::InvalidRequest("creator has already left the dm".into()));
    }

    let member_ids = dm.member_ids.clone();
    store.dms.retain(|d| d.id != dm_id);
    for uid in member_ids {
        stats::push_dms_joined(store, uid);
    }
    stats::push_messages_exist(store);
    stats::push_dms_exist(store);
    Ok(())
}

pub fn messages(store: &Store, user_id: UserId, dm_id: DmId, start: usize) -> Result<MessagesPage> {
    let conv = conversation::get_for_member(store, ChatRef::Dm(dm_id), user_id)?;
    conversation::paginate(conv.messages(), start, user_id)
}
