//! Workspace administration. Both operations are global-owner only and
//! protect the invariant that at least one global owner always exists.

use huddle_store::Store;
use huddle_types::models::{Permission, UserId};
use huddle_types::{Error, Result};

fn ensure_global_owner(store: &Store, user_id: UserId) -> Result<()> {
    let user = store.user(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    if !user.is_global_owner() {
        return Err(Error::insufficient_perms());
    }
    Ok(())
}

fn global_owner_count(store: &Store) -> usize {
    store.users.iter().filter(|u| u.is_global_owner()).count()
}

/// Removes a user from the workspace. Their account is scrubbed in place
/// (the id stays referenced by history), they are dropped from every chat,
/// and each of their messages reads "Removed user" afterwards. The email
/// and handle become reusable.
pub fn remove_user(store: &mut Store, actor_id: UserId, target_id: UserId) -> Result<()> {
    ensure_global_owner(store, actor_id)?;
    let target = store.user(target_id).ok_or_else(|| Error::invalid_id("user"))?;
    if target.is_removed() {
        return Err(Error::invalid_id("user"));
    }
    if target.is_global_owner() && global_owner_count(store) == 1 {
        return Err(Error::InvalidRequest("cannot remove the only global owner".into()));
    }

    for channel in &mut store.channels {
        channel.owner_ids.retain(|&id| id != target_id);
        channel.member_ids.retain(|&id| id != target_id);
        for message in &mut channel.messages {
            if message.author_id == target_id {
                message.text = "Removed user".to_string();
            }
        }
    }
    for dm in &mut store.dms {
        dm.member_ids.retain(|&id| id != target_id);
        for message in &mut dm.messages {
            if message.author_id == target_id {
                message.text = "Removed user".to_string();
            }
        }
    }

    store.drop_user_sessions(target_id);
    store.reset_requests.retain(|r| r.user_id != target_id);
    if let Some(user) = store.user_mut(target_id) {
        user.name_first = "Removed".to_string();
        user.name_last = "user".to_string();
        user.email = String::new();
        user.handle = String::new();
        user.password_hash = String::new();
        user.notifications.clear();
    }
    Ok(())
}

/// Changes a user's workspace-wide permission (1 = global owner,
/// 2 = member).
pub fn change_permission(
    store: &mut Store,
    actor_id: UserId,
    target_id: UserId,
    permission_id: u8,
) -> Result<()> {
    ensure_global_owner(store, actor_id)?;
    let permission = Permission::try_from(permission_id)
        .map_err(|_| Error::invalid_id("permission"))?;
    let target = store.user(target_id).ok_or_else(|| Error::invalid_id("user"))?;
    if target.is_removed() {
        return Err(Error::invalid_id("user"));
    }
    if target.permission == permission {
        return Err(Error::InvalidRequest("user already has that permission".into()));
    }
    if target.is_global_owner() && global_owner_count(store) == 1 {
        return Err(Error::InvalidRequest("cannot demote the only global owner".into()));
    }

    if let Some(user) = store.user_mut(target_id) {
        user.permission = permission;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth, channels, dms, messages};
    use huddle_types::models::ChatRef;

    fn setup() -> (Store, UserId, UserId) {
        let mut store = Store::default();
        let (_, a) = auth::register(&mut store, "a@example.com", "password", "Ada", "L").unwrap();
        let (_, b) = auth::register(&mut store, "b@example.com", "password", "Bob", "B").unwrap();
        (store, a, b)
    }

    #[test]
    fn only_global_owners_administer() {
        let (mut store, a, b) = setup();
        assert!(remove_user(&mut store, b, a).is_err());
        assert!(change_permission(&mut store, b, a, 2).is_err());
    }

    #[test]
    fn removal_scrubs_everywhere() {
        let (mut store, a, b) = setup();
        let ch = channels::create(&mut store, b, "general", true).unwrap();
        channels::join(&mut store, a, ch).unwrap();
        let dm = dms::create(&mut store, a, &[b]).unwrap();
        messages::send(&mut store, b, ChatRef::Channel(ch), "from bob").unwrap();
        messages::send(&mut store, a, ChatRef::Channel(ch), "from ada").unwrap();
        messages::send(&mut store, b, ChatRef::Dm(dm), "dm from bob").unwrap();

        remove_user(&mut store, a, b).unwrap();

        let channel = store.channel(ch).unwrap();
        assert!(!channel.member_ids.contains(&b));
        assert!(!channel.owner_ids.contains(&b));
        assert!(!store.dm(dm).unwrap().member_ids.contains(&b));

        // message order is untouched, only the texts were rewritten
        assert_eq!(channel.messages[0].text, "from ada");
        assert_eq!(channel.messages[1].text, "Removed user");
        assert_eq!(store.dm(dm).unwrap().messages[0].text, "Removed user");

        let scrubbed = store.user(b).unwrap();
        assert_eq!(scrubbed.name_first, "Removed");
        assert_eq!(scrubbed.name_last, "user");
        assert!(scrubbed.is_removed());

        // a second removal no longer finds an active account
        assert!(remove_user(&mut store, a, b).is_err());
    }

    #[test]
    fn removal_frees_email_and_handle() {
        let (mut store, a, b) = setup();
        remove_user(&mut store, a, b).unwrap();
        let (_, c) = auth::register(&mut store, "b@example.com", "password", "Bob", "B").unwrap();
        assert_eq!(store.user(c).unwrap().handle, "bobb");
    }

    #[test]
    fn last_global_owner_is_protected() {
        let (mut store, a, b) = setup();
        assert!(remove_user(&mut store, a, a).is_err());
        assert!(change_permission(&mut store, a, a, 2).is_err());

        change_permission(&mut store, a, b, 1).unwrap();
        // now a may step down
        change_permission(&mut store, a, a, 2).unwrap();
        assert!(!store.user(a).unwrap().is_global_owner());
    }

    #[test]
    fn permission_change_validates_input() {
        let (mut store, a, b) = setup();
        assert!(change_permission(&mut store, a, b, 3).is_err());
        assert!(change_permission(&mut store, a, b, 2).is_err());
        assert!(change_permission(&mut store, a, 9999, 1).is_err());
    }

    #[test]
    fn promoted_owner_can_administer() {
        let (mut store, a, b) = setup();
        change_permission(&mut store, a, b, 1).unwrap();
        remove_user(&mut store, b, a).unwrap();
        assert!(store.user(a).unwrap().is_removed());
    }
}
