//! Usage statistics. Membership and messaging operations append points to
//! per-user and workspace series; the involvement and utilization rates are
//! recomputed from the latest points plus live counts, never incrementally.

use huddle_store::Store;
use huddle_types::models::{StatPoint, UserId, UserStats, WorkspaceStats};
use huddle_types::{Error, Result};

use crate::conversation::Conversation;

fn latest(series: &[StatPoint]) -> u64 {
    series.last().map(|p| p.value).unwrap_or(0)
}

/// `(joined channels + joined DMs + messages sent) / (all channels + all
/// DMs + all messages)`, 0 when the workspace is empty.
fn involvement_rate(user: &UserStats, channels: usize, dms: usize, messages: usize) -> f64 {
    let numerator = latest(&user.channels_joined) + latest(&user.dms_joined) + latest(&user.messages_sent);
    let denominator = (channels + dms + messages) as u64;
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

pub fn refresh_involvement(store: &mut Store, user_id: UserId) {
    let channels = store.channels.len();
    let dms = store.dms.len();
    let messages = store.total_messages();
    if let Some(user) = store.user_mut(user_id) {
        user.stats.involvement_rate = involvement_rate(&user.stats, channels, dms, messages);
    }
}

/// Fraction of registered users whose latest joined-channels or joined-DMs
/// count is at least one.
pub fn refresh_utilization(store: &mut Store) {
    if store.users.is_empty() {
        store.stats.utilization_rate = 0.0;
        return;
    }
    let active = store
        .users
        .iter()
        .filter(|u| latest(&u.stats.channels_joined) >= 1 || latest(&u.stats.dms_joined) >= 1)
        .count();
    store.stats.utilization_rate = active as f64 / store.users.len() as f64;
}

// -- Per-user series --

pub fn push_channels_joined(store: &mut Store, user_id: UserId) {
    let count = store
        .channels
        .iter()
        .filter(|c| c.is_member(user_id))
        .count() as u64;
    let time = crate::now();
    if let Some(user) = store.user_mut(user_id) {
        user.stats.channels_joined.push(StatPoint::new(count, time));
    }
    refresh_involvement(store, user_id);
    refresh_utilization(store);
}

pub fn push_dms_joined(store: &mut Store, user_id: UserId) {
    let count = store.dms.iter().filter(|d| d.is_member(user_id)).count() as u64;
    let time = crate::now();
    if let Some(user) = store.user_mut(user_id) {
        user.stats.dms_joined.push(StatPoint::new(count, time));
    }
    refresh_involvement(store, user_id);
    refresh_utilization(store);
}

pub fn push_messages_sent(store: &mut Store, user_id: UserId) {
    let time = crate::now();
    if let Some(user) = store.user_mut(user_id) {
        let next = latest(&user.stats.messages_sent) + 1;
        user.stats.messages_sent.push(StatPoint::new(next, time));
    }
    refresh_involvement(store, user_id);
}

// -- Workspace series --

pub fn push_channels_exist(store: &mut Store) {
    let point = StatPoint::new(store.channels.len() as u64, crate::now());
    store.stats.channels_exist.push(point);
    refresh_utilization(store);
}

pub fn push_dms_exist(store: &mut Store) {
    let point = StatPoint::new(store.dms.len() as u64, crate::now());
    store.stats.dms_exist.push(point);
    refresh_utilization(store);
}

pub fn push_messages_exist(store: &mut Store) {
    let point = StatPoint::new(store.total_messages() as u64, crate::now());
    store.stats.messages_exist.push(point);
    refresh_utilization(store);
}

// -- Reads --

pub fn user_stats(store: &mut Store, user_id: UserId) -> Result<UserStats> {
    refresh_involvement(store, user_id);
    store
        .user(user_id)
        .map(|u| u.stats.clone())
        .ok_or_else(|| Error::invalid_id("user"))
}

pub fn workspace_stats(store: &mut Store) -> WorkspaceStats {
    refresh_utilization(store);
    store.stats.clone()
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
    fn registration_seeds_zero_series() {
        let (store, a, _) = setup();
        let stats = &store.user(a).unwrap().stats;
        assert_eq!(stats.channels_joined.len(), 1);
        assert_eq!(stats.channels_joined[0].value, 0);
        assert_eq!(stats.dms_joined[0].value, 0);
        assert_eq!(stats.messages_sent[0].value, 0);
        assert_eq!(stats.involvement_rate, 0.0);
    }

    #[test]
    fn series_append_on_join_and_send() {
        let (mut store, a, _) = setup();
        let ch = channels::create(&mut store, a, "general", true).unwrap();
        messages::send(&mut store, a, ChatRef::Channel(ch), "hello").unwrap();

        let stats = user_stats(&mut store, a).unwrap();
        assert_eq!(latest(&stats.channels_joined), 1);
        assert_eq!(latest(&stats.messages_sent), 1);
        // one channel + one message in the workspace, two of which are a's
        assert!((stats.involvement_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn involvement_clamps_to_zero_on_empty_workspace() {
        let (mut store, a, _) = setup();
        let stats = user_stats(&mut store, a).unwrap();
        assert_eq!(stats.involvement_rate, 0.0);
    }

    #[test]
    fn leave_appends_decreased_point() {
        let (mut store, a, b) = setup();
        let ch = channels::create(&mut store, a, "general", true).unwrap();
        channels::join(&mut store, b, ch).unwrap();
        channels::leave(&mut store, b, ch).unwrap();

        let stats = user_stats(&mut store, b).unwrap();
        let values: Vec<u64> = stats.channels_joined.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 1, 0]);
    }

    #[test]
    fn utilization_counts_users_in_any_chat() {
        let (mut store, a, b) = setup();
        assert_eq!(workspace_stats(&mut store).utilization_rate, 0.0);

        channels::create(&mut store, a, "general", true).unwrap();
        assert!((workspace_stats(&mut store).utilization_rate - 0.5).abs() < 1e-9);

        dms::create(&mut store, a, &[b]).unwrap();
        assert!((workspace_stats(&mut store).utilization_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn workspace_series_track_existence() {
        let (mut store, a, b) = setup();
        channels::create(&mut store, a, "general", true).unwrap();
        let dm = dms::create(&mut store, a, &[b]).unwrap();
        messages::send(&mut store, a, ChatRef::Dm(dm), "hi").unwrap();
        dms::remove(&mut store, a, dm).unwrap();

        let stats = workspace_stats(&mut store);
        assert_eq!(latest(&stats.channels_exist), 1);
        assert_eq!(latest(&stats.dms_exist), 0);
        // the dm's message died with it
        assert_eq!(latest(&stats.messages_exist), 0);
    }
}
