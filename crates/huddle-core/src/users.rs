//! Profile reads and edits. Removed users stay addressable through
//! `profile` (their scrubbed record is what callers see) but drop out of
//! the `all` listing.

use huddle_store::Store;
use huddle_types::api::UserDetails;
use huddle_types::models::UserId;
use huddle_types::{Error, Result};
use validator::ValidateEmail;

/// Crop rectangle for a profile photo, in pixels from the top-left.
#[derive(Debug, Clone, Copy)]
pub struct CropRect {
    pub x_start: i64,
    pub y_start: i64,
    pub x_end: i64,
    pub y_end: i64,
}

/// Collaborator that fetches, crops, and stores a profile photo, returning
/// the URL the stored copy is served from. Transport lives behind this
/// seam so the services stay synchronous.
pub trait ProfileImages: Send + Sync {
    fn store_cropped(&self, user_id: UserId, url: &str, rect: CropRect) -> Result<String>;
}

/// Records the source URL as the profile image without fetching.
pub struct PassthroughImages;

impl ProfileImages for PassthroughImages {
    fn store_cropped(&self, _user_id: UserId, url: &str, _rect: CropRect) -> Result<String> {
        Ok(url.to_string())
    }
}

/// Details for each known id, in input order. Unknown ids are skipped.
pub fn member_details(store: &Store, ids: &[UserId]) -> Vec<UserDetails> {
    ids.iter()
        .filter_map(|&id| store.user(id))
        .map(UserDetails::from)
        .collect()
}

/// A single profile. Works for removed users too.
pub fn profile(store: &Store, user_id: UserId) -> Result<UserDetails> {
    store
        .user(user_id)
        .map(UserDetails::from)
        .ok_or_else(|| Error::invalid_id("user"))
}

/// Every active user. Removed users are excluded.
pub fn all(store: &Store) -> Vec<UserDetails> {
    store
        .users
        .iter()
        .filter(|u| !u.is_removed())
        .map(UserDetails::from)
        .collect()
}

pub fn set_name(store: &mut Store, user_id: UserId, first: &str, last: &str) -> Result<()> {
    for (label, name) in [("first name", first), ("last name", last)] {
        if name.is_empty() {
            return Err(Error::too_short(label, 1));
        }
        if name.len() > 50 {
            return Err(Error::too_long(label, 50));
        }
    }
    let user = store.user_mut(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    user.name_first = first.to_string();
    user.name_last = last.to_string();
    Ok(())
}

pub fn set_email(store: &mut Store, user_id: UserId, email: &str) -> Result<()> {
    if !email.validate_email() {
        return Err(Error::InvalidRequest("email is not valid".into()));
    }
    if store.user_by_email(email).is_some_and(|u| u.id != user_id) {
        return Err(Error::InvalidRequest("email is already in use".into()));
    }
    let user = store.user_mut(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    user.email = email.to_string();
    Ok(())
}

/// Replaces the user's handle. 3 to 20 alphanumeric characters, unique.
pub fn set_handle(store: &mut Store, user_id: UserId, handle: &str) -> Result<()> {
    if handle.len() < 3 {
        return Err(Error::too_short("handle", 3));
    }
    if handle.len() > 20 {
        return Err(Error::too_long("handle", 20));
    }
    if !handle.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidRequest("handle must be alphanumeric".into()));
    }
    if store.user_by_handle(handle).is_some_and(|u| u.id != user_id) {
        return Err(Error::InvalidRequest("handle is already in use".into()));
    }
    let user = store.user_mut(user_id).ok_or_else(|| Error::invalid_id("user"))?;
    user.handle = handle.to_string();
    Ok(())
}

/// Validates and applies a new profile photo via the image collaborator.
pub fn upload_photo(
    store: &mut Store,
    images: &dyn ProfileImages,
    user_id: UserId,
    url: &str,
    rect: CropRect,
) -> Result<()> {
    if !url.ends_with(".jpg") {
        return Err(Error::InvalidRequest("image url must end in .jpg".into()));
    }
    if rect.x_start < 0 || rect.y_start < 0 {
        return Err(Error::InvalidRequest("crop origin is negative".into()));
    }
    if rect.x_end <= rect.x_start || rect.y_end <= rect.y_start {
        return Err(Error::InvalidRequest("crop rectangle is empty".into()));
    }
    store.user(user_id).ok_or_else(|| Error::invalid_id("user"))?;

    let stored_url = images.store_cropped(user_id, url, rect)?;
    if let Some(user) = store.user_mut(user_id) {
        user.profile_img_url = stored_url;
    }
    Ok(())
}
