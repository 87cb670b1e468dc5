//! Registration, login, sessions, and password reset. Passwords are hashed
//! with Argon2id; bearer tokens are stored only as sha-256 digests.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

use huddle_store::Store;
use huddle_types::models::{Permission, StatPoint, User, UserId, UserStats};
use huddle_types::{Error, Result};

use crate::stats;

pub const DEFAULT_PROFILE_URL: &str = "/static/profile/default.jpg";

/// Delivers password-reset codes. Actual transport (SMTP or otherwise) is a
/// deployment concern; the default implementation only logs.
pub trait ResetMailer: Send + Sync {
    fn send_reset_code(&self, email: &str, code: &str);
}

pub struct LogMailer;

impl ResetMailer for LogMailer {
    fn send_reset_code(&self, email: &str, code: &str) {
        info!(email, code, "password reset code issued");
    }
}

pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| Error::InvalidRequest("could not hash password".into()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Resolves a bearer token to the user behind it.
pub fn resolve_session(store: &Store, token: &str) -> Result<UserId> {
    store
        .session_user(&digest_token(token))
        .ok_or_else(Error::invalid_token)
}

/// Creates a fresh session token for a user and records its digest.
fn create_token(store: &mut Store, user_id: UserId) -> String {
    let token = Uuid::new_v4().simple().to_string();
    store.create_session(digest_token(&token), user_id);
    token
}

fn validate_registration(store: &Store, email: &str, password: &str, first: &str, last: &str) -> Result<()> {
    if first.is_empty() || first.len() > 50 {
        return Err(Error::InvalidRequest("first name must be 1 to 50 characters".into()));
    }
    if last.is_empty() || last.len() > 50 {
        return Err(Error::InvalidRequest("last name must be 1 to 50 characters".into()));
    }
    if password.len() < 6 {
        return Err(Error::too_short("password", 6));
    }
    if !email.validate_email() {
        return Err(Error::InvalidRequest("email is not valid".into()));
    }
    if store.user_by_email(email).is_some() {
        return Err(Error::InvalidRequest("email is already in use".into()));
    }
    Ok(())
}

/// Lowercased, alphanumeric-only first+last name, truncated to 20 chars,
/// then suffixed with the smallest non-negative integer that makes it
/// unique. The collision walk is prefix-based: a longer handle that merely
/// starts with the base never forces a suffix.
fn derive_handle(store: &Store, first: &str, last: &str) -> String {
    let base: String = format!("{}{}", first.to_lowercase(), last.to_lowercase())
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(20)
        .collect();

    let mut taken: Vec<&str> = store
        .users
        .iter()
        .map(|u| u.handle.as_str())
        .filter(|h| h.starts_with(&base))
        .collect();
    taken.sort_unstable();

    let mut suffix: i64 = -1;
    let mut candidate = base.clone();
    for handle in taken {
        if candidate == handle {
            suffix += 1;
        }
        if suffix >= 0 {
            candidate = format!("{base}{suffix}");
        }
    }
    candidate
}

/// Registers a new user and opens a session. The first user ever created is
/// the global owner; everyone after is a regular member.
pub fn register(
    store: &mut Store,
    email: &str,
    password: &str,
    name_first: &str,
    name_last: &str,
) -> Result<(String, UserId)> {
    validate_registration(store, email, password, name_first, name_last)?;

    let handle = derive_handle(store, name_first, name_last);
    let permission = if store.users.is_empty() {
        Permission::GlobalOwner
    } else {
        Permission::Member
    };

    let time = crate::now();
    let zero = StatPoint::new(0, time);
    let user = User {
        id: store.alloc_id(),
        handle,
        email: email.to_string(),
        name_first: name_first.to_string(),
        name_last: name_last.to_string(),
        password_hash: hash_password(password)?,
        permission,
        stats: UserStats {
            channels_joined: vec![zero],
            dms_joined: vec![zero],
            messages_sent: vec![zero],
            involvement_rate: 0.0,
        },
        profile_img_url: DEFAULT_PROFILE_URL.to_string(),
        notifications: Vec::new(),
    };
    let user_id = user.id;
    store.users.push(user);
    stats::refresh_utilization(store);

    let token = create_token(store, user_id);
    Ok((token, user_id))
}

pub fn login(store: &mut Store, email: &str, password: &str) -> Result<(String, UserId)> {
    let user = store
        .user_by_email(email)
        .ok_or_else(|| Error::InvalidRequest("email does not belong to a user".into()))?;
    if !verify_password(password, &user.password_hash) {
        return Err(Error::InvalidRequest("password is incorrect".into()));
    }
    let user_id = user.id;
    let token = create_token(store, user_id);
    Ok((token, user_id))
}

pub fn logout(store: &mut Store, token: &str) -> Result<()> {
    if !store.remove_session(&digest_token(token)) {
        return Err(Error::invalid_token());
    }
    Ok(())
}

/// Records a reset code and invalidates the user's sessions. Unknown emails
/// are a silent no-op so the endpoint cannot be used to probe accounts.
pub fn password_reset_request(store: &mut Store, email: &str, mailer: &dyn ResetMailer) {
    let Some(user) = store.user_by_email(email) else {
        return;
    };
    let user_id = user.id;
    let code = Uuid::new_v4().simple().to_string();
    store
        .reset_requests
        .push(huddle_types::models::ResetRequest { user_id, code: code.clone() });
    store.drop_user_sessions(user_id);
    mailer.send_reset_code(email, &code);
}

pub fn password_reset(store: &mut Store, code: &str, new_password: &str) -> Result<()> {
    let index = store
        .reset_requests
        .iter()
        .position(|r| r.code == code)
        .ok_or_else(|| Error::InvalidRequest("reset code is not valid".into()))?;
    if new_password.len() < 6 {
        return Err(Error::too_short("password", 6));
    }

    let request = store.reset_requests.remove(index);
    let hash = hash_password(new_password)?;
    if let Some(user) = store.user_mut(request.user_id) {
        user.password_hash = hash;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_ok(store: &mut Store, email: &str, first: &str, last: &str) -> UserId {
        let (_, id) = register(store, email, "password", first, last).unwrap();
        id
    }

    #[test]
    fn first_user_is_global_owner() {
        let mut store = Store::default();
        let a = register_ok(&mut store, "a@example.com", "Ada", "Lovelace");
        let b = register_ok(&mut store, "b@example.com", "Bob", "Byrne");
        assert_eq!(store.user(a).unwrap().permission, Permission::GlobalOwner);
        assert_eq!(store.user(b).unwrap().permission, Permission::Member);
    }

    #[test]
    fn rejects_bad_input() {
        let mut store = Store::default();
        assert!(register(&mut store, "not-an-email", "password", "A", "B").is_err());
        assert!(register(&mut store, "a@example.com", "short", "A", "B").is_err());
        assert!(register(&mut store, "a@example.com", "password", "", "B").is_err());
        assert!(register(&mut store, "a@example.com", "password", "A", &"x".repeat(51)).is_err());

        register_ok(&mut store, "a@example.com", "Ada", "Lovelace");
        let dup = register(&mut store, "a@example.com", "password", "A", "B");
        assert!(dup.is_err());
    }

    #[test]
    fn handle_strips_and_truncates() {
        let mut store = Store::default();
        let id = register_ok(&mut store, "a@example.com", "Ada-Marie!", "O'Lovelace");
        assert_eq!(store.user(id).unwrap().handle, "adamarieolovelace");

        let long = register_ok(&mut store, "b@example.com", "Abcdefghijklm", "Nopqrstuvwxyz");
        assert_eq!(store.user(long).unwrap().handle, "abcdefghijklmnopqrst");
        assert_eq!(store.user(long).unwrap().handle.len(), 20);
    }

    #[test]
    fn handle_collisions_append_smallest_suffix() {
        let mut store = Store::default();
        let a = register_ok(&mut store, "a@example.com", "Bob", "Byrne");
        let b = register_ok(&mut store, "b@example.com", "Bob", "Byrne");
        let c = register_ok(&mut store, "c@example.com", "Bob", "Byrne");
        assert_eq!(store.user(a).unwrap().handle, "bobbyrne");
        assert_eq!(store.user(b).unwrap().handle, "bobbyrne0");
        assert_eq!(store.user(c).unwrap().handle, "bobbyrne1");
    }

    #[test]
    fn similar_longer_handle_does_not_force_suffix() {
        let mut store = Store::default();
        // "bobbyrnes" starts with "bobbyrne" but is not equal to it
        register_ok(&mut store, "a@example.com", "Bob", "Byrnes");
        let b = register_ok(&mut store, "b@example.com", "Bob", "Byrne");
        assert_eq!(store.user(b).unwrap().handle, "bobbyrne");
    }

    #[test]
    fn login_and_logout_roundtrip() {
        let mut store = Store::default();
        let id = register_ok(&mut store, "a@example.com", "Ada", "Lovelace");

        let (token, login_id) = login(&mut store, "a@example.com", "password").unwrap();
        assert_eq!(login_id, id);
        assert_eq!(resolve_session(&store, &token).unwrap(), id);

        logout(&mut store, &token).unwrap();
        assert!(resolve_session(&store, &token).is_err());
        assert!(logout(&mut store, &token).is_err());
    }

    #[test]
    fn login_rejects_wrong_password() {
        let mut store = Store::default();
        register_ok(&mut store, "a@example.com", "Ada", "Lovelace");
        assert!(login(&mut store, "a@example.com", "wrong-pass").is_err());
        assert!(login(&mut store, "missing@example.com", "password").is_err());
    }

    #[test]
    fn password_reset_invalidates_sessions_and_changes_password() {
        let mut store = Store::default();
        let (token, _) = register(&mut store, "a@example.com", "password", "Ada", "L").unwrap();

        password_reset_request(&mut store, "a@example.com", &LogMailer);
        assert!(resolve_session(&store, &token).is_err());

        let code = store.reset_requests[0].code.clone();
        assert!(password_reset(&mut store, &code, "short").is_err());
        password_reset(&mut store, &code, "newpassword").unwrap();
        // code is consumed
        assert!(password_reset(&mut store, &code, "newpassword").is_err());

        assert!(login(&mut store, "a@example.com", "password").is_err());
        assert!(login(&mut store, "a@example.com", "newpassword").is_ok());
    }

    #[test]
    fn reset_request_for_unknown_email_is_a_noop() {
        let mut store = Store::default();
        password_reset_request(&mut store, "ghost@example.com", &LogMailer);
        assert!(store.reset_requests.is_empty());
    }
}
