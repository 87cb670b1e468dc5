use thiserror::Error;

/// The two failure kinds every operation can surface. Validation always
/// precedes mutation, so a returned error leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The session token is missing, malformed, or expired.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad id reference, insufficient permission, out-of-range input,
    /// or a state conflict (double react, last-owner removal, ...).
    #[error("{0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_token() -> Self {
        Self::Unauthorized("token does not refer to a valid session".into())
    }

    pub fn invalid_id(what: &str) -> Self {
        Self::InvalidRequest(format!("{what} id does not refer to anything valid"))
    }

    pub fn not_member(chat: &str) -> Self {
        Self::InvalidRequest(format!("user is not a member of the {chat}"))
    }

    pub fn already_member(chat: &str) -> Self {
        Self::InvalidRequest(format!("user is already a member of the {chat}"))
    }

    pub fn insufficient_perms() -> Self {
        Self::InvalidRequest("user has insufficient permissions".into())
    }

    pub fn too_long(what: &str, max: usize) -> Self {
        Self::InvalidRequest(format!("{what} is longer than {max} characters"))
    }

    pub fn too_short(what: &str, min: usize) -> Self {
        Self::InvalidRequest(format!("{what} is shorter than {min} characters"))
    }
}
