use std::fmt::{Debug, Display};

use crate::errors::ConversionError;

/// Identifier the server assigned to the user. The server sends it either as a
/// number or a string so it is kept as a (non-empty) string
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl TryFrom<String> for UserId {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        Ok(Self(value))
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Profile snapshot taken from the server at login
///
/// Only the id is required, every other field falls back to its default if
/// missing
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    /// Email or phone number
    #[serde(default)]
    pub contact: String,
    /// If the account is active
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl StoredUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            username: Default::default(),
            display_name: Default::default(),
            contact: Default::default(),
            status: false,
            created_at: Default::default(),
            updated_at: Default::default(),
        }
    }
}

/// The authenticated session as persisted on the device
///
/// The presence of a session (and therefore of the token) is the only thing
/// that means "logged in". `user` can be missing for sessions migrated from the
/// per-field layout if the profile fields never got written.
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    pub user: Option<StoredUser>,
}

impl Session {
    pub fn new(token: String, user: Option<StoredUser>) -> Result<Self, ConversionError> {
        if token.is_empty() {
            return Err(ConversionError::Empty);
        }
        Ok(Self { token, user })
    }

    /// WARNING: The bearer credential, do not log
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Builds a session from the values of
    /// [`crate::const_config::storage_key::legacy::STORAGE_KEYS_LEGACY_SESSION`]
    /// in the same order
    ///
    /// Returns `None` if there is no token. Missing profile fields are
    /// defaulted and a missing user id means no user.
    pub fn from_legacy_values(values: &[Option<String>]) -> Option<Self> {
        let get = |i: usize| values.get(i).cloned().flatten();
        let token = get(0).filter(|x| !x.is_empty())?;
        let user = get(1)
            .and_then(|id| UserId::try_from(id).ok())
            .map(|user_id| StoredUser {
                user_id,
                username: get(2).unwrap_or_default(),
                display_name: get(3).unwrap_or_default(),
                contact: get(4).unwrap_or_default(),
                status: get(5).is_some_and(|x| parse_legacy_bool(&x)),
                created_at: get(6).unwrap_or_default(),
                updated_at: get(7).unwrap_or_default(),
            });
        Some(Self { token, user })
    }
}

fn parse_legacy_bool(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

impl Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}
