use std::{fmt::Display, str::FromStr};

use strum::IntoEnumIterator as _;

use super::UnknownRole;

/// The role assigned to a user by the server
///
/// Parsing is exact, anything other than the four known strings is an
/// [`UnknownRole`] and must never be mapped onto a role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Seller,
    Editor,
}

impl Role {
    /// Role used when the server does not send one
    pub const FALLBACK: Self = Self::Seller;

    /// The value as stored and as sent by the server
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parses a stored or server provided value treating unknown values as no
    /// role
    #[tracing::instrument(ret)]
    pub fn from_optional_str(value: Option<&str>) -> Option<Self> {
        let value = value?;
        match value.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(?e, "ignoring unknown role");
                None
            }
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
