//! Parsing of the login response. Exactly one shape is accepted:
//! `{"data": {"token": .., "usuario": {"id": .., "permisos": .., ..}}}`

use serde::Deserialize;

use super::{LoginParseError, Role};
use crate::session::{Session, StoredUser, UserId};

/// What a successful login produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub session: Session,
    /// `None` if the server sent a role that is not recognized
    pub role: Option<Role>,
}

#[derive(Deserialize)]
struct LoginEnvelope {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
    usuario: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    id: WireId,
    #[serde(default)]
    usuario: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    email_phone: Option<String>,
    #[serde(default)]
    estado: Option<bool>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    updated_at: Option<String>,
    #[serde(default)]
    permisos: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
}

impl TryFrom<WireId> for UserId {
    type Error = LoginParseError;

    fn try_from(value: WireId) -> Result<Self, Self::Error> {
        match value {
            WireId::Number(x) => Ok(x.into()),
            WireId::Text(x) => x.try_into().map_err(|_| LoginParseError::InvalidUserId),
        }
    }
}

/// Converts the body of a successful (2xx) login response into a session
///
/// A missing role falls back to [`Role::FALLBACK`], an unknown role results in
/// no role rather than an error
#[tracing::instrument(skip(body), err(Debug))]
pub fn parse_login_response(body: serde_json::Value) -> Result<LoginSession, LoginParseError> {
    let envelope: LoginEnvelope = serde_json::from_value(body)?;
    let LoginData { token, usuario } = envelope.data;
    if token.is_empty() {
        return Err(LoginParseError::MissingToken);
    }
    let role = match usuario.permisos.as_deref() {
        None => Some(Role::FALLBACK),
        value @ Some(_) => Role::from_optional_str(value),
    };
    let user = StoredUser {
        user_id: usuario.id.try_into()?,
        username: usuario.usuario.unwrap_or_default(),
        display_name: usuario.nombre.unwrap_or_default(),
        contact: usuario.email_phone.unwrap_or_default(),
        status: usuario.estado.unwrap_or_default(),
        created_at: usuario.created_at.unwrap_or_default(),
        updated_at: usuario.updated_at.unwrap_or_default(),
    };
    let session = Session::new(token, Some(user)).map_err(|_| LoginParseError::MissingToken)?;
    Ok(LoginSession { session, role })
}
