use std::sync::Arc;
use stockroom_shared::{
    const_config::storage_key::{
        all_session_keys, legacy::STORAGE_KEYS_LEGACY_SESSION, STORAGE_KEY_SESSION,
    },
    errors::StorageError,
    log_err_as_warn,
    session::{Session, StoredUser},
};
use tracing::{info, instrument, warn};

use crate::KvStore;

/// Single source of truth for "is a user authenticated"
///
/// Reads never fail: any storage problem is logged and reported as no session
/// so the user is sent back to login instead of working with a broken session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn session(&self) -> Option<Session> {
        match self.load_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(?err, "failed to read session, treating as logged out");
                None
            }
        }
    }

    /// WARNING: The bearer credential, do not log
    pub async fn token(&self) -> Option<String> {
        self.session().await.map(|x| x.token().to_string())
    }

    pub async fn user(&self) -> Option<StoredUser> {
        self.session().await.and_then(|x| x.user)
    }

    /// Only checks that a token is stored, the server is not consulted
    pub async fn has_valid_session(&self) -> bool {
        self.session().await.is_some()
    }

    #[instrument(skip(self), err(Debug))]
    pub async fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let record = serde_json::to_string(session)?;
        self.store.set(STORAGE_KEY_SESSION, record).await
    }

    /// Removes everything belonging to a session, including the role
    ///
    /// Safe to call without a session. Failures are only logged.
    /// Only reachable through [`crate::PermissionEngine::clear_session`] so the
    /// role in memory goes away together with the stored one
    #[instrument(skip(self))]
    pub(crate) async fn clear_session(&self) {
        let keys = all_session_keys();
        log_err_as_warn!(self.store.remove_many(&keys).await);
    }

    async fn load_session(&self) -> Result<Option<Session>, StorageError> {
        if let Some(record) = self.store.get(STORAGE_KEY_SESSION).await? {
            return Ok(match serde_json::from_str::<Session>(&record) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!(?err, "ignoring unreadable session record");
                    None
                }
            });
        }
        self.migrate_legacy_session().await
    }

    /// Moves a session stored one field per key into a single record
    async fn migrate_legacy_session(&self) -> Result<Option<Session>, StorageError> {
        let values = self.store.get_many(&STORAGE_KEYS_LEGACY_SESSION).await?;
        let Some(session) = Session::from_legacy_values(&values) else {
            return Ok(None);
        };
        info!("migrating session from per-field keys");
        match self.save_session(&session).await {
            Ok(()) => log_err_as_warn!(self.store.remove_many(&STORAGE_KEYS_LEGACY_SESSION).await),
            Err(err) => warn!(?err, "failed to save migrated session, keeping per-field keys"),
        }
        Ok(Some(session))
    }
}
