//! Holds the role of the current user and the capabilities derived from it
//!
//! The engine is shared by the whole process. UI code either polls
//! [`PermissionEngine::snapshot`] or registers a listener with
//! [`PermissionEngine::subscribe`] and re-renders when called.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, OnceLock, Weak},
};
use stockroom_shared::{
    const_config::storage_key::STORAGE_KEY_ROLE,
    log_err_as_warn,
    uac::{Capabilities, Role},
};
use tracing::{debug, info, instrument, warn};

use crate::{KvStore, SessionStore};

static GLOBAL_ENGINE: OnceLock<PermissionEngine> = OnceLock::new();

/// Only sets the global engine if it hasn't already been set, otherwise hands
/// the engine back
pub fn init_global(engine: PermissionEngine) -> Result<(), PermissionEngine> {
    GLOBAL_ENGINE.set(engine)
}

/// The process wide engine if [`init_global`] has been called
pub fn global() -> Option<&'static PermissionEngine> {
    GLOBAL_ENGINE.get()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready(Option<Role>),
}

/// What listeners receive and what [`PermissionEngine::snapshot`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSnapshot {
    pub state: EngineState,
    /// Always `None` while loading
    pub role: Option<Role>,
    pub capabilities: Capabilities,
    /// `true` until the stored role has been read. While loading, permission
    /// gates must render nothing rather than deny
    pub is_loading: bool,
}

impl PermissionSnapshot {
    fn new(state: EngineState) -> Self {
        let (role, is_loading) = match state {
            EngineState::Ready(role) => (role, false),
            EngineState::Uninitialized | EngineState::Loading => (None, true),
        };
        Self {
            state,
            role,
            capabilities: Capabilities::for_role(role),
            is_loading,
        }
    }
}

type Listener = Arc<dyn Fn(&PermissionSnapshot) + Send + Sync>;

struct EngineInner {
    state: EngineState,
    /// Incremented on every role change, used to detect stale loads and writes
    revision: u64,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

#[derive(Clone)]
pub struct PermissionEngine {
    inner: Arc<Mutex<EngineInner>>,
    store: Arc<dyn KvStore>,
    session: SessionStore,
    /// Serializes writes of the role to storage
    persist_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Debug for PermissionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("PermissionEngine")
            .field("state", &inner.state)
            .field("revision", &inner.revision)
            .field("listener_count", &inner.listeners.len())
            .finish()
    }
}

impl PermissionEngine {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                state: EngineState::Uninitialized,
                revision: 0,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            session: SessionStore::new(Arc::clone(&store)),
            store,
            persist_lock: Default::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("mutex poisoned")
    }

    pub fn snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot::new(self.lock().state)
    }

    pub fn state(&self) -> EngineState {
        self.lock().state
    }

    pub fn role(&self) -> Option<Role> {
        self.snapshot().role
    }

    pub fn capabilities(&self) -> Capabilities {
        self.snapshot().capabilities
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    pub fn can_create(&self) -> bool {
        self.capabilities().can_create
    }

    pub fn can_access_storage(&self) -> bool {
        self.capabilities().can_access_storage
    }

    pub fn can_access_sales(&self) -> bool {
        self.capabilities().can_access_sales
    }

    pub fn can_access_audits(&self) -> bool {
        self.capabilities().can_access_audits
    }

    /// Reads the stored role. Only the first call does anything.
    ///
    /// Unknown values, read failures and a role stored without a session all
    /// result in no role. A stored role without a session is also removed. If
    /// [`Self::set_role`] is called before the read finishes the stored value
    /// is discarded.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let revision = {
            let mut inner = self.lock();
            if inner.state != EngineState::Uninitialized {
                debug!(state = ?inner.state, "load already started");
                return;
            }
            inner.state = EngineState::Loading;
            inner.revision
        };
        self.notify();

        let role = self.read_stored_role(revision).await;

        let is_applied = {
            let mut inner = self.lock();
            let is_current = inner.revision == revision;
            if is_current {
                inner.state = EngineState::Ready(role);
            }
            is_current
        };
        if is_applied {
            info!(?role, "permissions loaded");
            self.notify();
        } else {
            debug!("role changed while loading, discarding stored value");
        }
    }

    async fn read_stored_role(&self, revision: u64) -> Option<Role> {
        let stored = match self.store.get(STORAGE_KEY_ROLE).await {
            Ok(stored) => stored,
            Err(err) => {
                warn!(?err, "failed to read stored role, using no role");
                return None;
            }
        };
        let stored = stored?;
        if !self.session.has_valid_session().await {
            warn!(?stored, "role stored without a session, ignoring and removing it");
            self.remove_stale_role(revision).await;
            return None;
        }
        Role::from_optional_str(Some(&stored))
    }

    async fn remove_stale_role(&self, revision: u64) {
        let _guard = self.persist_lock.lock().await;
        if self.is_superseded(revision) {
            return;
        }
        log_err_as_warn!(self.store.remove(STORAGE_KEY_ROLE).await);
    }

    /// Changes the role in memory right away then persists it. `None` removes
    /// the stored role.
    ///
    /// Listeners are notified before this function first awaits. A failed write
    /// is logged and the in memory role is kept. When calls overlap only the
    /// latest role is written.
    #[instrument(skip(self))]
    pub async fn set_role(&self, role: Option<Role>) {
        let revision = {
            let mut inner = self.lock();
            inner.revision += 1;
            inner.state = EngineState::Ready(role);
            inner.revision
        };
        self.notify();

        let _guard = self.persist_lock.lock().await;
        if self.is_superseded(revision) {
            debug!("superseded by a newer role, skipping write");
            return;
        }
        let result = match role {
            Some(role) => {
                self.store
                    .set(STORAGE_KEY_ROLE, role.as_str().to_string())
                    .await
            }
            None => self.store.remove(STORAGE_KEY_ROLE).await,
        };
        log_err_as_warn!(result);
    }

    /// Ends the session on this device and drops the role with it
    ///
    /// The role is cleared in memory before anything is removed from storage
    /// so no listener or getter sees capabilities without a session. Safe to
    /// call without a session and never fails.
    #[instrument(skip(self))]
    pub async fn clear_session(&self) {
        self.set_role(None).await;
        self.session.clear_session().await;
    }

    fn is_superseded(&self, revision: u64) -> bool {
        self.lock().revision != revision
    }

    /// Registers a listener that is called with the new snapshot after every
    /// change. The listener stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PermissionSnapshot) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            engine: Arc::downgrade(&self.inner),
        }
    }

    /// Listeners are called outside of the lock so they may use the engine
    fn notify(&self) {
        let (snapshot, listeners) = {
            let inner = self.lock();
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (PermissionSnapshot::new(inner.state), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

/// Keeps a listener registered, see [`PermissionEngine::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    engine: Weak<Mutex<EngineInner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Removal happens in drop
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.engine.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.lock() else {
            return;
        };
        inner.listeners.retain(|(id, _)| *id != self.id);
    }
}
