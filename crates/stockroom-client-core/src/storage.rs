//! Durable string key-value storage on the device
//!
//! Batch operations are the primitives so implementations can save round
//! trips. Nothing here is transactional across keys, callers that need
//! atomicity must keep the data under a single key.

use futures::future::BoxFuture;
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex},
};
use stockroom_shared::errors::StorageError;

mod file_store;

pub use file_store::FileStore;

pub trait KvStore: Send + Sync + Debug {
    /// Returns the values in the same order as `keys`, `None` for missing keys
    fn get_many<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Vec<Option<String>>, StorageError>>;

    fn set_many<'a>(
        &'a self,
        entries: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Removing a key that does not exist is not an error
    fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<(), StorageError>>;

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move {
            let keys = [key];
            Ok(self.get_many(&keys).await?.pop().flatten())
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let entries = [(key, value)];
            self.set_many(&entries).await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let keys = [key];
            self.remove_many(&keys).await
        })
    }
}

/// Keeps everything in memory, nothing survives the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

impl KvStore for MemoryStore {
    fn get_many<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Vec<Option<String>>, StorageError>> {
        let result: Result<Vec<Option<String>>, StorageError> = self
            .lock()
            .map(|entries| keys.iter().map(|key| entries.get(*key).cloned()).collect());
        Box::pin(futures::future::ready(result))
    }

    fn set_many<'a>(
        &'a self,
        entries: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        let result = self.lock().map(|mut map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.clone());
            }
        });
        Box::pin(futures::future::ready(result))
    }

    fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<(), StorageError>> {
        let result = self.lock().map(|mut map| {
            for key in keys {
                map.remove(*key);
            }
        });
        Box::pin(futures::future::ready(result))
    }
}
