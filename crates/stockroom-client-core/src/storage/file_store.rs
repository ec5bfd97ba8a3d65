use futures::future::BoxFuture;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use stockroom_shared::errors::StorageError;
use tracing::{debug, instrument};

use super::KvStore;

type Entries = BTreeMap<String, String>;

/// Stores all entries in one JSON object file
///
/// Writes replace the whole file by writing a sibling temporary file and
/// renaming it over the original. All access goes through one async lock so
/// read-modify-write cycles from clones of the same store do not interleave.
/// Separate `FileStore`s over the same path are not coordinated.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Default::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    /// A missing file is the same as an empty store
    async fn read_entries(&self) -> Result<Entries, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "store file does not exist yet");
                Ok(Entries::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(entries), fields(path = ?self.path))]
    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|x| !x.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.clone();
        f(&mut entries);
        if entries == before {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

impl KvStore for FileStore {
    fn get_many<'a>(
        &'a self,
        keys: &'a [&'a str],
    ) -> BoxFuture<'a, Result<Vec<Option<String>>, StorageError>> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let entries = self.read_entries().await?;
            Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
        })
    }

    fn set_many<'a>(
        &'a self,
        entries: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(self.update(move |map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.clone());
            }
        }))
    }

    fn remove_many<'a>(&'a self, keys: &'a [&'a str]) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(self.update(move |map| {
            for key in keys {
                map.remove(*key);
            }
        }))
    }
}
