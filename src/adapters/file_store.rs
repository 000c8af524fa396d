//! File-backed key-value store.
//!
//! Each key lives in its own file under the data directory, named by the
//! percent-encoded key. Writes go to a uniquely named temp file in the same
//! directory and are renamed into place, so a crash never leaves a
//! half-written history behind and two processes sharing the directory never
//! rename each other's temp file.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// Directory under the home directory used when none is configured.
pub const DEFAULT_DATA_DIR: &str = ".chatsync";

const VALUE_EXTENSION: &str = "json";

/// File-based [`KeyValueStore`].
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `~/.chatsync`.
    pub fn new() -> Result<Self, StorageError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StorageError::Unavailable("no home directory".to_string()))?;
        Self::open(home.join(DEFAULT_DATA_DIR))
    }

    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", urlencoding::encode(key), VALUE_EXTENSION))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        let path = self.path_for(key);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock()?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
