//! Session store persisted as a JSON object on disk
//!
//! Every mutation rewrites the whole file through a temporary file and a
//! rename, so a crash never leaves a half-written session behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use hb_core::errors::StorageError;
use hb_core::repositories::SessionStore;

/// File-backed implementation of [`SessionStore`]
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading existing entries
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is ignored with a warning and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    event = "session_file_corrupted",
                    "Ignoring unreadable session file"
                );
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Session store opened");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Apply `change` to a copy of the entries, persist it, then publish it
    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        if !change(&mut next) {
            return Ok(());
        }
        self.write_file(&next)?;
        *entries = next;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("hb-session-{}", uuid::Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let store = FileSessionStore::open(temp_path()).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let path = temp_path();
        {
            let store = FileSessionStore::open(&path).unwrap();
            store.set("token", "abc").unwrap();
            store.set("user", r#"{"id":1}"#).unwrap();
        }

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get("token").unwrap(), Some("abc".to_string()));
        assert_eq!(reopened.get("user").unwrap(), Some(r#"{"id":1}"#.to_string()));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_remove_is_persisted() {
        let path = temp_path();
        let store = FileSessionStore::open(&path).unwrap();
        store.set("phone_verified", "true").unwrap();
        store.remove("phone_verified").unwrap();

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.get("phone_verified").unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let path = temp_path();
        let store = FileSessionStore::open(&path).unwrap();
        store.set("token", "abc").unwrap();

        let dir = path.parent().unwrap();
        let names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let path = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::open(&path).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "abc").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("token"), Some(&"abc".to_string()));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
