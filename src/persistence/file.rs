//! JSON file store for native builds
//!
//! The whole store is one JSON object. Writes go to `<path>.tmp` first and
//! are renamed over the real file, so a crash mid-write leaves the previous
//! save intact. A file that is not valid JSON is moved aside to
//! `<path>.corrupt` and the store starts empty.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::Store;
use crate::error::StoreError;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileStore {
    /// Open (or start) a store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: BTreeMap<String, Value> = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    let backup = Self::backup_path(&path);
                    log::warn!(
                        "Save file {} is corrupt ({}), moved to {} and starting fresh",
                        path.display(),
                        e,
                        backup.display()
                    );
                    fs::rename(&path, &backup)?;
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::info!("Opened save file {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable save file is kept for inspection
    pub fn backup_path(path: &Path) -> PathBuf {
        path.with_extension("corrupt")
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove_keys_matching(
        &mut self,
        predicate: &dyn Fn(&str) -> bool,
    ) -> Result<usize, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|k, _| !predicate(k));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.flush()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("hyrdle.xyz:1:level", json!(3)).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("hyrdle.xyz:1:level").unwrap(), Some(json!(3)));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("save.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("a:1:x", json!(true)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("a:1:x", json!(1)).unwrap();
        store.set("a:2:x", json!(2)).unwrap();
        assert_eq!(store.remove_keys_matching(&|k: &str| k.starts_with("a:1:")).unwrap(), 1);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a:1:x").unwrap(), None);
        assert_eq!(reopened.get("a:2:x").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_corrupt_file_is_moved_aside_and_store_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "{ truncated").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("hyrdle.xyz:1:level").unwrap(), None);
        let backup = FileStore::backup_path(&path);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ truncated");
        assert!(!path.exists());

        store.set("hyrdle.xyz:1:level", json!(2)).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("hyrdle.xyz:1:level").unwrap(), Some(json!(2)));
    }
}
