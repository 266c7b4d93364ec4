//! The key-value store that accounts and ledgers persist to.
//!
//! Keys are plain strings and values are JSON text. Both `AccountDirectory` and `LedgerStore` hold
//! a handle to the same store, so the trait takes `&self` and implementations use interior
//! mutability. Everything here is single-threaded; share a store with `Rc`.

use crate::{utils, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::trace;

/// Storage key names.
pub mod keys {
    /// The directory of users and their credentials.
    pub const USERS: &str = "users";

    /// The username of the logged-in user, absent when nobody is logged in.
    pub const CURRENT_USER: &str = "currentUser";

    pub fn expenses(username: &str) -> String {
        format!("expense_list_{username}")
    }

    pub fn income(username: &str) -> String {
        format!("income_list_{username}")
    }

    pub fn goals(username: &str) -> String {
        format!("goals_list_{username}")
    }
}

/// A string-to-string store with no transactions.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Reads and parses the JSON value stored at `key`.
pub(crate) fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        None => Ok(None),
        Some(s) => {
            trace!("read {key}: {s}");
            let value = serde_json::from_str(&s)
                .with_context(|| format!("The value stored at '{key}' could not be parsed"))?;
            Ok(Some(value))
        }
    }
}

/// Serializes `value` as JSON and stores it at `key`.
pub(crate) fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let s = serde_json::to_string(value)
        .with_context(|| format!("Unable to serialize the value for '{key}'"))?;
    store.set(key, &s)
}

/// An in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// A store that keeps each key in its own JSON file inside a directory.
///
/// Keys are mapped to file names by keeping ASCII letters, digits, `_` and `-`, and
/// percent-encoding every other byte, so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store at `dir`, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        utils::make_dir(&dir).context("Unable to create the data directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        utils::read_optional(&self.path(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        utils::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        utils::remove(&self.path(key))
    }
}

pub(crate) fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("a", "3").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        exercise(&store);
        assert_eq!(store.keys(), vec!["b".to_string()]);
    }

    #[test]
    fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();
        exercise(&store);
        assert!(store.dir().join("b.json").is_file());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        FileStore::open(dir.path()).unwrap().set("users", "{}").unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("users").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("expense_list_bob"), "expense_list_bob");
        assert_eq!(encode_key("goals_list_a.b/c"), "goals_list_a%2Eb%2Fc");
        assert_ne!(encode_key("a%2E"), encode_key("a."));
    }

    #[test]
    fn test_shared_through_rc() {
        let store = Rc::new(MemoryStore::new());
        let other = Rc::clone(&store);
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        save_json(&store, "list", &vec![1, 2, 3]).unwrap();
        let list: Vec<u32> = load_json(&store, "list").unwrap().unwrap();
        assert_eq!(list, vec![1, 2, 3]);
        store.set("bad", "not json").unwrap();
        assert!(load_json::<Vec<u32>, _>(&store, "bad").is_err());
    }

    #[test]
    fn test_keys() {
        assert_eq!(keys::expenses("sam"), "expense_list_sam");
        assert_eq!(keys::income("sam"), "income_list_sam");
        assert_eq!(keys::goals("sam"), "goals_list_sam");
    }
}
