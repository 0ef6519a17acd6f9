use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LedgerError, Result};

/// Collection keys. One persisted blob per key, replaced whole on write.
pub const PARTIES: &str = "parties";
pub const PRODUCTS: &str = "products";
pub const INVOICES: &str = "invoices";
pub const TRANSACTIONS: &str = "transactions";
pub const BUSINESS_INFO: &str = "business_info";

/// A key-value record store. Every repository operation is a full
/// read-modify-write of one collection; there is no isolation between
/// the read and the write. Single-threaded callers only.
pub trait Store {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, payload: &str) -> Result<()>;
}

/// Load a collection, defaulting to empty when the key has never been written.
pub fn load_collection<T: DeserializeOwned>(store: &impl Store, key: &str) -> Result<Vec<T>> {
    match store.read(key)? {
        Some(payload) => {
            serde_json::from_str(&payload).map_err(|e| LedgerError::CollectionParse {
                key: key.to_string(),
                source: e,
            })
        }
        None => Ok(Vec::new()),
    }
}

/// Replace a collection wholesale.
pub fn save_collection<T: Serialize>(store: &impl Store, key: &str, records: &[T]) -> Result<()> {
    let payload = serde_json::to_string_pretty(records).map_err(|e| {
        LedgerError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    store.write(key, &payload)
}

/// Get the data directory path (~/.bizledger/ or XDG data dir)
pub fn data_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "bizledger") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    // Fallback to ~/.bizledger/
    let home = dirs_home().ok_or(LedgerError::NoDataDir)?;
    Ok(home.join(".bizledger"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// File-backed store: one JSON file per collection under the data dir.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Open the default data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for JsonStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), payload)?;
        Ok(())
    }
}

/// In-memory store for tests and fakes. Not thread-safe; the crate is
/// single-threaded by design.
#[derive(Default)]
pub struct MemoryStore {
    data: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

/// Generate a fresh record identity.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
