// ── Durable key/value persistence ──
//
// The stores persist their state as versioned JSON envelopes through a
// small local-storage style trait. A store never fails because of storage:
// load problems start it empty, save problems are logged.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::CoreError;

pub const SELECTIONS_KEY: &str = "tripwise.selections";
pub const CURRENCY_KEY: &str = "tripwise.currency";
pub const FLIGHT_CHECKOUT_KEY: &str = "tripwise.flight-checkout";
pub const HOTEL_CHECKOUT_KEY: &str = "tripwise.hotel-checkout";

/// Local-storage contract: string values under string keys.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove_item(&self, key: &str) -> Result<(), CoreError>;
}

// ── FileStorage ─────────────────────────────────────────────────────

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CoreError::Storage {
                key: key.into(),
                source,
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let io = |source| CoreError::Storage {
            key: key.into(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(io)?;
        // Atomic replace through a uniquely named sibling temp file.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io)?;
        tmp.write_all(value.as_bytes()).map_err(io)?;
        tmp.persist(self.path_for(key))
            .map(|_| ())
            .map_err(|e| io(e.error))
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CoreError::Storage {
                key: key.into(),
                source,
            }),
        }
    }
}

// ── MemoryStorage ───────────────────────────────────────────────────

/// Process-local storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        self.items.remove(key);
        Ok(())
    }
}

// ── PersistSlot ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// A versioned slot in a [`Storage`] holding one store's state.
#[derive(Clone)]
pub struct PersistSlot {
    storage: Arc<dyn Storage>,
    key: &'static str,
    version: u32,
}

impl std::fmt::Debug for PersistSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistSlot")
            .field("key", &self.key)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl PersistSlot {
    pub fn new(storage: Arc<dyn Storage>, key: &'static str, version: u32) -> Self {
        Self {
            storage,
            key,
            version,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the slot. Missing, unreadable, corrupt, or version-mismatched
    /// state yields `None`; no migration is attempted.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = match self.storage.get_item(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to read persisted state");
                return None;
            }
        };

        let envelope: Envelope<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(env) => env,
            Err(e) => {
                warn!(key = self.key, error = %e, "discarding corrupt persisted state");
                return None;
            }
        };

        if envelope.version != self.version {
            warn!(
                key = self.key,
                found = envelope.version,
                expected = self.version,
                "persisted state version mismatch, starting empty"
            );
            return None;
        }

        match serde_json::from_value(envelope.state) {
            Ok(state) => {
                debug!(key = self.key, "restored persisted state");
                Some(state)
            }
            Err(e) => {
                warn!(key = self.key, error = %e, "persisted state does not match schema");
                None
            }
        }
    }

    /// Write the slot, logging instead of failing.
    pub fn save<T: Serialize>(&self, state: &T) {
        if let Err(e) = self.try_save(state) {
            warn!(key = self.key, error = %e, "failed to persist state");
        }
    }

    pub fn try_save<T: Serialize>(&self, state: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(&EnvelopeRef {
            version: self.version,
            state,
        })?;
        self.storage.set_item(self.key, &json)
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(self.key) {
            warn!(key = self.key, error = %e, "failed to remove persisted state");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            name: "x".into(),
            count: 3,
        }
    }

    #[test]
    fn memory_slot_round_trip() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let slot = PersistSlot::new(storage, "test.sample", 1);
        assert!(slot.load::<Sample>().is_none());

        slot.save(&sample());
        assert_eq!(slot.load::<Sample>().unwrap(), sample());

        slot.clear();
        assert!(slot.load::<Sample>().is_none());
    }

    #[test]
    fn file_storage_writes_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("nested")));
        let slot = PersistSlot::new(Arc::clone(&storage) as Arc<dyn Storage>, "test.sample", 2);

        slot.save(&sample());

        let raw = storage.get_item("test.sample").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 2);
        assert_eq!(value["state"]["count"], 3);
        assert_eq!(slot.load::<Sample>().unwrap(), sample());
    }

    #[test]
    fn version_mismatch_starts_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        PersistSlot::new(Arc::clone(&storage), "test.sample", 1).save(&sample());

        let bumped = PersistSlot::new(storage, "test.sample", 2);
        assert!(bumped.load::<Sample>().is_none());
    }

    #[test]
    fn corrupt_payload_starts_empty() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set_item("test.sample", "{not json").unwrap();
        let slot = PersistSlot::new(storage, "test.sample", 1);
        assert!(slot.load::<Sample>().is_none());
    }

    #[test]
    fn concurrent_file_writes_leave_one_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));

        std::thread::scope(|scope| {
            for n in 0..8u32 {
                let storage = Arc::clone(&storage);
                scope.spawn(move || {
                    for round in 0..20u32 {
                        let value = format!("{{\"writer\":{n},\"round\":{round}}}");
                        storage.set_item("test.sample", &value).unwrap();
                    }
                });
            }
        });

        let raw = storage.get_item("test.sample").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["round"], 19);
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["test.sample.json".to_owned()]);
    }

    #[test]
    fn removing_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove_item("nothing-here").unwrap();
        assert!(storage.get_item("nothing-here").unwrap().is_none());
    }
}
