use anyhow::{bail, Context, Result};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use shared::domain::StudentRecord;

/// Slot name used when the host does not configure one.
pub const DEFAULT_STORAGE_KEY: &str = "students_registry_v1";

/// Host key-value storage: one text value per named slot.
///
/// A `set` fully replaces the previous value of the slot. Implementations are
/// driven from a single call site at a time and need no locking.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    slots: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Keeps each slot in `<base_path>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            bail!("invalid storage key '{key}'");
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read slot file '{}'", path.display()))
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.base_path).with_context(|| {
            format!(
                "failed to create storage directory '{}'",
                self.base_path.display()
            )
        })?;

        // Readers only ever see the old or the new value, never a torn write.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)
            .with_context(|| format!("failed to write '{}'", staging.display()))?;
        fs::rename(&staging, &path).with_context(|| {
            format!(
                "failed to move '{}' into place at '{}'",
                staging.display(),
                path.display()
            )
        })?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove '{}'", path.display()))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read registry slot '{key}'")]
    Read {
        key: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("registry slot '{key}' does not hold a student list")]
    Corrupt {
        key: String,
        raw_len: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Report handed to the discard hook when `load` falls back to an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedSlot {
    pub key: String,
    pub reason: String,
    /// Length of the unreadable text, when it could be read at all.
    pub raw_len: Option<usize>,
}

impl From<&LoadError> for DiscardedSlot {
    fn from(err: &LoadError) -> Self {
        match err {
            LoadError::Read { key, source } => Self {
                key: key.clone(),
                reason: format!("{source:#}"),
                raw_len: None,
            },
            LoadError::Corrupt {
                key,
                raw_len,
                source,
            } => Self {
                key: key.clone(),
                reason: source.to_string(),
                raw_len: Some(*raw_len),
            },
        }
    }
}

type DiscardHook = Box<dyn Fn(&DiscardedSlot)>;

/// The student registry as persisted in a single storage slot.
pub struct StudentStore<S> {
    backend: S,
    key: String,
    on_discard: Option<DiscardHook>,
}

impl<S: KeyValueStore> StudentStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            on_discard: None,
        }
    }

    /// Registers a callback invoked every time `load` throws away an
    /// unreadable slot.
    pub fn on_discard(mut self, hook: impl Fn(&DiscardedSlot) + 'static) -> Self {
        self.on_discard = Some(Box::new(hook));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_inner(self) -> S {
        self.backend
    }

    /// Strict load: an absent or empty slot is an empty registry, anything
    /// else must parse as a list of records.
    pub fn try_load(&self) -> Result<Vec<StudentRecord>, LoadError> {
        let raw = self
            .backend
            .get(&self.key)
            .map_err(|source| LoadError::Read {
                key: self.key.clone(),
                source,
            })?;

        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| LoadError::Corrupt {
            key: self.key.clone(),
            raw_len: raw.len(),
            source,
        })
    }

    /// Fail-soft load: unreadable storage is reported and treated as empty.
    /// The slot itself is left untouched until the next `save` or `clear`.
    pub fn load(&self) -> Vec<StudentRecord> {
        match self.try_load() {
            Ok(students) => students,
            Err(err) => {
                let discarded = DiscardedSlot::from(&err);
                warn!(
                    key = %discarded.key,
                    raw_len = ?discarded.raw_len,
                    reason = %discarded.reason,
                    "discarding unreadable student registry"
                );
                if let Some(hook) = &self.on_discard {
                    hook(&discarded);
                }
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, students: &[StudentRecord]) -> Result<()> {
        let raw =
            serde_json::to_string(students).context("failed to serialize student registry")?;
        self.backend
            .set(&self.key, &raw)
            .with_context(|| format!("failed to persist student registry to '{}'", self.key))?;
        debug!(key = %self.key, count = students.len(), "saved student registry");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.backend
            .remove(&self.key)
            .with_context(|| format!("failed to clear student registry '{}'", self.key))?;
        info!(key = %self.key, "cleared student registry");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
