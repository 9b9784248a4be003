//! Key-value configuration storage.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::Result;

/// A section-scoped string key-value store.
///
/// This is the interface between wmdecor and wherever configuration is
/// actually persisted. Reads return `None` for keys that do not exist; it
/// is up to the caller to apply a default (see [`ConfigGroup`]).
///
/// Implementors must be `Send`, as the backend freeze watchdog persists
/// its flag from its own thread.
pub trait ConfigStore: Debug + Send {
    /// Reads the raw value of `key` in `section`.
    fn read(&self, section: &str, key: &str) -> Option<String>;

    /// Writes `value` to `key` in `section`, replacing any previous value.
    fn write(&mut self, section: &str, key: &str, value: String);

    /// Flushes pending writes to persistent storage.
    ///
    /// The default implementation does nothing.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An in-memory [`ConfigStore`], with sections and keys kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    sections: IndexMap<String, IndexMap<String, String>>,
    syncs: usize,
}

impl MemoryConfig {
    /// Creates a new, empty MemoryConfig.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a single key.
    pub fn with_entry<V: Display>(mut self, section: &str, key: &str, value: V) -> Self {
        self.write(section, key, value.to_string());
        self
    }

    /// The number of times this store has been synced.
    pub fn syncs(&self) -> usize {
        self.syncs
    }
}

impl ConfigStore for MemoryConfig {
    fn read(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section)?.get(key).cloned()
    }

    fn write(&mut self, section: &str, key: &str, value: String) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn sync(&mut self) -> Result<()> {
        self.syncs += 1;
        Ok(())
    }
}

/// A cloneable, thread-safe handle to a [`ConfigStore`].
///
/// Cloning a `SharedConfig` is shallow: every clone reads from and writes to
/// the same underlying store.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<Mutex<Box<dyn ConfigStore>>>,
}

impl SharedConfig {
    /// Wraps a ConfigStore.
    pub fn new<S: ConfigStore + 'static>(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(store) as Box<dyn ConfigStore>)),
        }
    }

    // A panic while holding the lock cannot leave a half-written string
    // behind, so a poisoned store is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Box<dyn ConfigStore>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the raw value of `key` in `section`.
    pub fn read(&self, section: &str, key: &str) -> Option<String> {
        self.lock().read(section, key)
    }

    /// Writes a value to `key` in `section`.
    pub fn write<V: Display>(&self, section: &str, key: &str, value: V) {
        self.lock().write(section, key, value.to_string())
    }

    /// Flushes the underlying store.
    pub fn sync(&self) -> Result<()> {
        self.lock().sync()
    }

    /// Returns a typed view of a single section.
    pub fn group(&self, section: &str) -> ConfigGroup {
        ConfigGroup {
            config: self.clone(),
            section: section.to_string(),
        }
    }
}

impl Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedConfig")
            .field("store", &*self.lock())
            .finish()
    }
}

/// A typed view of a single configuration section.
///
/// All reads take a default, which is returned if the key is missing
/// or if its value cannot be parsed as the requested type. Malformed values
/// are never reported as errors.
#[derive(Debug, Clone)]
pub struct ConfigGroup {
    config: SharedConfig,
    section: String,
}

impl ConfigGroup {
    /// The name of the section this group reads from.
    pub fn name(&self) -> &str {
        &self.section
    }

    /// Reads the raw string value of `key`, if present.
    pub fn read_string(&self, key: &str) -> Option<String> {
        self.config.read(&self.section, key)
    }

    /// Reads and parses `key`, returning `default` if it is missing or malformed.
    pub fn read_entry<T: FromStr>(&self, key: &str, default: T) -> T {
        self.read_string(key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Writes a value to `key`.
    pub fn write_entry<V: Display>(&self, key: &str, value: V) {
        self.config.write(&self.section, key, value)
    }

    /// Flushes the underlying store.
    pub fn sync(&self) -> Result<()> {
        self.config.sync()
    }
}
