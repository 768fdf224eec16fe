//! Host capabilities the store persists to and renders into.
//!
//! A [`Host`] pairs a [`Storage`] (where the persisted record lives) with a
//! [`StyleTarget`] (the root element whose class list and custom properties
//! carry the theme). Environments without a browsing context get the no-op
//! pair from [`Host::headless`] instead of branching inside every operation.
//!
//! Implementations here:
//! - [`NoopStorage`] / [`NoopStyleTarget`] - headless rendering contexts
//! - [`MemoryStorage`] / [`MemoryStyleTarget`] - in-process and inspectable
//! - [`FileStorage`] - a JSON key/value file (requires `native`)

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
#[cfg(feature = "native")]
use std::fs;
#[cfg(feature = "native")]
use std::io::ErrorKind;
#[cfg(feature = "native")]
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::trace;

use crate::error::HostError;

/// Key/value string storage, shaped after the browser `Storage` interface.
pub trait Storage {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError>;
}

/// The element whose classes and inline custom properties carry the theme.
pub trait StyleTarget {
    /// Add `class` when `force` is true, remove it otherwise.
    fn toggle_class(&self, class: &str, force: bool) -> Result<(), HostError>;

    /// Set an inline style property such as `--primary`.
    fn set_property(&self, name: &str, value: &str) -> Result<(), HostError>;

    /// Remove an inline style property.
    fn remove_property(&self, name: &str) -> Result<(), HostError>;
}

/// Storage that holds nothing and accepts every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, HostError> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), HostError> {
        Ok(())
    }
}

/// Style target that renders nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStyleTarget;

impl StyleTarget for NoopStyleTarget {
    fn toggle_class(&self, _class: &str, _force: bool) -> Result<(), HostError> {
        Ok(())
    }

    fn set_property(&self, _name: &str, _value: &str) -> Result<(), HostError> {
        Ok(())
    }

    fn remove_property(&self, _name: &str) -> Result<(), HostError> {
        Ok(())
    }
}

/// In-memory storage.
///
/// Clones share the same items, so a test can hand one clone to a store and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value before handing the storage to a store.
    pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.borrow_mut().insert(key.into(), value.into());
        self
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    /// Number of successful `set_item` calls.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent writes fail, as a full browser quota would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        if self.reject_writes.get() {
            return Err(HostError::Rejected {
                key: key.to_string(),
                reason: "writes are disabled".to_string(),
            });
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Rendered state of a [`MemoryStyleTarget`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub classes: BTreeSet<String>,
    pub properties: BTreeMap<String, String>,
}

/// In-memory style target. Clones share the same rendered state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleTarget {
    state: Rc<RefCell<StyleSnapshot>>,
}

impl MemoryStyleTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `class` is currently set.
    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    /// Returns the value of an inline property.
    pub fn property(&self, name: &str) -> Option<String> {
        self.state.borrow().properties.get(name).cloned()
    }

    /// Copy of everything rendered so far.
    pub fn snapshot(&self) -> StyleSnapshot {
        self.state.borrow().clone()
    }
}

impl StyleTarget for MemoryStyleTarget {
    fn toggle_class(&self, class: &str, force: bool) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if force {
            state.classes.insert(class.to_string());
        } else {
            state.classes.remove(class);
        }
        Ok(())
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.state
            .borrow_mut()
            .properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_property(&self, name: &str) -> Result<(), HostError> {
        self.state.borrow_mut().properties.remove(name);
        Ok(())
    }
}

/// Storage backed by a JSON object of string values in one file.
///
/// Every write rereads and rewrites the whole file. There is no locking, so
/// two processes writing the same file race.
///
/// # Availability
/// This type is only available with the `native` feature (not on WASM).
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

#[cfg(feature = "native")]
impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, HostError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(HostError::Corrupt),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(HostError::Io(err)),
        }
    }
}

#[cfg(feature = "native")]
impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&items).map_err(HostError::Corrupt)?;
        fs::write(&self.path, content)?;
        trace!(storage.path = %self.path.display(), storage.key = key, "File storage written");
        Ok(())
    }
}

/// The storage and style capabilities a store is bound to.
pub struct Host {
    storage: Box<dyn Storage>,
    style: Box<dyn StyleTarget>,
    headless: bool,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("storage", &"<dyn Storage>")
            .field("style", &"<dyn StyleTarget>")
            .field("headless", &self.headless)
            .finish()
    }
}

impl Host {
    /// Bind a store to the given capabilities.
    pub fn new(storage: impl Storage + 'static, style: impl StyleTarget + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            style: Box::new(style),
            headless: false,
        }
    }

    /// Capabilities for contexts with no browsing context: reads find
    /// nothing, writes and rendering are dropped.
    pub fn headless() -> Self {
        Self {
            storage: Box::new(NoopStorage),
            style: Box::new(NoopStyleTarget),
            headless: true,
        }
    }

    /// Returns true if this host was built by [`Host::headless`].
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn style(&self) -> &dyn StyleTarget {
        self.style.as_ref()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::headless()
    }
}
