//! The theme store.
//!
//! A [`ThemeStore`] owns the [`ThemeState`] for one page or app session. It
//! renders the state into its [`Host`]'s style target and persists the
//! three durable fields to the host's storage.
//!
//! # Example
//!
//! ```rust
//! use dashtheme::{Host, MemoryStorage, MemoryStyleTarget, StoreConfig, ThemeStore};
//!
//! let storage = MemoryStorage::new();
//! let root = MemoryStyleTarget::new();
//! let mut store = ThemeStore::new(
//!     Host::new(storage.clone(), root.clone()),
//!     StoreConfig::default(),
//! );
//! store.init().unwrap();
//!
//! store.toggle_theme();
//! assert!(root.has_class("dark"));
//! assert!(storage.get("dashboard-theme").unwrap().contains("\"isDark\":true"));
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, trace, warn};

use crate::color::Color;
use crate::config::{StoreConfig, ThemeDefaults};
use crate::error::{ConfigError, StoreError};
use crate::host::Host;
use crate::notification::{Clock, DEFAULT_NOTIFICATION_TYPE, Notification, SystemClock};
use crate::palette::{Palette, SHADE_KEYS, shade_property};
use crate::record::PersistedRecord;

/// Theme and preference state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    pub is_dark: bool,
    pub primary_color: Color,
    /// Never persisted and never rendered.
    pub secondary_color: Color,
    pub sidebar_collapsed: bool,
    /// In append order. Never persisted.
    pub notifications: Vec<Notification>,
}

impl ThemeState {
    /// State built from configured defaults, with no notifications.
    pub fn from_defaults(defaults: &ThemeDefaults) -> Self {
        Self {
            is_dark: defaults.is_dark,
            primary_color: defaults.primary_color.clone(),
            secondary_color: defaults.secondary_color.clone(),
            sidebar_collapsed: defaults.sidebar_collapsed,
            notifications: Vec::new(),
        }
    }

    /// The subset of this state that is written to storage.
    pub fn record(&self) -> PersistedRecord {
        PersistedRecord {
            is_dark: self.is_dark,
            primary_color: self.primary_color.clone(),
            sidebar_collapsed: self.sidebar_collapsed,
        }
    }

    fn apply_record(&mut self, record: PersistedRecord) {
        self.is_dark = record.is_dark;
        self.primary_color = record.primary_color;
        self.sidebar_collapsed = record.sidebar_collapsed;
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::from_defaults(&ThemeDefaults::default())
    }
}

/// Identifier for a registered change listener.
///
/// Ids are never reused by a store, including across
/// [`teardown`](ThemeStore::teardown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// The raw id, for handing across an FFI boundary.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ListenerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<ListenerId> for u64 {
    fn from(id: ListenerId) -> Self {
        id.0
    }
}

type Listener = Box<dyn Fn(&ThemeState)>;

/// Theme state bound to a host.
///
/// All operations run synchronously on the caller's thread. Mutating
/// operations persist and render on a best-effort basis: host failures are
/// logged, not returned. Call [`save`](Self::save) or
/// [`apply_theme`](Self::apply_theme) directly to observe them.
pub struct ThemeStore {
    state: ThemeState,
    config: StoreConfig,
    host: Host,
    clock: Box<dyn Clock>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("host", &self.host)
            .field("listeners", &format!("{} listeners", self.listeners.len()))
            .finish()
    }
}

impl ThemeStore {
    /// Create a store holding the configured defaults.
    ///
    /// Nothing is read or rendered until [`init`](Self::init). The config is
    /// used as given; call [`StoreConfig::validate`] first or use
    /// [`try_new`](Self::try_new) for configs built by hand or loaded from
    /// user input.
    pub fn new(host: Host, config: StoreConfig) -> Self {
        let state = ThemeState::from_defaults(&config.defaults);
        Self {
            state,
            config,
            host,
            clock: Box::new(SystemClock),
            listeners: Vec::new(),
            next_listener_id: 1,
        }
    }

    /// Create a store after validating `config`.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the config fails
    /// [`StoreConfig::validate`].
    pub fn try_new(host: Host, config: StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(host, config))
    }

    /// Create a store that neither persists nor renders.
    pub fn headless() -> Self {
        Self::new(Host::headless(), StoreConfig::default())
    }

    /// Replace the clock used to stamp notifications.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &ThemeState {
        &self.state
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn is_dark(&self) -> bool {
        self.state.is_dark
    }

    pub fn primary_color(&self) -> &Color {
        &self.state.primary_color
    }

    pub fn secondary_color(&self) -> &Color {
        &self.state.secondary_color
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.sidebar_collapsed
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.state.notifications
    }

    /// Load the persisted record and render the theme.
    ///
    /// An absent or empty record keeps the current values. Fields missing
    /// from a record take their configured defaults.
    ///
    /// # Errors
    /// Returns `StoreError::Record` if the stored JSON is malformed (state is
    /// left untouched and nothing is rendered), unless
    /// `recover_corrupt_record` is set. Returns `StoreError::Host` if storage
    /// cannot be read or the theme cannot be rendered.
    pub fn init(&mut self) -> Result<(), StoreError> {
        let key = &self.config.storage_key;
        match self.host.storage().get_item(key)? {
            Some(raw) if !raw.is_empty() => {
                match PersistedRecord::parse(&raw, &self.config.defaults) {
                    Ok(record) => {
                        debug!(
                            store.key = %key,
                            theme.is_dark = record.is_dark,
                            theme.primary = %record.primary_color,
                            "Persisted theme loaded"
                        );
                        self.state.apply_record(record);
                    }
                    Err(err) if self.config.recover_corrupt_record => {
                        warn!(store.key = %key, error = %err, "Ignoring malformed persisted theme");
                    }
                    Err(err) => return Err(StoreError::Record(err)),
                }
            }
            _ => debug!(store.key = %key, "No persisted theme"),
        }

        self.apply_theme()?;
        info!(
            theme.is_dark = self.state.is_dark,
            theme.primary = %self.state.primary_color,
            host.headless = self.host.is_headless(),
            "Theme store initialized"
        );
        self.notify_listeners();
        Ok(())
    }

    /// Flip dark mode, render, and persist. Returns the new value.
    pub fn toggle_theme(&mut self) -> bool {
        self.state.is_dark = !self.state.is_dark;
        info!(theme.is_dark = self.state.is_dark, "Theme toggled");
        self.render();
        self.persist();
        self.notify_listeners();
        self.state.is_dark
    }

    /// Set the primary color, render, and persist.
    ///
    /// The color is not validated. A value that is not `#rrggbb` still
    /// becomes `--primary`, but leaves the shade properties as they were.
    pub fn set_primary_color(&mut self, color: impl Into<Color>) {
        let color = color.into();
        if color.as_rgb().is_none() {
            debug!(theme.primary = %color, "Primary color is not #rrggbb");
        }
        info!(theme.from = %self.state.primary_color, theme.to = %color, "Primary color set");
        self.state.primary_color = color;
        self.render();
        self.persist();
        self.notify_listeners();
    }

    /// Flip the sidebar state and persist. Returns the new value.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.state.sidebar_collapsed = !self.state.sidebar_collapsed;
        debug!(sidebar.collapsed = self.state.sidebar_collapsed, "Sidebar toggled");
        self.persist();
        self.notify_listeners();
        self.state.sidebar_collapsed
    }

    /// Append a notification and persist. Returns its id.
    ///
    /// `kind` defaults to `"info"`. Persisting writes only the record fields,
    /// so the notification itself stays in memory.
    pub fn add_notification(&mut self, message: impl Into<String>, kind: Option<&str>) -> i64 {
        let notification = Notification::new(
            message,
            kind.unwrap_or(DEFAULT_NOTIFICATION_TYPE),
            self.clock.now(),
        );
        let id = notification.id;
        debug!(notification.id = id, notification.kind = %notification.kind, "Notification added");
        self.state.notifications.push(notification);
        self.persist();
        self.notify_listeners();
        id
    }

    /// Remove every notification with `id`. Does not persist.
    pub fn remove_notification(&mut self, id: i64) {
        let before = self.state.notifications.len();
        self.state.notifications.retain(|n| n.id != id);
        let removed = before - self.state.notifications.len();
        debug!(notification.id = id, notification.removed = removed, "Notification removed");
        self.notify_listeners();
    }

    /// Render the dark class and primary color properties.
    ///
    /// Sets `--primary` to the raw color and, when it parses as `#rrggbb`,
    /// `--primary-50` through `--primary-850`.
    ///
    /// # Errors
    /// Returns `StoreError::Host` if the style target rejects a change.
    pub fn apply_theme(&self) -> Result<(), StoreError> {
        let style = self.host.style();
        let prefix = &self.config.property_prefix;
        style.toggle_class(&self.config.dark_class, self.state.is_dark)?;
        style.set_property(prefix, self.state.primary_color.as_str())?;

        if let Some(palette) = Palette::from_color(&self.state.primary_color) {
            for (name, value) in palette.css_properties(prefix) {
                style.set_property(&name, &value)?;
            }
        }
        trace!(theme.is_dark = self.state.is_dark, theme.primary = %self.state.primary_color, "Theme applied");
        Ok(())
    }

    /// Write the persisted record to storage.
    ///
    /// # Errors
    /// Returns `StoreError::Serialize` if the record cannot be encoded, or
    /// `StoreError::Host` if storage rejects the write.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = self
            .state
            .record()
            .to_json()
            .map_err(StoreError::Serialize)?;
        self.host
            .storage()
            .set_item(&self.config.storage_key, &json)?;
        trace!(store.key = %self.config.storage_key, "Theme persisted");
        Ok(())
    }

    /// Register a listener called with the state after every change.
    ///
    /// A listener that panics is logged and skipped. This relies on
    /// unwinding: under `panic = "abort"` (the release profile) and on
    /// wasm32 a panicking listener aborts the process instead.
    pub fn on_change<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&ThemeState) + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(callback)));
        debug!(theme.listener_id = id.0, "Theme listener registered");
        id
    }

    /// Remove a listener by id.
    pub fn remove_listener(&mut self, id: ListenerId) {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        if self.listeners.len() != before {
            debug!(theme.listener_id = id.0, "Theme listener removed");
        }
    }

    /// Undo what the store rendered and release its listeners.
    ///
    /// Removes the dark class and every primary color property, and clears
    /// notifications. The persisted record is left as it is.
    ///
    /// # Errors
    /// Returns `StoreError::Host` if the style target rejects a change.
    pub fn teardown(&mut self) -> Result<(), StoreError> {
        let style = self.host.style();
        let prefix = &self.config.property_prefix;
        style.toggle_class(&self.config.dark_class, false)?;
        style.remove_property(prefix)?;
        for key in SHADE_KEYS {
            style.remove_property(&shade_property(prefix, key))?;
        }
        self.state.notifications.clear();
        self.listeners.clear();
        info!("Theme store torn down");
        Ok(())
    }

    fn render(&self) {
        if let Err(err) = self.apply_theme() {
            warn!(error = %err, "Failed to apply theme");
        }
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            warn!(store.key = %self.config.storage_key, error = %err, "Failed to persist theme");
        }
    }

    fn notify_listeners(&self) {
        for (id, listener) in &self.listeners {
            let result = catch_unwind(AssertUnwindSafe(|| listener(&self.state)));
            if result.is_err() {
                warn!(theme.listener_id = id.0, "Theme listener panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryStorage, MemoryStyleTarget};
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const KEY: &str = "dashboard-theme";

    fn fixture() -> (ThemeStore, MemoryStorage, MemoryStyleTarget) {
        let storage = MemoryStorage::new();
        let root = MemoryStyleTarget::new();
        let store = ThemeStore::new(
            Host::new(storage.clone(), root.clone()),
            StoreConfig::default(),
        );
        (store, storage, root)
    }

    fn stored_json(storage: &MemoryStorage) -> serde_json::Value {
        let raw = storage.get(KEY).expect("record written");
        serde_json::from_str(&raw).expect("record is json")
    }

    fn ticking_clock(start_ms: i64) -> impl Fn() -> DateTime<Utc> {
        let tick = Cell::new(start_ms);
        move || {
            let ms = tick.get();
            tick.set(ms + 1);
            Utc.timestamp_millis_opt(ms).single().expect("valid timestamp")
        }
    }

    #[test]
    fn test_new_store_has_defaults() {
        let (store, storage, root) = fixture();
        assert!(!store.is_dark());
        assert_eq!(store.primary_color().as_str(), "#3b82f6");
        assert_eq!(store.secondary_color().as_str(), "#8b5cf6");
        assert!(!store.sidebar_collapsed());
        assert!(store.notifications().is_empty());
        // Construction touches neither storage nor the root element.
        assert_eq!(storage.write_count(), 0);
        assert!(root.snapshot().properties.is_empty());
    }

    #[test]
    fn test_init_without_record_renders_defaults() {
        let (mut store, storage, root) = fixture();
        store.init().expect("init");
        assert!(!root.has_class("dark"));
        assert_eq!(root.property("--primary").as_deref(), Some("#3b82f6"));
        assert_eq!(
            root.property("--primary-850").as_deref(),
            Some("rgb(90, 198, 375)")
        );
        assert_eq!(root.snapshot().properties.len(), 10);
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_init_loads_record() {
        let storage = MemoryStorage::new().with_item(
            KEY,
            r##"{"isDark":true,"primaryColor":"#ff0000","sidebarCollapsed":true}"##,
        );
        let root = MemoryStyleTarget::new();
        let mut store =
            ThemeStore::new(Host::new(storage, root.clone()), StoreConfig::default());
        store.init().expect("init");

        assert!(store.is_dark());
        assert!(store.sidebar_collapsed());
        assert!(root.has_class("dark"));
        assert_eq!(root.property("--primary-50").as_deref(), Some("rgb(71, 0, 0)"));
    }

    #[test]
    fn test_init_empty_string_is_absent() {
        let storage = MemoryStorage::new().with_item(KEY, "");
        let mut store = ThemeStore::new(
            Host::new(storage, MemoryStyleTarget::new()),
            StoreConfig::default(),
        );
        store.init().expect("empty record is skipped");
        assert!(!store.is_dark());
    }

    #[test]
    fn test_init_malformed_record_fails_without_rendering() {
        let storage = MemoryStorage::new().with_item(KEY, "{oops");
        let root = MemoryStyleTarget::new();
        let mut store =
            ThemeStore::new(Host::new(storage, root.clone()), StoreConfig::default());
        let err = store.init().unwrap_err();
        assert!(matches!(err, StoreError::Record(_)));
        assert!(root.snapshot().properties.is_empty());
        assert_eq!(store.state(), &ThemeState::default());
    }

    #[test]
    fn test_init_recovers_when_configured() {
        let storage = MemoryStorage::new().with_item(KEY, "{oops");
        let root = MemoryStyleTarget::new();
        let config = StoreConfig::default().with_recover_corrupt_record(true);
        let mut store = ThemeStore::new(Host::new(storage, root.clone()), config);
        store.init().expect("recovered");
        assert_eq!(root.property("--primary").as_deref(), Some("#3b82f6"));
    }

    #[test]
    fn test_toggle_theme_twice() {
        let (mut store, storage, root) = fixture();
        store.init().expect("init");
        assert!(store.toggle_theme());
        assert!(root.has_class("dark"));
        assert_eq!(stored_json(&storage)["isDark"], true);

        assert!(!store.toggle_theme());
        assert!(!root.has_class("dark"));
        assert_eq!(storage.write_count(), 2);
        assert_eq!(stored_json(&storage)["isDark"], false);
    }

    #[test]
    fn test_set_primary_color_renders_and_persists() {
        let (mut store, storage, root) = fixture();
        store.set_primary_color("#ff0000");
        assert_eq!(root.property("--primary").as_deref(), Some("#ff0000"));
        assert_eq!(root.property("--primary-850").as_deref(), Some("rgb(389, 0, 0)"));
        assert_eq!(stored_json(&storage)["primaryColor"], "#ff0000");
    }

    #[test]
    fn test_invalid_primary_color_keeps_palette() {
        let (mut store, storage, root) = fixture();
        store.set_primary_color("#ff0000");
        let before = root.property("--primary-450");

        store.set_primary_color("#f00");
        assert_eq!(root.property("--primary").as_deref(), Some("#f00"));
        assert_eq!(root.property("--primary-450"), before);
        assert_eq!(stored_json(&storage)["primaryColor"], "#f00");
    }

    #[test]
    fn test_toggle_sidebar_persists_without_rendering() {
        let (mut store, storage, root) = fixture();
        assert!(store.toggle_sidebar());
        assert_eq!(stored_json(&storage)["sidebarCollapsed"], true);
        assert!(root.snapshot().properties.is_empty());
    }

    #[test]
    fn test_record_excludes_memory_only_fields() {
        let (mut store, storage, _root) = fixture();
        store.add_notification("hello", None);
        let json = stored_json(&storage);
        let obj = json.as_object().expect("object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["isDark", "primaryColor", "sidebarCollapsed"]);
    }

    #[test]
    fn test_add_and_remove_notification() {
        let (store, storage, _root) = fixture();
        let mut store = store.with_clock(ticking_clock(1_000));
        let first = store.add_notification("Saved", None);
        let second = store.add_notification("Failed", Some("error"));
        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);
        assert_eq!(store.notifications()[1].kind, "error");
        assert_eq!(store.notifications()[0].kind, "info");
        assert_eq!(storage.write_count(), 2);

        store.remove_notification(first);
        assert_eq!(store.notifications().len(), 1);
        assert_eq!(store.notifications()[0].id, second);
        // Removal does not persist.
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_remove_drops_every_matching_id() {
        let fixed = Utc.timestamp_millis_opt(7).single().expect("valid timestamp");
        let mut store = ThemeStore::headless().with_clock(move || fixed);
        store.add_notification("a", None);
        store.add_notification("b", None);
        assert_eq!(store.notifications().len(), 2);
        store.remove_notification(7);
        assert!(store.notifications().is_empty());
        store.remove_notification(7);
    }

    #[test]
    fn test_save_failure_is_best_effort() {
        let (mut store, storage, root) = fixture();
        storage.set_reject_writes(true);
        assert!(store.toggle_theme());
        assert!(root.has_class("dark"));
        assert!(storage.get(KEY).is_none());
        assert!(matches!(store.save(), Err(StoreError::Host(_))));
    }

    #[test]
    fn test_listeners_see_changes() {
        let (mut store, _storage, _root) = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.on_change(move |state| sink.borrow_mut().push(state.is_dark));

        store.toggle_theme();
        store.toggle_theme();
        store.remove_listener(id);
        store.toggle_theme();
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let (mut store, _storage, _root) = fixture();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        store.on_change(|_| panic!("listener failure"));
        store.on_change(move |_| counter.set(counter.get() + 1));
        store.toggle_sidebar();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_teardown_clears_rendering() {
        let (mut store, storage, root) = fixture();
        store.init().expect("init");
        store.toggle_theme();
        store.add_notification("bye", None);
        store.teardown().expect("teardown");

        assert!(!root.has_class("dark"));
        assert!(root.snapshot().properties.is_empty());
        assert!(store.notifications().is_empty());
        // The record survives teardown.
        assert_eq!(stored_json(&storage)["isDark"], true);
    }

    #[test]
    fn test_listener_ids_survive_teardown() {
        let (mut store, _storage, _root) = fixture();
        let stale = store.on_change(|_| {});
        store.teardown().expect("teardown");

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let fresh = store.on_change(move |_| counter.set(counter.get() + 1));
        assert_ne!(stale, fresh);

        // A handle from before teardown must not remove the new listener.
        store.remove_listener(ListenerId::from(stale.as_u64()));
        store.toggle_theme();
        assert_eq!(calls.get(), 1);

        store.remove_listener(ListenerId::from(u64::from(fresh)));
        store.toggle_theme();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_try_new_validates_config() {
        let config = StoreConfig {
            property_prefix: String::new(),
            ..StoreConfig::default()
        };
        let err = ThemeStore::try_new(Host::headless(), config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let store = ThemeStore::try_new(Host::headless(), StoreConfig::default());
        assert!(store.is_ok());
    }

    #[test]
    fn test_headless_store_is_inert() {
        let mut store = ThemeStore::headless();
        store.init().expect("init");
        store.toggle_theme();
        store.set_primary_color("#000000");
        assert!(store.is_dark());
        assert!(store.host().is_headless());
        store.save().expect("noop save");
    }

    #[test]
    fn test_custom_config_names() {
        let storage = MemoryStorage::new();
        let root = MemoryStyleTarget::new();
        let config = StoreConfig {
            dark_class: "theme-dark".into(),
            property_prefix: "--accent".into(),
            ..StoreConfig::default().with_storage_key("ops")
        };
        let mut store = ThemeStore::new(Host::new(storage.clone(), root.clone()), config);
        store.toggle_theme();
        assert!(root.has_class("theme-dark"));
        assert!(root.property("--accent-550").is_some());
        assert!(storage.get("ops").is_some());
        assert!(storage.get(KEY).is_none());
    }
}
