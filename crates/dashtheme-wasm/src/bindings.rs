//! JavaScript-facing API.
//!
//! [`JsThemeStore`] wraps a [`ThemeStore`] bound to the detected host. Method
//! names follow JavaScript conventions (`toggleTheme`, `setPrimaryColor`).

use dashtheme::{Color, ListenerId, Notification, Rgb, StoreConfig, ThemeState, ThemeStore};
use serde::Serialize;
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::browser::detect_host;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Serializable view of [`ThemeState`] for JavaScript callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StateView<'a> {
    is_dark: bool,
    primary_color: &'a Color,
    secondary_color: &'a Color,
    sidebar_collapsed: bool,
    notifications: &'a [Notification],
}

impl<'a> From<&'a ThemeState> for StateView<'a> {
    fn from(state: &'a ThemeState) -> Self {
        Self {
            is_dark: state.is_dark,
            primary_color: &state.primary_color,
            secondary_color: &state.secondary_color,
            sidebar_collapsed: state.sidebar_collapsed,
            notifications: &state.notifications,
        }
    }
}

fn state_to_js(state: &ThemeState) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(&StateView::from(state)).map_err(to_js_error)?;
    js_sys::JSON::parse(&json)
}

/// A parsed `#rrggbb` color.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<Rgb> for JsRgb {
    fn from(rgb: Rgb) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }
}

impl From<JsRgb> for Rgb {
    fn from(rgb: JsRgb) -> Self {
        Self::new(rgb.r, rgb.g, rgb.b)
    }
}

#[wasm_bindgen]
impl JsRgb {
    #[wasm_bindgen(constructor)]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    #[wasm_bindgen(js_name = "toHex")]
    pub fn to_hex(&self) -> String {
        Rgb::from(*self).to_hex()
    }
}

/// Parse a 6-digit hex color, returning `undefined` for anything else.
#[wasm_bindgen(js_name = "hexToRgb")]
pub fn hex_to_rgb(hex: &str) -> Option<JsRgb> {
    dashtheme::hex_to_rgb(hex).map(JsRgb::from)
}

/// Derive the `rgb(r, g, b)` string for a shade key.
#[wasm_bindgen(js_name = "generateShade")]
pub fn generate_shade(rgb: &JsRgb, shade: i32) -> String {
    dashtheme::generate_shade(Rgb::from(*rgb), shade).to_string()
}

/// Theme store bound to `localStorage` and `document.documentElement`.
#[wasm_bindgen]
#[derive(Debug)]
pub struct JsThemeStore {
    inner: ThemeStore,
}

#[wasm_bindgen]
impl JsThemeStore {
    /// Create a store, optionally under a custom storage key.
    #[wasm_bindgen(constructor)]
    pub fn new(storage_key: Option<String>) -> Result<JsThemeStore, JsValue> {
        let mut config = StoreConfig::default();
        if let Some(key) = storage_key {
            config = config.with_storage_key(key);
        }
        Self::with_config(config)
    }

    /// Create a store from a JSON config object's text.
    #[wasm_bindgen(js_name = "fromConfigJson")]
    pub fn from_config_json(json: &str) -> Result<JsThemeStore, JsValue> {
        let config = StoreConfig::from_json(json).map_err(to_js_error)?;
        Self::with_config(config)
    }

    fn with_config(config: StoreConfig) -> Result<JsThemeStore, JsValue> {
        let inner = ThemeStore::try_new(detect_host(), config).map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Load persisted preferences and render. Throws on a malformed record.
    #[wasm_bindgen]
    pub fn init(&mut self) -> Result<(), JsValue> {
        self.inner.init().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "toggleTheme")]
    pub fn toggle_theme(&mut self) -> bool {
        self.inner.toggle_theme()
    }

    #[wasm_bindgen(js_name = "setPrimaryColor")]
    pub fn set_primary_color(&mut self, color: &str) {
        self.inner.set_primary_color(color);
    }

    #[wasm_bindgen(js_name = "toggleSidebar")]
    pub fn toggle_sidebar(&mut self) -> bool {
        self.inner.toggle_sidebar()
    }

    /// Add a notification; `type` defaults to `"info"`. Returns its id.
    #[wasm_bindgen(js_name = "addNotification")]
    pub fn add_notification(&mut self, message: &str, kind: Option<String>) -> f64 {
        self.inner.add_notification(message, kind.as_deref()) as f64
    }

    #[wasm_bindgen(js_name = "removeNotification")]
    pub fn remove_notification(&mut self, id: f64) {
        self.inner.remove_notification(id as i64);
    }

    #[wasm_bindgen(js_name = "applyTheme")]
    pub fn apply_theme(&self) -> Result<(), JsValue> {
        self.inner.apply_theme().map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn save(&self) -> Result<(), JsValue> {
        self.inner.save().map_err(to_js_error)
    }

    /// Remove rendered classes and properties and drop listeners.
    #[wasm_bindgen]
    pub fn teardown(&mut self) -> Result<(), JsValue> {
        self.inner.teardown().map_err(to_js_error)
    }

    #[wasm_bindgen(getter, js_name = "isDark")]
    pub fn is_dark(&self) -> bool {
        self.inner.is_dark()
    }

    #[wasm_bindgen(getter, js_name = "primaryColor")]
    pub fn primary_color(&self) -> String {
        self.inner.primary_color().to_string()
    }

    #[wasm_bindgen(getter, js_name = "secondaryColor")]
    pub fn secondary_color(&self) -> String {
        self.inner.secondary_color().to_string()
    }

    #[wasm_bindgen(getter, js_name = "sidebarCollapsed")]
    pub fn sidebar_collapsed(&self) -> bool {
        self.inner.sidebar_collapsed()
    }

    /// Current state as a plain object, notifications included.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        state_to_js(self.inner.state())
    }

    /// Call `callback(state)` after every change. Returns a handle for
    /// `offChange`; handles are never reused by a store.
    ///
    /// A callback that throws is logged and does not stop other listeners.
    #[wasm_bindgen(js_name = "onChange")]
    pub fn on_change(&mut self, callback: js_sys::Function) -> f64 {
        let id = self.inner.on_change(move |state| {
            let value = match state_to_js(state) {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = ?err, "Failed to convert theme state for listener");
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                warn!(error = ?err, "Theme listener threw");
            }
        });
        id.as_u64() as f64
    }

    #[wasm_bindgen(js_name = "offChange")]
    pub fn off_change(&mut self, handle: f64) {
        self.inner.remove_listener(ListenerId::from(handle as u64));
    }
}
