//! Browser implementations of the store's host capabilities.
//!
//! [`BrowserStorage`] wraps `window.localStorage` and [`DocumentRoot`] wraps
//! `document.documentElement`. [`detect_host`] picks them when a browsing
//! context exists and falls back to headless capabilities otherwise, so the
//! store itself never checks for a window.

use dashtheme::{Host, HostError, Storage, StyleTarget};
use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

fn js_reason(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// `Storage` backed by a web-sys `Storage` object (usually `localStorage`).
#[derive(Debug, Clone)]
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    pub fn new(inner: web_sys::Storage) -> Self {
        Self { inner }
    }
}

impl Storage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        self.inner.get_item(key).map_err(|err| HostError::Rejected {
            key: key.to_string(),
            reason: js_reason(&err),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.inner.set_item(key, value).map_err(|err| HostError::Rejected {
            key: key.to_string(),
            reason: js_reason(&err),
        })
    }
}

/// `StyleTarget` backed by an element's class list and inline style.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    element: HtmlElement,
}

impl DocumentRoot {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl StyleTarget for DocumentRoot {
    fn toggle_class(&self, class: &str, force: bool) -> Result<(), HostError> {
        self.element
            .class_list()
            .toggle_with_force(class, force)
            .map(|_| ())
            .map_err(|err| HostError::Rejected {
                key: class.to_string(),
                reason: js_reason(&err),
            })
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), HostError> {
        self.element
            .style()
            .set_property(name, value)
            .map_err(|err| HostError::Rejected {
                key: name.to_string(),
                reason: js_reason(&err),
            })
    }

    fn remove_property(&self, name: &str) -> Result<(), HostError> {
        self.element
            .style()
            .remove_property(name)
            .map(|_| ())
            .map_err(|err| HostError::Rejected {
                key: name.to_string(),
                reason: js_reason(&err),
            })
    }
}

/// Host for the current environment.
///
/// In a browser this renders into `document.documentElement` and persists
/// to `localStorage`. If `localStorage` is blocked, rendering still happens
/// and persistence is dropped. Without a document, the host is headless.
pub fn detect_host() -> Host {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(host) = browser_host() {
            return host;
        }
    }
    debug!("No browsing context; using headless host");
    Host::headless()
}

#[cfg(target_arch = "wasm32")]
fn browser_host() -> Option<Host> {
    use dashtheme::NoopStorage;
    use wasm_bindgen::JsCast;

    let window = web_sys::window()?;
    let root = window
        .document()?
        .document_element()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let root = DocumentRoot::new(root);

    match window.local_storage() {
        Ok(Some(storage)) => Some(Host::new(BrowserStorage::new(storage), root)),
        _ => {
            debug!("localStorage unavailable; theme changes will not persist");
            Some(Host::new(NoopStorage, root))
        }
    }
}
