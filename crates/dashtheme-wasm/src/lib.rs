//! # dashtheme-wasm
//!
//! The dashtheme store for the web, compiled to WebAssembly.
//!
//! This crate binds the `dashtheme` store to the browser: preferences persist
//! to `localStorage`, and the theme renders onto `document.documentElement`
//! as a `dark` class and `--primary*` custom properties.
//!
//! ## Quick Start (JavaScript)
//!
//! ```javascript
//! import init, { JsThemeStore } from 'dashtheme-wasm';
//!
//! async function main() {
//!     await init();
//!
//!     const theme = new JsThemeStore();
//!     theme.init();
//!
//!     document.querySelector('#dark-toggle')
//!         .addEventListener('click', () => theme.toggleTheme());
//!     theme.setPrimaryColor('#10b981');
//! }
//!
//! main();
//! ```
//!
//! ## Available APIs
//!
//! - `JsThemeStore` - `init`, `toggleTheme`, `setPrimaryColor`, `toggleSidebar`,
//!   `addNotification`, `removeNotification`, `applyTheme`, `save`, `teardown`,
//!   `snapshot`, `onChange` / `offChange`
//! - `hexToRgb(hex)` - Parse `#rrggbb` into `JsRgb`
//! - `generateShade(rgb, shade)` - Derive an `rgb(r, g, b)` shade string

#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::new_without_default)]
#![allow(clippy::needless_pass_by_value)]

// Use wee_alloc for smaller binaries (optional)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

use wasm_bindgen::prelude::*;

mod bindings;
mod browser;

pub use bindings::{JsRgb, JsThemeStore, generate_shade, hex_to_rgb};
pub use browser::{BrowserStorage, DocumentRoot, detect_host};

/// Initialize the module.
///
/// Installs the panic hook and routes log output to the browser console.
/// Runs automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second instantiation finds the logger already set.
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Module version information.
#[must_use]
#[wasm_bindgen(js_name = "version")]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if the module is properly initialized.
#[must_use]
#[wasm_bindgen(js_name = "isReady")]
#[allow(clippy::missing_const_for_fn)] // wasm_bindgen doesn't support const fn
pub fn is_ready() -> bool {
    true
}
