#![forbid(unsafe_code)]
// Allow these clippy lints for API ergonomics
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::new_without_default)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]

//! # Dashtheme
//!
//! A theme and preferences store for dashboard UIs.
//!
//! Dashtheme keeps a small piece of UI state and mirrors it onto a host:
//! - **Dark mode**: a class on the root element
//! - **Primary color**: `--primary` plus nine derived `--primary-{shade}` properties
//! - **Sidebar** collapse state
//! - **Notifications**, kept in memory only
//!
//! Dark mode, the primary color, and the sidebar state persist as one JSON
//! record under a fixed storage key.
//!
//! ## Quick Start
//!
//! ```rust
//! use dashtheme::{Host, MemoryStorage, MemoryStyleTarget, StoreConfig, ThemeStore};
//!
//! let root = MemoryStyleTarget::new();
//! let mut store = ThemeStore::new(
//!     Host::new(MemoryStorage::new(), root.clone()),
//!     StoreConfig::default(),
//! );
//! store.init().unwrap();
//! store.set_primary_color("#ff0000");
//!
//! assert_eq!(root.property("--primary-850").as_deref(), Some("rgb(389, 0, 0)"));
//! ```
//!
//! ## Hosts
//!
//! A store never touches a browser directly. It talks to a [`Host`]: a
//! [`Storage`] plus a [`StyleTarget`]. Use [`Host::headless`] where there is
//! no browsing context, the memory implementations for tests and snapshots,
//! and the `dashtheme-wasm` crate for `localStorage` and
//! `document.documentElement`.
//!
//! ## Shades
//!
//! [`generate_shade`] scales each channel of the base color:
//!
//! | Shade | Scale |
//! |-------|-------|
//! | 500 | 1 |
//! | below 500 | `1 - (500 - shade) / 500 * 0.8` |
//! | above 500 | `1 + (shade - 500) / 400 * 0.6` |
//!
//! Results are rounded, not clamped, so bright colors exceed 255 above 500.

pub mod color;
pub mod config;
pub mod error;
pub mod host;
pub mod notification;
pub mod palette;
pub mod record;
pub mod store;

// Re-exports
pub use color::{BASE_SHADE, Color, Rgb, Shade, generate_shade, hex_to_rgb, shade_scale};
pub use config::{StoreConfig, ThemeDefaults};
pub use error::{ConfigError, HostError, StoreError};
#[cfg(feature = "native")]
pub use host::FileStorage;
pub use host::{
    Host, MemoryStorage, MemoryStyleTarget, NoopStorage, NoopStyleTarget, Storage, StyleSnapshot,
    StyleTarget,
};
pub use notification::{Clock, DEFAULT_NOTIFICATION_TYPE, Notification, SystemClock};
pub use palette::{Palette, SHADE_KEYS};
pub use record::PersistedRecord;
pub use store::{ListenerId, ThemeState, ThemeStore};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::color::{Color, Rgb, Shade, generate_shade, hex_to_rgb};
    pub use crate::config::{StoreConfig, ThemeDefaults};
    pub use crate::error::{HostError, StoreError};
    pub use crate::host::{Host, Storage, StyleTarget};
    pub use crate::notification::Notification;
    pub use crate::store::{ThemeState, ThemeStore};
}
