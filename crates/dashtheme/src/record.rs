//! The persisted record: the subset of state written to storage.
//!
//! Only `isDark`, `primaryColor`, and `sidebarCollapsed` are ever written.
//! The secondary color and notifications stay in memory.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::ThemeDefaults;

/// The JSON object stored under the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub is_dark: bool,
    pub primary_color: Color,
    pub sidebar_collapsed: bool,
}

// Lenient view of a stored record; absent and null fields both read as None.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    is_dark: Option<bool>,
    #[serde(default)]
    primary_color: Option<String>,
    #[serde(default)]
    sidebar_collapsed: Option<bool>,
}

impl PersistedRecord {
    /// Parse a stored record, filling missing fields from `defaults`.
    ///
    /// A missing or `null` field takes its default, as does an empty primary
    /// color. Unknown keys are ignored.
    ///
    /// # Errors
    /// Returns the JSON error if `raw` is not an object with fields of the
    /// expected types.
    pub fn parse(raw: &str, defaults: &ThemeDefaults) -> Result<Self, serde_json::Error> {
        let stored: StoredRecord = serde_json::from_str(raw)?;
        Ok(Self {
            is_dark: stored.is_dark.unwrap_or(defaults.is_dark),
            primary_color: stored
                .primary_color
                .filter(|c| !c.is_empty())
                .map_or_else(|| defaults.primary_color.clone(), Color::from),
            sidebar_collapsed: stored
                .sidebar_collapsed
                .unwrap_or(defaults.sidebar_collapsed),
        })
    }

    /// Serialize to the compact JSON written to storage.
    ///
    /// # Errors
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
