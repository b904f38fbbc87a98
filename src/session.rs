//! File-backed session state store.
//!
//! Persists the active category/topic selection and the admin flag across
//! runs, mirroring the key/value contract of a browser session store: setting
//! an empty value removes the key, so "unset" stays distinguishable from
//! "empty string".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Sentinel id meaning "no category/topic selected".
pub const MAIN_BODY: &str = "Main Body";

/// Display name shown for the sentinel root selection.
pub const ROOT_NAME: &str = "Categories";

pub const KEY_ACTIVE_CATEGORY: &str = "activeCategory";
pub const KEY_ACTIVE_CATEGORY_NAME: &str = "activeCategoryName";
pub const KEY_ACTIVE_TOPIC: &str = "activeTopic";
pub const KEY_ACTIVE_TOPIC_NAME: &str = "activeTopicName";
pub const KEY_ADMIN_STATUS: &str = "adminStatus";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse session file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Key/value session store persisted as TOML.
///
/// Writes are atomic (temp file + rename) so a crash mid-save never leaves a
/// truncated file behind.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Creates an in-memory store that is never persisted. Used in tests and
    /// when no config directory is available.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store from `path`, starting empty when the file is missing.
    ///
    /// A stored topic without a category is invalid; the orphaned topic keys
    /// are dropped on load.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let mut entries = match fs::read_to_string(path) {
            Ok(raw) => {
                let file: SessionFile = toml::from_str(&raw)?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no session file, starting fresh");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        if entries.contains_key(KEY_ACTIVE_TOPIC) && !entries.contains_key(KEY_ACTIVE_CATEGORY) {
            warn!("session file has a topic selection without a category, dropping it");
            entries.remove(KEY_ACTIVE_TOPIC);
            entries.remove(KEY_ACTIVE_TOPIC_NAME);
        }

        Ok(Self {
            entries,
            path: Some(path.to_path_buf()),
        })
    }

    /// Writes the store to disk. No-op for in-memory stores.
    pub fn save(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = SessionFile {
            entries: self.entries.clone(),
        };
        let raw = toml::to_string_pretty(&file)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Atomic replace: write to a sibling temp file, then rename over.
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets a key. An empty value removes the key entirely.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), value.to_string());
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current selection with sentinel defaults applied.
    pub fn selection(&self) -> Selection {
        let category_id = self
            .get(KEY_ACTIVE_CATEGORY)
            .unwrap_or(MAIN_BODY)
            .to_string();
        let category_name = self
            .get(KEY_ACTIVE_CATEGORY_NAME)
            .unwrap_or(ROOT_NAME)
            .to_string();
        let topic_id = self
            .get(KEY_ACTIVE_TOPIC)
            .filter(|id| !id.is_empty() && *id != MAIN_BODY)
            .map(str::to_string);
        let topic_name = topic_id
            .is_some()
            .then(|| self.get(KEY_ACTIVE_TOPIC_NAME).unwrap_or("").to_string());

        Selection {
            category_id,
            category_name,
            topic_id,
            topic_name,
        }
    }

    /// Selects a category and clears any topic selection.
    pub fn set_category(&mut self, id: &str, name: &str) {
        self.set(KEY_ACTIVE_CATEGORY, id);
        self.set(KEY_ACTIVE_CATEGORY_NAME, name);
        self.clear_topic();
    }

    /// Selects a topic together with its owning category. The category is
    /// always written first, so a topic can never exist without one.
    pub fn set_topic(&mut self, category_id: &str, category_name: &str, topic_id: &str, topic_name: &str) {
        self.set(KEY_ACTIVE_CATEGORY, category_id);
        self.set(KEY_ACTIVE_CATEGORY_NAME, category_name);
        self.set(KEY_ACTIVE_TOPIC, topic_id);
        self.set(KEY_ACTIVE_TOPIC_NAME, topic_name);
    }

    /// Clears the topic selection, keeping the category.
    pub fn clear_topic(&mut self) {
        self.entries.remove(KEY_ACTIVE_TOPIC);
        self.entries.remove(KEY_ACTIVE_TOPIC_NAME);
    }

    /// Resets the selection to the root sentinel.
    pub fn reset_selection(&mut self) {
        self.entries.remove(KEY_ACTIVE_CATEGORY);
        self.entries.remove(KEY_ACTIVE_CATEGORY_NAME);
        self.clear_topic();
    }

    pub fn admin(&self) -> bool {
        self.get(KEY_ADMIN_STATUS) == Some("true")
    }

    pub fn set_admin(&mut self, admin: bool) {
        self.set(KEY_ADMIN_STATUS, if admin { "true" } else { "false" });
    }
}

/// Typed view of the stored selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// `MAIN_BODY` when no category is selected.
    pub category_id: String,
    pub category_name: String,
    pub topic_id: Option<String>,
    pub topic_name: Option<String>,
}

impl Selection {
    pub fn has_category(&self) -> bool {
        self.category_id != MAIN_BODY && !self.category_id.is_empty()
    }

    pub fn has_topic(&self) -> bool {
        self.topic_id.is_some()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            category_id: MAIN_BODY.to_string(),
            category_name: ROOT_NAME.to_string(),
            topic_id: None,
            topic_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_value_removes_key() {
        let mut store = SessionStore::in_memory();
        store.set(KEY_ACTIVE_CATEGORY, "abc");
        assert_eq!(store.get(KEY_ACTIVE_CATEGORY), Some("abc"));

        store.set(KEY_ACTIVE_CATEGORY, "");
        assert_eq!(store.get(KEY_ACTIVE_CATEGORY), None);
    }

    #[test]
    fn test_default_selection_is_root() {
        let store = SessionStore::in_memory();
        let sel = store.selection();
        assert_eq!(sel.category_id, MAIN_BODY);
        assert_eq!(sel.category_name, ROOT_NAME);
        assert!(!sel.has_category());
        assert!(!sel.has_topic());
    }

    #[test]
    fn test_set_category_clears_topic() {
        let mut store = SessionStore::in_memory();
        store.set_topic("c1", "Work", "t1", "Standup");
        assert!(store.selection().has_topic());

        store.set_category("c2", "Home");
        let sel = store.selection();
        assert_eq!(sel.category_id, "c2");
        assert!(!sel.has_topic());
    }

    #[test]
    fn test_topic_always_carries_category() {
        let mut store = SessionStore::in_memory();
        store.set_topic("c1", "Work", "t1", "Standup");
        let sel = store.selection();
        assert!(sel.has_category());
        assert_eq!(sel.topic_id.as_deref(), Some("t1"));
        assert_eq!(sel.topic_name.as_deref(), Some("Standup"));
    }

    #[test]
    fn test_sentinel_topic_id_reads_as_no_topic() {
        let mut store = SessionStore::in_memory();
        store.set(KEY_ACTIVE_CATEGORY, "c1");
        store.set(KEY_ACTIVE_TOPIC, MAIN_BODY);
        assert!(!store.selection().has_topic());
    }

    #[test]
    fn test_admin_flag_round_trip() {
        let mut store = SessionStore::in_memory();
        assert!(!store.admin());
        store.set_admin(true);
        assert!(store.admin());
        store.set_admin(false);
        assert!(!store.admin());
    }
}
