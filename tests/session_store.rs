//! Integration tests for the session store lifecycle: persistence across
//! reloads, remove-on-empty semantics, and the orphaned-topic invariant.
//!
//! Each test uses its own temp directory for isolation.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use anotes::session::{
    SessionStore, KEY_ACTIVE_CATEGORY, KEY_ACTIVE_TOPIC, KEY_ACTIVE_TOPIC_NAME, MAIN_BODY,
};

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("anotes_session_test_{name}"));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn session_path(&self) -> PathBuf {
        self.path.join("session.toml")
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).ok();
    }
}

#[test]
fn test_selection_survives_reload() {
    let dir = TempDir::new("reload");
    let path = dir.session_path();

    let mut store = SessionStore::load(&path).unwrap();
    store.set_topic("c1", "Work", "t1", "Standup");
    store.set_admin(true);
    store.save().unwrap();

    let reloaded = SessionStore::load(&path).unwrap();
    let sel = reloaded.selection();
    assert_eq!(sel.category_id, "c1");
    assert_eq!(sel.category_name, "Work");
    assert_eq!(sel.topic_id.as_deref(), Some("t1"));
    assert_eq!(sel.topic_name.as_deref(), Some("Standup"));
    assert!(reloaded.admin());
}

#[test]
fn test_missing_file_starts_empty() {
    let dir = TempDir::new("missing");
    let store = SessionStore::load(&dir.session_path()).unwrap();
    assert_eq!(store.selection().category_id, MAIN_BODY);
    assert!(!store.admin());
}

#[test]
fn test_empty_value_removes_key_on_disk() {
    let dir = TempDir::new("remove");
    let path = dir.session_path();

    let mut store = SessionStore::load(&path).unwrap();
    store.set(KEY_ACTIVE_CATEGORY, "c1");
    store.save().unwrap();

    let mut store = SessionStore::load(&path).unwrap();
    assert_eq!(store.get(KEY_ACTIVE_CATEGORY), Some("c1"));

    // Setting to empty removes the key entirely, distinguishable from ""
    store.set(KEY_ACTIVE_CATEGORY, "");
    store.save().unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("activeCategory"));

    let reloaded = SessionStore::load(&path).unwrap();
    assert_eq!(reloaded.get(KEY_ACTIVE_CATEGORY), None);
}

#[test]
fn test_orphaned_topic_dropped_on_load() {
    let dir = TempDir::new("orphan");
    let path = dir.session_path();

    // Hand-written file violating the topic-implies-category invariant
    std::fs::write(
        &path,
        "[entries]\nactiveTopic = \"t9\"\nactiveTopicName = \"Stray\"\n",
    )
    .unwrap();

    let store = SessionStore::load(&path).unwrap();
    assert_eq!(store.get(KEY_ACTIVE_TOPIC), None);
    assert_eq!(store.get(KEY_ACTIVE_TOPIC_NAME), None);
    assert!(!store.selection().has_topic());
}

#[test]
fn test_clear_topic_keeps_category() {
    let dir = TempDir::new("clear_topic");
    let path = dir.session_path();

    let mut store = SessionStore::load(&path).unwrap();
    store.set_topic("c1", "Work", "t1", "Standup");
    store.clear_topic();
    store.save().unwrap();

    let reloaded = SessionStore::load(&path).unwrap();
    let sel = reloaded.selection();
    assert_eq!(sel.category_id, "c1");
    assert!(sel.topic_id.is_none());
}

#[test]
fn test_save_creates_parent_directory() {
    let dir = TempDir::new("nested");
    let path = dir.path.join("deeper").join("session.toml");

    let mut store = SessionStore::load(&path).unwrap();
    store.set_category("c1", "Work");
    store.save().unwrap();

    assert!(path.exists());
}
