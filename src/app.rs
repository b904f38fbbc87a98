//! Central application state.
//!
//! `App` owns everything the event loop touches: the current selection
//! (mirrored into the session store), fetched lists, the notes editor state
//! machine, the audio player, overlay state, and the status alert line.
//! Background tasks communicate back through [`AppEvent`] on an mpsc channel.

use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::warn;

use crate::api::{Ack, ApiClient, ApiError, Category, Topic, TopicNotes, TopicSummary};
use crate::audio::AudioPlayer;
use crate::editor::NoteBuffer;
use crate::session::{SessionStore, Selection, MAIN_BODY, ROOT_NAME};

/// How long a status alert stays visible.
pub const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Event channel capacity. Background tasks block briefly if the loop falls
/// behind rather than growing without bound.
pub const EVENT_CHANNEL_SIZE: usize = 32;

// ============================================================================
// Events from background tasks
// ============================================================================

#[derive(Debug)]
pub enum AppEvent {
    CategoriesLoaded {
        result: Result<Vec<Category>, ApiError>,
    },
    TopicsLoaded {
        category_id: String,
        result: Result<Vec<Topic>, ApiError>,
    },
    NotesLoaded {
        topic_id: String,
        generation: u64,
        result: Result<Option<TopicNotes>, ApiError>,
    },
    NotesSaved {
        topic_id: String,
        content: String,
        ack: Ack,
    },
    NotesSaveFailed {
        topic_id: String,
        error: ApiError,
    },
    /// A list mutation (add/rename/delete) finished; the affected lists are
    /// re-fetched.
    MutationComplete {
        ack: Ack,
    },
    MutationFailed {
        error: ApiError,
    },
    LoginComplete {
        result: Result<Ack, ApiError>,
    },
    LogoutComplete {
        result: Result<Ack, ApiError>,
    },
    /// A spawned task panicked; surfaced as an alert instead of dying silently.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

/// Backend mutation requested from a list view or overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    AddCategory { name: String },
    RenameCategory { id: String, name: String },
    DeleteCategory { id: String },
    AddTopic { category_id: String, title: String },
    RenameTopic { category_id: String, id: String, title: String },
    DeleteTopic { category_id: String, id: String },
}

// ============================================================================
// Screens and overlays
// ============================================================================

/// Main content view, derived from the selection: no category → category
/// list, category without topic → topic list, topic → notes editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Categories,
    Topics,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Main,
}

/// Notes editor state machine over the active topic.
#[derive(Debug)]
pub enum NotesState {
    Idle,
    Loading { topic_id: String },
    Ready { notes: TopicNotes },
    /// Load failed; the buffer falls back to empty content.
    Failed { code: u16 },
}

/// Destructive or irreversible actions requiring explicit confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteCategory { id: String, name: String },
    DeleteTopic { category_id: String, id: String, title: String },
    AdminLogout,
}

impl ConfirmAction {
    pub fn describe(&self) -> String {
        match self {
            ConfirmAction::DeleteCategory { name, .. } => {
                format!("Delete category '{name}' and all its topics?")
            }
            ConfirmAction::DeleteTopic { title, .. } => format!("Delete topic '{title}'?"),
            ConfirmAction::AdminLogout => "Log out of admin mode?".to_string(),
        }
    }
}

/// Masked password entry for the admin login overlay.
#[derive(Debug, Default)]
pub struct LoginState {
    pub password: String,
}

impl LoginState {
    pub fn take_password(&mut self) -> SecretString {
        SecretString::from(std::mem::take(&mut self.password))
    }
}

/// What a prompt overlay's input is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    AddCategory,
    RenameCategory { id: String },
    AddTopic { category_id: String },
    RenameTopic { category_id: String, id: String },
}

#[derive(Debug)]
pub struct PromptState {
    pub action: PromptAction,
    pub input: String,
}

impl PromptState {
    pub fn title(&self) -> &'static str {
        match self.action {
            PromptAction::AddCategory => "New category name",
            PromptAction::RenameCategory { .. } => "Rename category",
            PromptAction::AddTopic { .. } => "New topic title",
            PromptAction::RenameTopic { .. } => "Rename topic",
        }
    }
}

// ============================================================================
// Navigation tree
// ============================================================================

/// One row of the sidebar tree. Row 0 is always the root sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub category_id: String,
    pub category_name: String,
    /// `Some` when this row is a topic nested under its category.
    pub topic: Option<TopicSummary>,
    pub is_expanded: bool,
    pub has_topics: bool,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub api: ApiClient,
    pub session: SessionStore,
    pub selection: Selection,

    pub categories: Vec<Category>,
    pub topics: Vec<Topic>,
    pub selected_category: usize,
    pub selected_topic: usize,

    pub show_tree: bool,
    pub expanded: HashSet<String>,
    pub tree_selected: usize,
    pub focus: Focus,

    pub notes: NotesState,
    pub buffer: NoteBuffer,
    pub audio: AudioPlayer,
    notes_generation: u64,
    pub notes_load_handle: Option<JoinHandle<()>>,
    pub saving_notes: bool,
    pub editor_scroll: u16,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub pending_confirm: Option<ConfirmAction>,
    pub login: Option<LoginState>,
    pub prompt: Option<PromptState>,
    pub show_help: bool,

    pub should_quit: bool,
    pub needs_redraw: bool,
    pub spinner_frame: usize,

    pub event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(api: ApiClient, session: SessionStore, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let selection = session.selection();
        Self {
            api,
            session,
            selection,
            categories: Vec::new(),
            topics: Vec::new(),
            selected_category: 0,
            selected_topic: 0,
            show_tree: false,
            expanded: HashSet::new(),
            tree_selected: 0,
            focus: Focus::Main,
            notes: NotesState::Idle,
            buffer: NoteBuffer::new(),
            audio: AudioPlayer::new(),
            notes_generation: 0,
            notes_load_handle: None,
            saving_notes: false,
            editor_scroll: 0,
            status_message: None,
            pending_confirm: None,
            login: None,
            prompt: None,
            show_help: false,
            should_quit: false,
            needs_redraw: true,
            spinner_frame: 0,
            event_tx,
        }
    }

    /// Current screen, derived from the selection.
    pub fn screen(&self) -> Screen {
        if self.selection.has_topic() {
            Screen::Editor
        } else if self.selection.has_category() {
            Screen::Topics
        } else {
            Screen::Categories
        }
    }

    pub fn admin(&self) -> bool {
        self.session.admin()
    }

    // --- Status alerts ------------------------------------------------------

    /// Shows a status-coded alert (`[code] message`), replacing any current
    /// status line.
    pub fn set_alert(&mut self, code: u16, message: impl AsRef<str>) {
        let text = format!("[{code}] {}", message.as_ref());
        self.status_message = Some((Cow::Owned(text), Instant::now()));
        self.needs_redraw = true;
    }

    pub fn alert_error(&mut self, error: &ApiError) {
        self.set_alert(error.status_code(), error.message());
    }

    pub fn set_status(&mut self, message: impl Into<Cow<'static, str>>) {
        self.status_message = Some((message.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Expires the status line after [`STATUS_DURATION`]. Returns true when
    /// a redraw is needed.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed() >= STATUS_DURATION {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // --- Selection ----------------------------------------------------------

    /// Persists the session, logging rather than surfacing failures: a
    /// session write error must never block navigation.
    fn persist_session(&mut self) {
        if let Err(e) = self.session.save() {
            warn!(error = %e, "failed to persist session");
        }
        self.selection = self.session.selection();
        self.needs_redraw = true;
    }

    /// Selects a category, clearing any topic selection.
    pub fn select_category(&mut self, id: &str, name: &str) {
        self.session.set_category(id, name);
        self.persist_session();
        self.selected_topic = 0;
    }

    /// Selects a topic together with its category. Callers can never set a
    /// topic without the category coming along.
    pub fn select_topic(&mut self, category_id: &str, category_name: &str, id: &str, title: &str) {
        self.session.set_topic(category_id, category_name, id, title);
        self.persist_session();
    }

    /// Leaves the editor back to the topic list.
    pub fn exit_topic(&mut self) {
        self.session.clear_topic();
        self.persist_session();
        self.notes = NotesState::Idle;
        self.buffer.set_content("");
        self.audio.clear();
    }

    /// Returns to the category list (root sentinel selection).
    pub fn go_root(&mut self) {
        self.session.reset_selection();
        self.persist_session();
        self.notes = NotesState::Idle;
        self.buffer.set_content("");
        self.audio.clear();
    }

    pub fn set_admin(&mut self, admin: bool) {
        self.session.set_admin(admin);
        self.persist_session();
    }

    /// The category the current selection points at, when it still exists.
    pub fn current_category(&self) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == self.selection.category_id)
    }

    // --- List cursors -------------------------------------------------------

    /// Keeps list cursors within bounds after a list re-fetch or deletion.
    pub fn clamp_selections(&mut self) {
        if self.selected_category >= self.categories.len() {
            self.selected_category = self.categories.len().saturating_sub(1);
        }
        if self.selected_topic >= self.topics.len() {
            self.selected_topic = self.topics.len().saturating_sub(1);
        }
        let tree_len = self.tree_items().len();
        debug_assert!(tree_len > 0, "tree always has the root row");
        if self.tree_selected >= tree_len {
            self.tree_selected = tree_len.saturating_sub(1);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Tree => {
                let len = self.tree_items().len();
                self.tree_selected = step(self.tree_selected, delta, len);
            }
            Focus::Main => match self.screen() {
                Screen::Categories => {
                    self.selected_category =
                        step(self.selected_category, delta, self.categories.len());
                }
                Screen::Topics => {
                    self.selected_topic = step(self.selected_topic, delta, self.topics.len());
                }
                Screen::Editor => {}
            },
        }
        self.needs_redraw = true;
    }

    // --- Notes state machine ------------------------------------------------

    /// Starts a new notes load: aborts any in-flight fetch and bumps the
    /// generation so a stale completion can be recognized and dropped.
    pub fn begin_notes_load(&mut self, topic_id: &str) -> u64 {
        if let Some(handle) = self.notes_load_handle.take() {
            handle.abort();
        }
        self.notes_generation = self.notes_generation.wrapping_add(1);
        self.notes = NotesState::Loading {
            topic_id: topic_id.to_string(),
        };
        self.needs_redraw = true;
        self.notes_generation
    }

    /// True when a completed load is still the latest one requested.
    pub fn accepts_notes_generation(&self, generation: u64) -> bool {
        generation == self.notes_generation
    }

    // --- Navigation tree ----------------------------------------------------

    /// Builds the sidebar rows: the root sentinel, then each category with
    /// its topics when expanded.
    pub fn tree_items(&self) -> Vec<TreeItem> {
        let mut items = vec![TreeItem {
            category_id: MAIN_BODY.to_string(),
            category_name: ROOT_NAME.to_string(),
            topic: None,
            is_expanded: false,
            has_topics: false,
        }];

        for category in &self.categories {
            let is_expanded = self.expanded.contains(&category.id);
            items.push(TreeItem {
                category_id: category.id.clone(),
                category_name: category.name.clone(),
                topic: None,
                is_expanded,
                has_topics: !category.topics.is_empty(),
            });
            if is_expanded {
                for topic in &category.topics {
                    items.push(TreeItem {
                        category_id: category.id.clone(),
                        category_name: category.name.clone(),
                        topic: Some(topic.clone()),
                        is_expanded: false,
                        has_topics: false,
                    });
                }
            }
        }
        items
    }

    pub fn toggle_tree_expand(&mut self) {
        let items = self.tree_items();
        let Some(item) = items.get(self.tree_selected) else {
            return;
        };
        if item.topic.is_some() || item.category_id == MAIN_BODY {
            return;
        }
        if !self.expanded.remove(&item.category_id) {
            self.expanded.insert(item.category_id.clone());
        }
        self.needs_redraw = true;
    }

    /// Activates the selected tree row, writing the selection through the
    /// invariant-preserving session methods.
    ///
    /// Returns the topic id to load when the activation entered the editor.
    pub fn activate_tree_item(&mut self) -> Option<String> {
        let items = self.tree_items();
        let item = items.get(self.tree_selected)?.clone();

        match item.topic {
            Some(topic) => {
                self.select_topic(&item.category_id, &item.category_name, &topic.id, &topic.title);
                Some(topic.id)
            }
            None if item.category_id == MAIN_BODY => {
                self.go_root();
                None
            }
            None => {
                self.select_category(&item.category_id, &item.category_name);
                None
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.notes_load_handle.take() {
            handle.abort();
        }
    }
}

/// Wrapping list-cursor step; no-op on empty lists.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (((current as isize + delta) % len + len) % len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration as StdDuration;
    use url::Url;

    fn test_app() -> App {
        let api = ApiClient::new(
            Url::parse("http://localhost:5000").unwrap(),
            StdDuration::from_secs(5),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        App::new(api, SessionStore::in_memory(), tx)
    }

    fn sample_categories() -> Vec<Category> {
        vec![
            Category {
                id: "c1".to_string(),
                name: "Work".to_string(),
                topics: vec![TopicSummary {
                    id: "t1".to_string(),
                    title: "Standup".to_string(),
                }],
            },
            Category {
                id: "c2".to_string(),
                name: "Home".to_string(),
                topics: vec![],
            },
        ]
    }

    #[test]
    fn test_screen_derived_from_selection() {
        let mut app = test_app();
        assert_eq!(app.screen(), Screen::Categories);

        app.select_category("c1", "Work");
        assert_eq!(app.screen(), Screen::Topics);

        app.select_topic("c1", "Work", "t1", "Standup");
        assert_eq!(app.screen(), Screen::Editor);

        app.exit_topic();
        assert_eq!(app.screen(), Screen::Topics);

        app.go_root();
        assert_eq!(app.screen(), Screen::Categories);
    }

    #[test]
    fn test_tree_activation_topic_sets_category_too() {
        let mut app = test_app();
        app.categories = sample_categories();
        app.expanded.insert("c1".to_string());

        // root, c1, c1/t1, c2
        let items = app.tree_items();
        assert_eq!(items.len(), 4);
        app.tree_selected = 2;

        let load = app.activate_tree_item();
        assert_eq!(load.as_deref(), Some("t1"));
        assert_eq!(app.selection.category_id, "c1");
        assert_eq!(app.selection.topic_id.as_deref(), Some("t1"));
    }

    #[test]
    fn test_tree_root_row_clears_selection() {
        let mut app = test_app();
        app.categories = sample_categories();
        app.select_topic("c1", "Work", "t1", "Standup");

        app.tree_selected = 0;
        assert!(app.activate_tree_item().is_none());
        assert_eq!(app.selection.category_id, MAIN_BODY);
        assert!(app.selection.topic_id.is_none());
    }

    #[test]
    fn test_stale_notes_generation_rejected() {
        let mut app = test_app();
        let first = app.begin_notes_load("t1");
        let second = app.begin_notes_load("t2");

        assert!(!app.accepts_notes_generation(first));
        assert!(app.accepts_notes_generation(second));
    }

    #[test]
    fn test_clamp_selections_after_shrink() {
        let mut app = test_app();
        app.categories = sample_categories();
        app.selected_category = 5;
        app.selected_topic = 3;
        app.tree_selected = 10;
        app.clamp_selections();
        assert_eq!(app.selected_category, 1);
        assert_eq!(app.selected_topic, 0);
        assert!(app.tree_selected < app.tree_items().len());
    }

    #[test]
    fn test_move_selection_wraps() {
        let mut app = test_app();
        app.categories = sample_categories();
        app.move_selection(-1);
        assert_eq!(app.selected_category, 1);
        app.move_selection(1);
        assert_eq!(app.selected_category, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_alert_expires() {
        let mut app = test_app();
        app.set_alert(404, "not found");
        assert!(app.status_message.is_some());
        assert!(!app.clear_expired_status());

        tokio::time::advance(STATUS_DURATION + StdDuration::from_millis(10)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_alert_format_includes_code() {
        let mut app = test_app();
        app.set_alert(500, "No response from server");
        let (text, _) = app.status_message.as_ref().unwrap();
        assert_eq!(text.as_ref(), "[500] No response from server");
    }
}
