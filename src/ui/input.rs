//! Input handling for the TUI.
//!
//! Keyboard input is dispatched by overlay first (help, confirm, login,
//! prompt all capture every key while visible), then by focus and screen.
//! In the editor, admin mode routes printable keys into the notes buffer, so
//! editor commands are Ctrl-chords; read-only mode keeps the plain keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

use crate::app::{
    App, ConfirmAction, Focus, LoginState, MutationKind, NotesState, PromptAction, PromptState,
    Screen,
};
use crate::util::MAX_PROMPT_LENGTH;

use super::helpers::{
    spawn_fetch_topics, spawn_login, spawn_logout, spawn_mutation, spawn_notes_load,
    spawn_save_notes,
};
use super::Action;

const ERR_ADMIN_REQUIRED: &str = "Admin mode required";

/// Main input dispatch function.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    // Overlays capture all keys while visible
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }
    if app.pending_confirm.is_some() {
        return Ok(handle_confirm_input(app, code));
    }
    if app.login.is_some() {
        return Ok(handle_login_input(app, code));
    }
    if app.prompt.is_some() {
        return Ok(handle_prompt_input(app, code));
    }

    if app.focus == Focus::Tree {
        return Ok(handle_tree_input(app, code));
    }

    match app.screen() {
        Screen::Categories => Ok(handle_categories_input(app, code)),
        Screen::Topics => Ok(handle_topics_input(app, code)),
        Screen::Editor => Ok(handle_editor_input(app, code, modifiers)),
    }
}

/// Bracketed paste goes straight into the notes buffer when editing.
pub(super) fn handle_paste(app: &mut App, payload: &str) {
    if let Some(prompt) = &mut app.prompt {
        let clean = crate::util::sanitize_paste(payload);
        for c in clean.chars().filter(|c| *c != '\n' && *c != '\t') {
            if prompt.input.chars().count() >= MAX_PROMPT_LENGTH {
                break;
            }
            prompt.input.push(c);
        }
        return;
    }
    if app.screen() == Screen::Editor && app.admin() {
        app.buffer.paste(payload);
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    if matches!(
        code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
    ) {
        app.show_help = false;
    }
    Action::Continue
}

/// Confirmation dialog: `y`/Enter fires the pending action, anything
/// destructive never runs without passing through here.
fn handle_confirm_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(action) = app.pending_confirm.take() {
                match action {
                    ConfirmAction::DeleteCategory { id, .. } => {
                        spawn_mutation(
                            app.api.clone(),
                            MutationKind::DeleteCategory { id },
                            app.event_tx.clone(),
                        );
                    }
                    ConfirmAction::DeleteTopic { category_id, id, .. } => {
                        spawn_mutation(
                            app.api.clone(),
                            MutationKind::DeleteTopic { category_id, id },
                            app.event_tx.clone(),
                        );
                    }
                    ConfirmAction::AdminLogout => {
                        spawn_logout(app.api.clone(), app.event_tx.clone());
                    }
                }
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
        }
        _ => {}
    }
    Action::Continue
}

/// Masked password entry for the admin login overlay.
fn handle_login_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Enter => {
            if let Some(login) = &mut app.login {
                let password = login.take_password();
                app.login = None;
                spawn_login(app.api.clone(), password, app.event_tx.clone());
                app.set_status("Logging in...");
            }
        }
        KeyCode::Esc => {
            app.login = None;
        }
        KeyCode::Backspace => {
            if let Some(login) = &mut app.login {
                login.password.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(login) = &mut app.login {
                if login.password.chars().count() < MAX_PROMPT_LENGTH {
                    login.password.push(c);
                }
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Single-line text prompt for add/rename operations.
fn handle_prompt_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Enter => {
            if let Some(prompt) = app.prompt.take() {
                let input = prompt.input.trim().to_string();
                if input.is_empty() {
                    return Action::Continue;
                }
                let kind = match prompt.action {
                    PromptAction::AddCategory => MutationKind::AddCategory { name: input },
                    PromptAction::RenameCategory { id } => {
                        MutationKind::RenameCategory { id, name: input }
                    }
                    PromptAction::AddTopic { category_id } => MutationKind::AddTopic {
                        category_id,
                        title: input,
                    },
                    PromptAction::RenameTopic { category_id, id } => MutationKind::RenameTopic {
                        category_id,
                        id,
                        title: input,
                    },
                };
                spawn_mutation(app.api.clone(), kind, app.event_tx.clone());
            }
        }
        KeyCode::Esc => {
            app.prompt = None;
        }
        KeyCode::Backspace => {
            if let Some(prompt) = &mut app.prompt {
                prompt.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = &mut app.prompt {
                if prompt.input.chars().count() < MAX_PROMPT_LENGTH {
                    prompt.input.push(c);
                }
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_tree_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_tree_expand(),
        KeyCode::Enter => {
            if let Some(topic_id) = app.activate_tree_item() {
                spawn_notes_load(app, &topic_id);
            } else if app.selection.has_category() {
                spawn_fetch_topics(
                    app.api.clone(),
                    app.selection.category_id.clone(),
                    app.event_tx.clone(),
                );
            }
            app.focus = Focus::Main;
        }
        KeyCode::Tab | KeyCode::Esc => app.focus = Focus::Main,
        KeyCode::Char('t') => {
            app.show_tree = false;
            app.focus = Focus::Main;
        }
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

/// Shared keys for the two list screens. Returns true when handled.
fn handle_common_list_input(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('t') => {
            app.show_tree = !app.show_tree;
            if !app.show_tree && app.focus == Focus::Tree {
                app.focus = Focus::Main;
            }
        }
        KeyCode::Tab => {
            if app.show_tree {
                app.focus = Focus::Tree;
            }
        }
        KeyCode::Char('A') => toggle_admin(app),
        KeyCode::Char('?') => app.show_help = true,
        _ => return false,
    }
    true
}

fn handle_categories_input(app: &mut App, code: KeyCode) -> Action {
    if handle_common_list_input(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Enter => {
            if let Some(category) = app.categories.get(app.selected_category).cloned() {
                app.select_category(&category.id, &category.name);
                spawn_fetch_topics(app.api.clone(), category.id, app.event_tx.clone());
            }
        }
        KeyCode::Char('a') => {
            if require_admin(app) {
                app.prompt = Some(PromptState {
                    action: PromptAction::AddCategory,
                    input: String::new(),
                });
            }
        }
        KeyCode::Char('e') => {
            if require_admin(app) {
                if let Some(category) = app.categories.get(app.selected_category) {
                    app.prompt = Some(PromptState {
                        action: PromptAction::RenameCategory {
                            id: category.id.clone(),
                        },
                        input: category.name.clone(),
                    });
                }
            }
        }
        KeyCode::Char('d') => {
            if require_admin(app) {
                if let Some(category) = app.categories.get(app.selected_category) {
                    app.pending_confirm = Some(ConfirmAction::DeleteCategory {
                        id: category.id.clone(),
                        name: category.name.clone(),
                    });
                }
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_topics_input(app: &mut App, code: KeyCode) -> Action {
    if handle_common_list_input(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('u') | KeyCode::Esc | KeyCode::Left => app.go_root(),
        KeyCode::Enter => {
            if let Some(topic) = app.topics.get(app.selected_topic).cloned() {
                let (category_id, category_name) = (
                    app.selection.category_id.clone(),
                    app.selection.category_name.clone(),
                );
                app.select_topic(&category_id, &category_name, &topic.id, &topic.title);
                spawn_notes_load(app, &topic.id);
            }
        }
        KeyCode::Char('a') => {
            if require_admin(app) {
                app.prompt = Some(PromptState {
                    action: PromptAction::AddTopic {
                        category_id: app.selection.category_id.clone(),
                    },
                    input: String::new(),
                });
            }
        }
        KeyCode::Char('e') => {
            if require_admin(app) {
                if let Some(topic) = app.topics.get(app.selected_topic) {
                    app.prompt = Some(PromptState {
                        action: PromptAction::RenameTopic {
                            category_id: app.selection.category_id.clone(),
                            id: topic.id.clone(),
                        },
                        input: topic.title.clone(),
                    });
                }
            }
        }
        KeyCode::Char('d') => {
            if require_admin(app) {
                if let Some(topic) = app.topics.get(app.selected_topic) {
                    app.pending_confirm = Some(ConfirmAction::DeleteTopic {
                        category_id: app.selection.category_id.clone(),
                        id: topic.id.clone(),
                        title: topic.title.clone(),
                    });
                }
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_editor_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    // Ctrl-chords work in both modes
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('s') => save_notes(app),
            KeyCode::Char('p') => toggle_audio(app),
            KeyCode::Char('o') => open_audio(app),
            KeyCode::Left => navigate_linked_topic(app, Direction::Previous),
            KeyCode::Right => navigate_linked_topic(app, Direction::Next),
            _ => {}
        }
        return Action::Continue;
    }

    if app.admin() {
        // Editing mode: printable keys mutate the buffer directly
        match code {
            KeyCode::Esc => app.exit_topic(),
            KeyCode::Enter => app.buffer.newline(),
            KeyCode::Backspace => app.buffer.backspace(),
            KeyCode::Delete => app.buffer.delete(),
            KeyCode::Left => app.buffer.move_left(),
            KeyCode::Right => app.buffer.move_right(),
            KeyCode::Up => app.buffer.move_up(),
            KeyCode::Down => app.buffer.move_down(),
            KeyCode::Home => app.buffer.move_home(),
            KeyCode::End => app.buffer.move_end(),
            KeyCode::Tab => app.buffer.insert_char('\t'),
            KeyCode::Char(c) => app.buffer.insert_char(c),
            _ => {}
        }
    } else {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc | KeyCode::Char('u') => app.exit_topic(),
            KeyCode::Char('j') | KeyCode::Down => {
                app.editor_scroll = app.editor_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.editor_scroll = app.editor_scroll.saturating_sub(1);
            }
            KeyCode::Left | KeyCode::Char('h') => navigate_linked_topic(app, Direction::Previous),
            KeyCode::Right | KeyCode::Char('l') => navigate_linked_topic(app, Direction::Next),
            KeyCode::Char('p') | KeyCode::Char(' ') => toggle_audio(app),
            KeyCode::Char('o') => open_audio(app),
            KeyCode::Char('A') => toggle_admin(app),
            KeyCode::Char('?') => app.show_help = true,
            _ => {}
        }
    }
    Action::Continue
}

enum Direction {
    Previous,
    Next,
}

/// Follows the behavior/next link of the loaded notes, when present.
fn navigate_linked_topic(app: &mut App, direction: Direction) {
    let NotesState::Ready { notes } = &app.notes else {
        return;
    };
    let target = match direction {
        Direction::Previous => notes.behavior.as_ref(),
        Direction::Next => notes.next.as_ref(),
    };
    let Some(topic) = target else {
        return;
    };
    let (id, title) = (topic.id.clone(), topic.title.clone());
    let (category_id, category_name) = (
        app.selection.category_id.clone(),
        app.selection.category_name.clone(),
    );
    app.select_topic(&category_id, &category_name, &id, &title);
    spawn_notes_load(app, &id);
}

fn save_notes(app: &mut App) {
    if !app.admin() {
        app.set_alert(403, ERR_ADMIN_REQUIRED);
        return;
    }
    let Some(topic_id) = app.selection.topic_id.clone() else {
        return;
    };
    if app.saving_notes {
        app.set_status("Save already in progress");
        return;
    }
    let category_id = app.selection.category_id.clone();
    let content = app.buffer.text();
    app.set_status("Saving...");
    spawn_save_notes(app, category_id, topic_id, content);
}

fn toggle_audio(app: &mut App) {
    if app.audio.has_source() {
        app.audio.toggle();
    } else {
        app.set_status("No audio attachment");
    }
}

/// Hands the audio URL to the system handler; progress keeps ticking locally.
fn open_audio(app: &mut App) {
    let Some(source) = app.audio.source().map(str::to_string) else {
        app.set_status("No audio attachment");
        return;
    };
    if let Err(e) = open::that(&source) {
        app.set_alert(500, format!("Failed to open audio: {e}"));
    } else {
        app.set_status("Opened audio in system player");
    }
}

/// Admin toggle: logging in opens the password overlay, logging out goes
/// through the confirmation dialog.
fn toggle_admin(app: &mut App) {
    if app.admin() {
        app.pending_confirm = Some(ConfirmAction::AdminLogout);
    } else {
        app.login = Some(LoginState::default());
    }
}

/// Gate for mutation affordances. Alerts and returns false outside admin mode.
fn require_admin(app: &mut App) -> bool {
    if app.admin() {
        true
    } else {
        app.set_alert(403, ERR_ADMIN_REQUIRED);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, Category};
    use crate::app::{AppEvent, EVENT_CHANNEL_SIZE};
    use crate::session::SessionStore;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use url::Url;

    fn test_app() -> App {
        let api = ApiClient::new(
            Url::parse("http://localhost:5000").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        let (tx, _rx) = mpsc::channel::<AppEvent>(EVENT_CHANNEL_SIZE);
        let mut app = App::new(api, SessionStore::in_memory(), tx);
        app.categories = vec![Category {
            id: "c1".to_string(),
            name: "Work".to_string(),
            topics: vec![],
        }];
        app
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut app = test_app();
        app.set_admin(true);

        handle_input(&mut app, KeyCode::Char('d'), KeyModifiers::NONE)
            .await
            .unwrap();
        // Nothing fired yet; the dialog is pending
        assert!(matches!(
            app.pending_confirm,
            Some(ConfirmAction::DeleteCategory { .. })
        ));

        // Declining clears the dialog without any request
        handle_input(&mut app, KeyCode::Char('n'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(app.pending_confirm.is_none());
    }

    #[tokio::test]
    async fn test_mutations_gated_by_admin() {
        let mut app = test_app();
        assert!(!app.admin());

        handle_input(&mut app, KeyCode::Char('d'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(app.pending_confirm.is_none());
        let (text, _) = app.status_message.as_ref().unwrap();
        assert!(text.starts_with("[403]"));
    }

    #[tokio::test]
    async fn test_admin_toggle_opens_login_overlay() {
        let mut app = test_app();
        handle_input(&mut app, KeyCode::Char('A'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(app.login.is_some());

        // Typed characters accumulate in the masked field
        handle_input(&mut app, KeyCode::Char('p'), KeyModifiers::NONE)
            .await
            .unwrap();
        handle_input(&mut app, KeyCode::Char('w'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert_eq!(app.login.as_ref().unwrap().password, "pw");
    }

    #[tokio::test]
    async fn test_admin_logout_goes_through_confirm() {
        let mut app = test_app();
        app.set_admin(true);
        handle_input(&mut app, KeyCode::Char('A'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert_eq!(app.pending_confirm, Some(ConfirmAction::AdminLogout));
    }

    #[tokio::test]
    async fn test_prompt_collects_input() {
        let mut app = test_app();
        app.set_admin(true);
        handle_input(&mut app, KeyCode::Char('a'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(app.prompt.is_some());

        for c in "Ideas".chars() {
            handle_input(&mut app, KeyCode::Char(c), KeyModifiers::NONE)
                .await
                .unwrap();
        }
        assert_eq!(app.prompt.as_ref().unwrap().input, "Ideas");

        // Esc discards without firing
        handle_input(&mut app, KeyCode::Esc, KeyModifiers::NONE)
            .await
            .unwrap();
        assert!(app.prompt.is_none());
    }

    #[tokio::test]
    async fn test_editor_typing_requires_admin() {
        let mut app = test_app();
        app.select_topic("c1", "Work", "t1", "Standup");
        assert_eq!(app.screen(), Screen::Editor);

        handle_input(&mut app, KeyCode::Char('x'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert_eq!(app.buffer.text(), "");

        app.set_admin(true);
        handle_input(&mut app, KeyCode::Char('x'), KeyModifiers::NONE)
            .await
            .unwrap();
        assert_eq!(app.buffer.text(), "x");
    }

    #[tokio::test]
    async fn test_paste_only_lands_in_editor_for_admin() {
        let mut app = test_app();
        app.select_topic("c1", "Work", "t1", "Standup");

        handle_paste(&mut app, "a<b>");
        assert_eq!(app.buffer.text(), "");

        app.set_admin(true);
        handle_paste(&mut app, "a<b>");
        assert_eq!(app.buffer.text(), "a<b>");
    }
}
