//! Application event handling.
//!
//! This module processes background task completion events: list fetches,
//! notes loads and saves, mutations, and the admin session requests.

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::app::{App, AppEvent, NotesState};

use super::helpers::refresh_data;

/// Auth failures from mutation endpoints mean the backend session expired;
/// the local admin flag is forced off to match.
fn is_auth_failure(code: u16) -> bool {
    code == 401 || code == 403
}

pub async fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::CategoriesLoaded { result } => match result {
            Ok(categories) => {
                debug!(count = categories.len(), "Categories loaded");
                app.categories = categories;
                app.clamp_selections();
            }
            Err(e) => {
                warn!(error = %e, "Failed to load categories");
                app.alert_error(&e);
            }
        },

        AppEvent::TopicsLoaded {
            category_id,
            result,
        } => {
            // A category switch may have raced this fetch; only the current
            // category's topics are applied.
            if category_id != app.selection.category_id {
                debug!(category_id = %category_id, "Dropping topics for stale category");
                return;
            }
            match result {
                Ok(topics) => {
                    debug!(count = topics.len(), "Topics loaded");
                    app.topics = topics;
                    app.clamp_selections();
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load topics");
                    app.alert_error(&e);
                }
            }
        }

        AppEvent::NotesLoaded {
            topic_id,
            generation,
            result,
        } => {
            if !app.accepts_notes_generation(generation) {
                debug!(topic_id = %topic_id, generation, "Dropping stale notes load");
                return;
            }
            app.notes_load_handle = None;
            match result {
                Ok(Some(notes)) => {
                    app.buffer
                        .set_content(notes.current.content.as_deref().unwrap_or(""));
                    match &notes.current.audio_url {
                        Some(url) => app.audio.set_source(url, Utc::now().timestamp()),
                        None => app.audio.clear(),
                    }
                    app.editor_scroll = 0;
                    app.notes = NotesState::Ready { notes };
                }
                Ok(None) => {
                    // Sentinel/empty topic id: nothing to show
                    app.buffer.set_content("");
                    app.audio.clear();
                    app.notes = NotesState::Idle;
                }
                Err(e) => {
                    warn!(topic_id = %topic_id, error = %e, "Failed to load notes");
                    app.buffer.set_content("");
                    app.audio.clear();
                    app.notes = NotesState::Failed {
                        code: e.status_code(),
                    };
                    app.alert_error(&e);
                }
            }
        }

        AppEvent::NotesSaved {
            topic_id,
            content,
            ack,
        } => {
            app.saving_notes = false;
            // Save-then-local-update: the in-memory copy becomes the saved
            // content without a re-fetch.
            if let NotesState::Ready { notes } = &mut app.notes {
                if notes.current.id == topic_id {
                    notes.current.content = Some(content);
                }
            }
            app.buffer.mark_saved();
            app.set_alert(ack.code, &ack.message);
        }

        AppEvent::NotesSaveFailed { topic_id, error } => {
            app.saving_notes = false;
            warn!(topic_id = %topic_id, error = %error, "Failed to save notes");
            if is_auth_failure(error.status_code()) {
                app.set_admin(false);
            }
            app.alert_error(&error);
        }

        AppEvent::MutationComplete { ack } => {
            app.set_alert(ack.code, &ack.message);
            refresh_data(app);
        }

        AppEvent::MutationFailed { error } => {
            warn!(error = %error, "Mutation failed");
            if is_auth_failure(error.status_code()) {
                app.set_admin(false);
            }
            app.alert_error(&error);
        }

        AppEvent::LoginComplete { result } => match result {
            Ok(ack) => {
                app.set_admin(true);
                app.set_alert(ack.code, &ack.message);
            }
            Err(e) => {
                app.set_admin(false);
                app.alert_error(&e);
            }
        },

        AppEvent::LogoutComplete { result } => {
            // The flag goes off no matter what the server said; a failed
            // logout must not leave the UI in admin mode.
            app.set_admin(false);
            match result {
                Ok(ack) => app.set_alert(ack.code, &ack.message),
                Err(e) => app.alert_error(&e),
            }
            refresh_data(app);
        }

        AppEvent::TaskPanicked { task, error } => {
            error!(task, error = %error, "Background task panicked");
            app.set_alert(500, format!("Internal error in {task}"));
        }
    }
}
