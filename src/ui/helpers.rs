//! Background task spawning for the UI layer.
//!
//! Every network operation runs in a spawned task that reports back through
//! the [`AppEvent`] channel, keeping the event loop responsive. Panics in
//! spawned tasks are caught and surfaced as alerts instead of disappearing.

use crate::api::ApiClient;
use crate::app::{App, AppEvent, MutationKind};
use futures::FutureExt;
use secrecy::SecretString;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing (caught by Tokio's runtime
/// but never handled), panics become `Err(String)` with the panic message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, "Channel send failed (receiver dropped)");
    }
}

/// Spawn a background fetch of the category list.
pub(super) fn spawn_fetch_categories(api: ApiClient, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = api.fetch_categories().await;
            send_event(&tx, AppEvent::CategoriesLoaded { result }).await;
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "fetch_categories", error = %panic_msg, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "fetch_categories",
                        error: panic_msg,
                    },
                )
                .await;
            }
        }
    });
}

/// Spawn a background fetch of a category's topic list.
pub(super) fn spawn_fetch_topics(api: ApiClient, category_id: String, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            let result = api.fetch_topics(&category_id).await;
            send_event(
                &tx,
                AppEvent::TopicsLoaded {
                    category_id,
                    result,
                },
            )
            .await;
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "fetch_topics", error = %panic_msg, "Background task panicked");
                send_event(
                    &tx_panic,
                    AppEvent::TaskPanicked {
                        task: "fetch_topics",
                        error: panic_msg,
                    },
                )
                .await;
            }
        }
    });
}

/// Starts a notes load for the given topic, aborting any in-flight load.
///
/// The completion event carries the generation issued here; by the time it
/// arrives the app may have moved on to a newer load, in which case the
/// event is dropped.
pub(super) fn spawn_notes_load(app: &mut App, topic_id: &str) {
    let generation = app.begin_notes_load(topic_id);
    let api = app.api.clone();
    let tx = app.event_tx.clone();
    let category_id = app.selection.category_id.clone();
    let topic_id = topic_id.to_string();

    tracing::debug!(topic_id = %topic_id, generation, "Starting notes load");

    app.notes_load_handle = Some(tokio::spawn(async move {
        let result = api.fetch_topic_notes(&category_id, &topic_id).await;
        send_event(
            &tx,
            AppEvent::NotesLoaded {
                topic_id,
                generation,
                result,
            },
        )
        .await;
    }));
}

/// Spawn a save of the editor buffer for the active topic.
pub(super) fn spawn_save_notes(app: &mut App, category_id: String, topic_id: String, content: String) {
    let api = app.api.clone();
    let tx = app.event_tx.clone();
    app.saving_notes = true;

    tokio::spawn(async move {
        match api.update_topic_notes(&category_id, &topic_id, &content).await {
            Ok(ack) => {
                send_event(
                    &tx,
                    AppEvent::NotesSaved {
                        topic_id,
                        content,
                        ack,
                    },
                )
                .await;
            }
            Err(error) => {
                send_event(&tx, AppEvent::NotesSaveFailed { topic_id, error }).await;
            }
        }
    });
}

/// Spawn a list mutation. Completion triggers a re-fetch of the affected
/// lists via `MutationComplete` handling.
pub(super) fn spawn_mutation(api: ApiClient, kind: MutationKind, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = match &kind {
            MutationKind::AddCategory { name } => api.create_category(name).await,
            MutationKind::RenameCategory { id, name } => api.update_category(id, name).await,
            MutationKind::DeleteCategory { id } => api.delete_category(id).await,
            MutationKind::AddTopic { category_id, title } => {
                api.create_topic(category_id, title).await
            }
            MutationKind::RenameTopic {
                category_id,
                id,
                title,
            } => api.update_topic(category_id, id, title).await,
            MutationKind::DeleteTopic { category_id, id } => {
                api.delete_topic(category_id, id).await
            }
        };

        match result {
            Ok(ack) => send_event(&tx, AppEvent::MutationComplete { ack }).await,
            Err(error) => send_event(&tx, AppEvent::MutationFailed { error }).await,
        }
    });
}

/// Spawn the admin login request.
pub(super) fn spawn_login(api: ApiClient, password: SecretString, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = api.admin_login(&password).await;
        send_event(&tx, AppEvent::LoginComplete { result }).await;
    });
}

/// Spawn the admin logout request. The admin flag is forced off when the
/// completion event is handled, regardless of the result.
pub(super) fn spawn_logout(api: ApiClient, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = api.admin_logout().await;
        send_event(&tx, AppEvent::LogoutComplete { result }).await;
    });
}

/// Re-fetches the lists the current selection depends on: categories always,
/// topics when a category is selected.
pub(super) fn refresh_data(app: &App) {
    spawn_fetch_categories(app.api.clone(), app.event_tx.clone());
    if app.selection.has_category() {
        spawn_fetch_topics(
            app.api.clone(),
            app.selection.category_id.clone(),
            app.event_tx.clone(),
        );
    }
}
