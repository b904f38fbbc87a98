//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! background task events, and periodic ticks.

use crate::app::{App, AppEvent, NotesState, Screen};
use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::{refresh_data, spawn_notes_load};
use super::input::{handle_input, handle_paste};
use super::render::render;

/// Tick period: drives audio progress, spinner animation, and status expiry.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Number of frames in the loading spinner animation.
const SPINNER_FRAMES: usize = 10;

/// Result of handling a key press event.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex three event sources:
/// - **Terminal input**: Key and paste events from crossterm's async stream
/// - **Background tasks**: List fetches, notes loads/saves via `AppEvent`
/// - **Periodic tick**: 200ms timer for audio progress and status expiry
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(app: &mut App, mut event_rx: mpsc::Receiver<AppEvent>) -> Result<()> {
    // Install panic hook BEFORE setting up terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();

    // interval instead of sleep for consistent periodic ticks
    let mut tick_interval = tokio::time::interval(TICK_INTERVAL);

    // Initial data: lists always, notes when the restored session points at
    // a topic already.
    refresh_data(app);
    if let Some(topic_id) = app.selection.topic_id.clone() {
        spawn_notes_load(app, &topic_id);
    }

    // Signal handlers for graceful shutdown (Unix only)
    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        // Only render when state has changed
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain all pending app events before handling more input, so
        // background results are applied promptly even during rapid typing.
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event).await;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;  // Process in order listed for predictable behavior

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(KeyEvent { code, modifiers, kind, .. }))) => {
                        // Release/repeat events on some platforms would
                        // double-type in the editor
                        if kind == KeyEventKind::Press {
                            app.needs_redraw = true;
                            match handle_input(app, code, modifiers).await {
                                Ok(Action::Quit) => break,
                                Ok(Action::Continue) => {}
                                Err(e) => app.set_status(format!("Error: {}", e)),
                            }
                        }
                    }
                    Some(Ok(Event::Paste(payload))) => {
                        app.needs_redraw = true;
                        handle_paste(app, &payload);
                    }
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event).await;
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    }

    // Session state survives the exit
    if let Err(e) = app.session.save() {
        tracing::warn!(error = %e, "Failed to save session on exit");
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Periodic tick: audio position, loading spinner, status expiry (the expiry
/// check at the top of the loop needs the loop to wake up).
fn handle_tick(app: &mut App) {
    if app.audio.is_playing() {
        app.audio.tick();
        app.needs_redraw = true;
    }

    if matches!(app.notes, NotesState::Loading { .. }) && app.screen() == Screen::Editor {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }

    if app.status_message.is_some() {
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
