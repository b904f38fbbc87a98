//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! screen based on application state and layering overlays on top.

use crate::app::{App, Screen};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{categories, editor, help, status, topics, tree};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) fn overlay_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_main(f, app, chunks[0]);
    status::render(f, app, chunks[1]);

    if app.show_help {
        help::render(f, app);
    }
    if app.pending_confirm.is_some() {
        render_confirm_overlay(f, app);
    }
    if app.login.is_some() {
        render_login_overlay(f, app);
    }
    if app.prompt.is_some() {
        render_prompt_overlay(f, app);
    }
}

/// Main content area: optional tree sidebar plus the active screen.
fn render_main(f: &mut Frame, app: &mut App, area: Rect) {
    let content = if app.show_tree {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
            .split(area);
        tree::render(f, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    match app.screen() {
        Screen::Categories => categories::render(f, app, content),
        Screen::Topics => topics::render(f, app, content),
        Screen::Editor => editor::render(f, app, content),
    }
}

/// Centered overlay rect, clamped to the frame.
pub(super) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App) {
    let Some(confirm) = &app.pending_confirm else {
        return;
    };
    let area = f.area();

    let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", confirm.describe());

    let overlay = centered_rect(area, 50, 7);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(overlay_border_style())
                .title(" Confirm "),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}

/// Render the admin login overlay with masked password input.
fn render_login_overlay(f: &mut Frame, app: &App) {
    let Some(login) = &app.login else {
        return;
    };
    let area = f.area();

    let masked = "*".repeat(login.password.chars().count());
    let text = format!(
        "Password for admin:\n\n> {}_\n\n(Enter) Log in  (Esc) Cancel",
        masked
    );

    let overlay = centered_rect(area, 50, 8);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(overlay_border_style())
            .title(" Admin Login "),
    );

    f.render_widget(paragraph, overlay);
}

/// Render the add/rename prompt overlay.
fn render_prompt_overlay(f: &mut Frame, app: &App) {
    let Some(prompt) = &app.prompt else {
        return;
    };
    let area = f.area();

    let text = format!(
        "{}:\n\n> {}_\n\n(Enter) Save  (Esc) Cancel",
        prompt.title(),
        prompt.input
    );

    let overlay = centered_rect(area, 50, 8);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(overlay_border_style())
            .title(" Input "),
    );

    f.render_widget(paragraph, overlay);
}
