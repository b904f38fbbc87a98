//! Notes editor screen: the text buffer plus the audio progress bar.

use crate::app::{App, NotesState};
use crate::audio::format_time;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the notes editor for the active topic.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 5 || area.height < 4 {
        return;
    }

    let chunks = if app.audio.has_source() {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0)])
            .split(area)
    };

    render_notes(f, app, chunks[0]);
    if app.audio.has_source() {
        render_audio_bar(f, app, chunks[1]);
    }
}

fn render_notes(f: &mut Frame, app: &mut App, area: Rect) {
    let topic_name = app.selection.topic_name.as_deref().unwrap_or("");
    let dirty_marker = if app.buffer.is_dirty() { " *" } else { "" };
    let mode = if app.saving_notes {
        " [saving]"
    } else if app.admin() {
        " [edit]"
    } else {
        ""
    };
    let title = format!(
        " {}{dirty_marker}{mode} ",
        truncate_to_width(topic_name, area.width.saturating_sub(14) as usize)
    );

    let mut block = Block::default().borders(Borders::ALL).title(title);

    // Predecessor/successor links in the bottom border
    if let NotesState::Ready { notes } = &app.notes {
        let mut hints = Vec::new();
        if let Some(prev) = &notes.behavior {
            hints.push(format!("< {}", truncate_to_width(&prev.title, 20)));
        }
        if let Some(next) = &notes.next {
            hints.push(format!("{} >", truncate_to_width(&next.title, 20)));
        }
        if !hints.is_empty() {
            block = block.title_bottom(Line::from(format!(" {} ", hints.join("  "))));
        }
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    if let NotesState::Loading { .. } = &app.notes {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let loading = Paragraph::new(format!("{spinner} Loading notes..."))
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        f.render_widget(loading, inner);
        return;
    }

    // Keep the cursor row inside the viewport before rendering
    let (row, col) = app.buffer.cursor();
    let viewport = inner.height.max(1) as usize;
    if app.admin() {
        if row < app.editor_scroll as usize {
            app.editor_scroll = row as u16;
        } else if row >= app.editor_scroll as usize + viewport {
            app.editor_scroll = (row + 1 - viewport) as u16;
        }
    }
    let max_scroll = app.buffer.lines().len().saturating_sub(viewport) as u16;
    if app.editor_scroll > max_scroll {
        app.editor_scroll = max_scroll;
    }

    let text: Vec<Line> = app
        .buffer
        .lines()
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect();
    let paragraph = Paragraph::new(text).scroll((app.editor_scroll, 0));
    f.render_widget(paragraph, inner);

    // Terminal cursor marks the edit position in admin mode
    if app.admin() {
        let cursor_y = inner.y + (row as u16).saturating_sub(app.editor_scroll);
        let cursor_x = inner.x + (col as u16).min(inner.width.saturating_sub(1));
        if cursor_y < inner.y + inner.height {
            f.set_cursor_position(Position::new(cursor_x, cursor_y));
        }
    }
}

fn render_audio_bar(f: &mut Frame, app: &App, area: Rect) {
    let state_icon = if app.audio.is_playing() { "▶" } else { "⏸" };
    let position = format_time(app.audio.position());
    let label = match app.audio.duration() {
        Some(duration) => format!("{state_icon} {position} / {}", format_time(duration)),
        None => format!("{state_icon} {position}"),
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Audio "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(app.audio.progress_percent() / 100.0)
        .label(label);

    f.render_widget(gauge, area);
}
