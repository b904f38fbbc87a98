//! Help overlay — keybinding table grouped by screen.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

/// Bindings grouped by screen label. Static: there is no rebinding layer.
const BINDINGS: [(&str, &[(&str, &str)]); 5] = [
    (
        "General",
        &[
            ("q", "Quit"),
            ("?", "Toggle this help"),
            ("t", "Toggle navigation tree"),
            ("Tab", "Focus navigation tree"),
            ("A", "Admin login / logout"),
        ],
    ),
    (
        "Lists",
        &[
            ("j/k, Up/Down", "Move selection"),
            ("Enter", "Open category / topic"),
            ("u, Esc", "Back to categories"),
            ("a", "Add (admin)"),
            ("e", "Rename (admin)"),
            ("d", "Delete (admin, confirms first)"),
        ],
    ),
    (
        "Tree",
        &[
            ("Space, x", "Expand / collapse category"),
            ("Enter", "Select row"),
            ("Tab, Esc", "Back to main panel"),
        ],
    ),
    (
        "Editor (read-only)",
        &[
            ("j/k", "Scroll"),
            ("h/l, Left/Right", "Previous / next topic"),
            ("p, Space", "Play / pause audio"),
            ("o", "Open audio in system player"),
            ("Esc, u", "Back to topic list"),
        ],
    ),
    (
        "Editor (admin)",
        &[
            ("typing", "Edit notes directly"),
            ("Ctrl+s", "Save notes"),
            ("Ctrl+p / Ctrl+o", "Play / open audio"),
            ("Ctrl+Left/Right", "Previous / next topic"),
            ("Esc", "Back to topic list"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, _app: &App) {
    let area = f.area();

    let overlay = centered_rect(80, 80, area);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in &BINDINGS {
        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ]));
        for (key, description) in *bindings {
            rows.push(Row::new(vec![
                format!("  {}", key),
                description.to_string(),
            ]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let table = Table::new(
        rows,
        [Constraint::Percentage(35), Constraint::Percentage(65)],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help (Esc/q/? to close) "),
    );

    f.render_widget(table, overlay);
}

/// Centered rect sized as a percentage of the containing area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
