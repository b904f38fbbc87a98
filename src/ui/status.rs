use crate::app::{App, Screen};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar: the current alert if one is live, otherwise
/// keybinding hints for the active screen.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match (app.screen(), app.admin()) {
            (Screen::Categories, false) => {
                Cow::Borrowed("[Enter]open [t]ree [A]dmin [?]help [q]uit")
            }
            (Screen::Categories, true) => {
                Cow::Borrowed("[Enter]open [a]dd [e]rename [d]elete [A]logout [?]help [q]uit")
            }
            (Screen::Topics, false) => {
                Cow::Borrowed("[Enter]open [u]p [t]ree [A]dmin [?]help [q]uit")
            }
            (Screen::Topics, true) => {
                Cow::Borrowed("[Enter]open [u]p [a]dd [e]rename [d]elete [A]logout [?]help [q]uit")
            }
            (Screen::Editor, false) => {
                Cow::Borrowed("[Esc]back [h/l]prev/next [p]lay [o]pen audio [A]dmin [q]uit")
            }
            (Screen::Editor, true) => {
                Cow::Borrowed("[Ctrl+s]ave [Esc]back [Ctrl+←/→]prev/next [Ctrl+p]lay")
            }
        }
    };

    let mut style = Style::default().bg(Color::DarkGray).fg(Color::White);
    if app.admin() {
        style = style.bg(Color::Red);
    }

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
