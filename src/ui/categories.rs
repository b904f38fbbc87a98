use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the category list screen.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Main;
    let style_selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let style_normal = Style::default();

    let items: Vec<ListItem> = app
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let style = if is_focused && i == app.selected_category {
                style_selected
            } else {
                style_normal
            };
            let mut spans = vec![Span::styled(&*category.name, style)];
            if !category.topics.is_empty() {
                spans.push(Span::styled(
                    format!(" ({})", category.topics.len()),
                    style.add_modifier(Modifier::DIM),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if app.admin() {
        " Categories [admin] "
    } else {
        " Categories "
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    let mut state = ListState::default().with_selected(
        (!app.categories.is_empty()).then_some(app.selected_category),
    );
    f.render_stateful_widget(list, area, &mut state);
}
