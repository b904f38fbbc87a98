use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the topic list for the selected category.
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

    let max_title = area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = app
        .topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let style = if is_focused && i == app.selected_topic {
                style_selected
            } else {
                style_normal
            };
            let title = truncate_to_width(&topic.title, max_title).into_owned();
            let mut spans = vec![Span::styled(title, style)];
            if topic.audio_url.is_some() {
                spans.push(Span::styled(" [audio]", style.add_modifier(Modifier::DIM)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = format!(" {} ", app.selection.category_name);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    let mut state = ListState::default()
        .with_selected((!app.topics.is_empty()).then_some(app.selected_topic));
    f.render_stateful_widget(list, area, &mut state);
}
