use crate::app::{App, Focus};
use crate::session::MAIN_BODY;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the collapsible navigation tree sidebar.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Tree;
    let tree = app.tree_items();

    let style_selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let style_active = Style::default().add_modifier(Modifier::BOLD);
    let style_normal = Style::default();

    let items: Vec<ListItem> = tree
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let (indent, icon, name) = match &item.topic {
                Some(topic) => ("    ", "", topic.title.as_str()),
                None if item.category_id == MAIN_BODY => ("", "", item.category_name.as_str()),
                None => {
                    let icon = if !item.has_topics {
                        "  "
                    } else if item.is_expanded {
                        "v "
                    } else {
                        "> "
                    };
                    ("  ", icon, item.category_name.as_str())
                }
            };

            // The row matching the stored selection is bolded even when
            // the cursor is elsewhere.
            let is_active = match &item.topic {
                Some(topic) => app.selection.topic_id.as_deref() == Some(topic.id.as_str()),
                None => {
                    item.category_id == app.selection.category_id && !app.selection.has_topic()
                }
            };

            let style = if is_focused && i == app.tree_selected {
                style_selected
            } else if is_active {
                style_active
            } else {
                style_normal
            };

            ListItem::new(Line::from(vec![Span::styled(
                format!("{indent}{icon}{name}"),
                style,
            )]))
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Browse "),
    );

    let mut state = ListState::default().with_selected(Some(app.tree_selected));
    f.render_stateful_widget(list, area, &mut state);
}
