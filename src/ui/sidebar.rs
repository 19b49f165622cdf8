use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the category navigation panel, in display order.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Sidebar;
    // Unfocused, the sidebar follows the card cursor
    let selected = if is_focused {
        app.selected_category
    } else {
        app.cursor.section
    };

    let style_selected = app.style("nav_selected");
    let style_normal = app.style("nav_normal");
    let style_pinned = app.style("category_pinned");
    let name_width = usize::from(area.width.saturating_sub(4));

    let items: Vec<ListItem> = (0..app.section_count())
        .map(|section| {
            let style = if section == selected && is_focused {
                style_selected
            } else if app.is_pinned(section) {
                style_pinned
            } else {
                style_normal
            };
            let marker = if section == selected { "> " } else { "  " };
            let name = truncate_to_width(app.section_name(section), name_width.saturating_sub(2));

            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(name, style),
            ]))
        })
        .collect();

    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Categories"),
        )
        .style(app.style("page"))
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}
