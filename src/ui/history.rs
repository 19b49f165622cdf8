use crate::app::App;
use crate::util::truncate_to_width;
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::help::centered_rect;

/// Local wall-clock time of a click, or "?" for an out-of-range timestamp.
fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.with_timezone(&Local).format("%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Render the recent-clicks overlay.
pub fn render(f: &mut Frame, app: &App) {
    let Some(history) = &app.history else {
        return;
    };

    let overlay = centered_rect(70, 70, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .style(app.style("page"))
        .title(Span::styled(
            format!(" Recently opened ({}) ", history.len()),
            app.style("overlay_title"),
        ))
        .title_bottom(" Enter open, Esc close ");

    if history.is_empty() {
        let empty = Paragraph::new("Nothing opened yet")
            .style(app.style("search_empty"))
            .block(block);
        f.render_widget(empty, overlay);
        return;
    }

    let title_width = usize::from(overlay.width.saturating_sub(16));
    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .map(|(i, click)| {
            let style = if i == app.history_selected {
                app.style("card_selected")
            } else {
                app.style("card_normal")
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}  ", format_timestamp(click.timestamp)), app.style("history_time")),
                Span::styled(truncate_to_width(&click.title, title_width), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(Style::default());
    let mut state = ListState::default().with_selected(Some(app.history_selected));
    f.render_stateful_widget(list, overlay, &mut state);
}
