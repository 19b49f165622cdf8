use crate::app::{App, Focus};
use crate::icons::{monogram, SEARCH_PALETTE};
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the search field with the theme indicator on its right.
pub fn render_bar(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let border_style = if app.search_typing {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(app.style("page"))
        .title("Search");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let theme_label = format!(
        "{} {} [t] ",
        app.theme_variant.icon(),
        app.theme_variant.name()
    );
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(display_width(&theme_label) as u16),
        ])
        .split(inner);

    let line = if app.search_query.is_empty() && !app.search_typing {
        Line::from(Span::styled(
            "Press / to search sites",
            app.style("search_placeholder"),
        ))
    } else {
        let mut spans = vec![Span::styled(
            app.search_query.as_str(),
            app.style("search_input"),
        )];
        if app.search_typing {
            spans.push(Span::styled("█", app.style("search_input")));
        }
        if app.search_outcome.is_active() {
            spans.push(Span::styled(
                format!("  {} found", app.search_outcome.results().len()),
                app.style("search_count"),
            ));
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(theme_label, app.style("nav_normal"))),
        chunks[1],
    );
}

/// Render the results panel for an active search.
pub fn render_results(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let results = app.search_outcome.results();
    let is_focused = app.focus == Focus::Results;
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(app.style("page"))
        .title(format!("Search results ({})", results.len()));

    if results.is_empty() {
        render_no_results(f, app, area, block);
        return;
    }

    let text_width = usize::from(area.width.saturating_sub(2));
    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mono = monogram(&record.title, &SEARCH_PALETTE);
            let style = if is_focused && i == app.selected_result {
                app.style("card_selected")
            } else {
                app.style("card_normal")
            };
            let detail = format!("  {} · {}", record.category, record.domain);
            let title_width = text_width.saturating_sub(4 + display_width(&detail));

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", mono.letter),
                    Style::default()
                        .bg(mono.color)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(truncate_to_width(&record.title, title_width), style),
                Span::styled(detail, app.style("card_domain")),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    let mut state = ListState::default().with_selected(Some(app.selected_result));
    f.render_stateful_widget(list, area, &mut state);
}

/// Empty state: echo the query and offer suggested keywords.
fn render_no_results(f: &mut Frame, app: &App, area: Rect, block: Block) {
    let mut suggestions = vec![Span::styled("Try: ", app.style("search_empty"))];
    for (i, word) in app.search_suggestions.iter().enumerate() {
        if i > 0 {
            suggestions.push(Span::styled(" · ", app.style("search_empty")));
        }
        suggestions.push(Span::styled(word.as_str(), app.style("search_suggestion")));
    }

    let lines = vec![
        Line::from(Span::styled(
            format!("No matching sites for \"{}\"", app.search_query.trim()),
            app.style("search_empty"),
        )),
        Line::from(""),
        Line::from(suggestions),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
